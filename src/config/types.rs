use blogforge_media::NormalizeOptions;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub feed: FeedConfig,
}

impl Config {
    /// Base URL prepended to `/storage/...` paths in upload responses.
    ///
    /// Falls back to `http://{host}:{port}` when `server.public_url` is unset.
    /// A wildcard bind address such as `0.0.0.0` is replaced by `localhost`.
    pub fn public_base_url(&self) -> String {
        match &self.server.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let unspecified = self
                    .server
                    .host
                    .trim_matches(|c| c == '[' || c == ']')
                    .parse::<IpAddr>()
                    .is_ok_and(|ip| ip.is_unspecified());
                let host = if unspecified {
                    "localhost"
                } else {
                    self.server.host.as_str()
                };
                format!("http://{}:{}", host, self.server.port)
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally visible base URL, e.g. `https://blog.example.com`
    #[serde(default)]
    pub public_url: Option<String>,

    /// Largest accepted request body for uploads, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Holds the SQLite database and the `storage/` tree of uploaded images
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("blogforge.db")
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,

    #[serde(default = "default_max_dimension")]
    pub max_height: u32,

    /// JPEG quality in (0, 1]
    #[serde(default = "default_quality")]
    pub quality: f32,
}

fn default_max_dimension() -> u32 {
    blogforge_media::DEFAULT_MAX_WIDTH
}

fn default_quality() -> f32 {
    blogforge_media::DEFAULT_QUALITY
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            quality: default_quality(),
        }
    }
}

impl ImagesConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Session timeout in hours (default: one week)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,

    /// bcrypt work factor for new password hashes (4..=31)
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_session_timeout() -> u64 {
    168
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// Ten years.
pub const MAX_SESSION_TIMEOUT_HOURS: u64 = 24 * 365 * 10;

impl AuthConfig {
    /// Session lifetime in whole hours, capped at [`MAX_SESSION_TIMEOUT_HOURS`].
    pub fn session_hours(&self) -> i64 {
        // The cap fits comfortably in i64.
        self.session_timeout_hours.min(MAX_SESSION_TIMEOUT_HOURS) as i64
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout_hours: default_session_timeout(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    crate::feed::DEFAULT_PAGE_SIZE
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}
