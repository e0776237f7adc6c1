mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./blogforge.toml",
        "~/.config/blogforge/config.toml",
        "/etc/blogforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be greater than 0");
    }

    if config.images.max_width == 0 || config.images.max_height == 0 {
        anyhow::bail!(
            "Image bounds must be positive (got {}x{})",
            config.images.max_width,
            config.images.max_height
        );
    }

    let quality = config.images.quality;
    if !(quality > 0.0 && quality <= 1.0) {
        anyhow::bail!("images.quality must be in (0, 1], got {}", quality);
    }

    if config.feed.page_size == 0 {
        anyhow::bail!("feed.page_size must be greater than 0");
    }

    if !(1..=MAX_SESSION_TIMEOUT_HOURS).contains(&config.auth.session_timeout_hours) {
        anyhow::bail!(
            "auth.session_timeout_hours must be between 1 and {}, got {}",
            MAX_SESSION_TIMEOUT_HOURS,
            config.auth.session_timeout_hours
        );
    }

    if !(4..=31).contains(&config.auth.bcrypt_cost) {
        anyhow::bail!(
            "auth.bcrypt_cost must be between 4 and 31, got {}",
            config.auth.bcrypt_cost
        );
    }

    if let Some(url) = &config.server.public_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("server.public_url must be an http(s) URL, got '{}'", url);
        }
    }

    Ok(())
}
