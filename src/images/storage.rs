//! Filesystem-level storage for normalized uploads.
//!
//! Images live under `{base_dir}/{folder}/{hash}.jpg`, where `hash` is the
//! first 16 hex chars of the SHA-256 of the JPEG bytes. Identical uploads
//! therefore land on the same file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blogforge_common::{Error, Result, UploadFolder};
use blogforge_media::NormalizedImage;
use sha2::{Digest, Sha256};

/// Where a stored image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Content hash (first 16 hex chars of SHA-256).
    pub hash: String,
    /// Path relative to the storage root, e.g. `avatars/0123456789abcdef.jpg`.
    pub path: String,
    /// Absolute URL clients use to fetch the image.
    pub public_url: String,
}

/// Backend that accepts normalized images and hands back a public URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `image` under `folder`.
    ///
    /// Failures are reported as [`Error::Upload`].
    async fn store(&self, image: &NormalizedImage, folder: UploadFolder) -> Result<StoredImage>;
}

/// Stores images on the local disk, served by the HTTP server under `/storage`.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    base_dir: PathBuf,
    public_base_url: String,
}

impl ImageStorage {
    /// Create a new `ImageStorage`.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - Root directory; one subdirectory per [`UploadFolder`]
    /// * `public_base_url` - Origin the `/storage` route is reachable at
    pub fn new(base_dir: PathBuf, public_base_url: impl Into<String>) -> Self {
        Self {
            base_dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Filesystem path of a stored file.
    pub fn get_path(&self, folder: UploadFolder, hash: &str) -> PathBuf {
        self.base_dir.join(folder.as_str()).join(format_filename(hash))
    }

    /// Public URL of a stored file.
    pub fn public_url(&self, folder: UploadFolder, hash: &str) -> String {
        format!(
            "{}/storage/{}/{}",
            self.public_base_url,
            folder.as_str(),
            format_filename(hash)
        )
    }
}

#[async_trait]
impl ImageStore for ImageStorage {
    async fn store(&self, image: &NormalizedImage, folder: UploadFolder) -> Result<StoredImage> {
        let hash = compute_hash(&image.data);

        let folder_dir = self.base_dir.join(folder.as_str());
        tokio::fs::create_dir_all(&folder_dir).await.map_err(|e| {
            Error::Upload(format!(
                "failed to create directory {}: {}",
                folder_dir.display(),
                e
            ))
        })?;

        let file_path = self.get_path(folder, &hash);
        tokio::fs::write(&file_path, &image.data)
            .await
            .map_err(|e| {
                Error::Upload(format!("failed to write {}: {}", file_path.display(), e))
            })?;

        tracing::debug!(
            folder = %folder,
            hash = %hash,
            bytes = image.data.len(),
            "Stored image"
        );

        Ok(StoredImage {
            path: format!("{}/{}", folder.as_str(), format_filename(&hash)),
            public_url: self.public_url(folder, &hash),
            hash,
        })
    }
}

/// Compute the content hash of image data.
///
/// Returns the first 16 hex characters of the SHA-256 digest.
fn compute_hash(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(digest)[..16].to_string()
}

fn format_filename(hash: &str) -> String {
    format!("{}.jpg", hash)
}
