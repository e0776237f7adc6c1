//! Image upload pipeline.
//!
//! Raw bytes in, public URL out: decode, fit within the configured bounds,
//! re-encode as JPEG, then hand the result to an [`ImageStore`].

use std::sync::Arc;

use blogforge_common::{Error, Result, UploadFolder};
use blogforge_media::{normalize, ImageAsset, NormalizeOptions, NormalizedImage};

use super::storage::{ImageStore, StoredImage};

/// High-level image service that normalizes uploads before storing them.
#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn ImageStore>,
    options: NormalizeOptions,
}

impl ImageService {
    /// Create a new `ImageService`.
    ///
    /// # Arguments
    ///
    /// * `store` - Backend that receives normalized images
    /// * `options` - Bounds and JPEG quality applied to every upload
    pub fn new(store: Arc<dyn ImageStore>, options: NormalizeOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize `asset` on a blocking thread.
    ///
    /// Decoding and encoding are CPU bound, so they never run on the async
    /// executor.
    pub async fn normalize(&self, asset: ImageAsset) -> Result<NormalizedImage> {
        let options = self.options;
        let normalized = tokio::task::spawn_blocking(move || normalize(&asset, &options))
            .await
            .map_err(|e| Error::internal(format!("image normalization task failed: {}", e)))??;
        Ok(normalized)
    }

    /// Normalize `asset` and store it under `folder`.
    ///
    /// # Returns
    ///
    /// * `Ok(StoredImage)` - Where the image was written and its public URL
    /// * `Err(Error::InvalidImage)` - The bytes could not be decoded
    /// * `Err(Error::Encoding)` - The JPEG encoder failed
    /// * `Err(Error::Upload)` - The store rejected the image
    pub async fn upload(&self, asset: ImageAsset, folder: UploadFolder) -> Result<StoredImage> {
        let source_name = asset.filename.clone();
        let source_bytes = asset.data.len();

        let normalized = self.normalize(asset).await?;
        let stored = self.store.store(&normalized, folder).await?;

        tracing::info!(
            source = %source_name,
            folder = %folder,
            source_bytes,
            stored_bytes = normalized.data.len(),
            width = normalized.width,
            height = normalized.height,
            url = %stored.public_url,
            "Uploaded image"
        );

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::images::ImageStorage;
    use async_trait::async_trait;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128u8])
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    struct FailingStore;

    #[async_trait]
    impl ImageStore for FailingStore {
        async fn store(&self, _: &NormalizedImage, _: UploadFolder) -> Result<StoredImage> {
            Err(Error::Upload("bucket unavailable".into()))
        }
    }

    fn small_options() -> NormalizeOptions {
        NormalizeOptions {
            max_width: 100,
            max_height: 100,
            quality: 0.8,
        }
    }

    #[tokio::test]
    async fn test_upload_resizes_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path().to_path_buf(), "http://localhost:8080");
        let service = ImageService::new(Arc::new(storage.clone()), small_options());

        let stored = service
            .upload(ImageAsset::new("wide.png", png(400, 200)), UploadFolder::BlogImages)
            .await
            .unwrap();

        let bytes = std::fs::read(storage.get_path(UploadFolder::BlogImages, &stored.hash)).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
        assert!(stored.public_url.starts_with("http://localhost:8080/storage/blog-images/"));
    }

    #[tokio::test]
    async fn test_upload_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path().to_path_buf(), "http://localhost");
        let service = ImageService::new(Arc::new(storage), small_options());

        let err = service
            .upload(ImageAsset::new("notes.txt", b"not an image".to_vec()), UploadFolder::Avatars)
            .await
            .unwrap_err();
        assert_matches!(err, Error::InvalidImage(_));
        assert!(!dir.path().join("avatars").exists());
    }

    #[tokio::test]
    async fn test_upload_store_failure_propagates() {
        let service = ImageService::new(Arc::new(FailingStore), small_options());

        let err = service
            .upload(ImageAsset::new("a.png", png(10, 10)), UploadFolder::Avatars)
            .await
            .unwrap_err();
        assert_matches!(err, Error::Upload(_));
    }

    #[tokio::test]
    async fn test_normalize_keeps_small_images() {
        let service = ImageService::new(Arc::new(FailingStore), small_options());

        let normalized = service
            .normalize(ImageAsset::new("tiny.png", png(40, 30)))
            .await
            .unwrap();
        assert_eq!((normalized.width, normalized.height), (40, 30));
        assert_eq!(normalized.filename, "tiny.jpg");
    }
}
