//! Image upload handling.
//!
//! Uploaded images are normalized with `blogforge_media` and written to a
//! content-addressed directory tree that the HTTP server exposes under
//! `/storage`.

mod service;
mod storage;

pub use service::ImageService;
pub use storage::{ImageStorage, ImageStore, StoredImage};
