//! Error types for blogforge-media.

use thiserror::Error;

/// Result type for blogforge-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for image normalization.
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be decoded (malformed or unsupported format).
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The encoder could not produce JPEG output.
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl Error {
    /// Create an invalid image error.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create an encoding error.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }
}

impl From<Error> for blogforge_common::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidImage(msg) => blogforge_common::Error::InvalidImage(msg),
            Error::Encoding(msg) => blogforge_common::Error::Encoding(msg),
        }
    }
}
