//! Unified error type for blogforge.
//!
//! Every crate funnels its failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in blogforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "post", "comment").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but does not own the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Request data failed validation (missing or malformed form fields).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conflicting resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Uploaded data could not be decoded as an image.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// A decoded image could not be re-encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A request body exceeded the configured size limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The storage backend failed to accept an upload.
    #[error("Failed to upload image: {0}")]
    Upload(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Unauthorized(_) => 401,
            Error::Forbidden(_) => 403,
            Error::Validation(_) => 400,
            Error::Conflict(_) => 409,
            Error::Database(_) => 500,
            Error::Io { .. } => 500,
            Error::InvalidImage(_) => 400,
            Error::Encoding(_) => 500,
            Error::PayloadTooLarge(_) => 413,
            Error::Upload(_) => 502,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::Validation(_) => "validation_error",
            Error::Conflict(_) => "conflict",
            Error::Database(_) => "database_error",
            Error::Io { .. } => "io_error",
            Error::InvalidImage(_) => "invalid_image",
            Error::Encoding(_) => "encoding_error",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::Upload(_) => "upload_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Convenience constructor for [`Error::Internal`].
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("post", "abc-123");
        assert_eq!(err.to_string(), "post not found: abc-123");
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn forbidden_display() {
        let err = Error::Forbidden("not the author".into());
        assert_eq!(err.to_string(), "Forbidden: not the author");
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn validation_display() {
        let err = Error::validation("title is required");
        assert_eq!(err.to_string(), "Validation error: title is required");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn image_errors_map_to_distinct_statuses() {
        assert_eq!(Error::InvalidImage("bad".into()).http_status(), 400);
        assert_eq!(Error::Encoding("bad".into()).http_status(), 500);
        assert_eq!(Error::Upload("disk full".into()).http_status(), 502);
    }

    #[test]
    fn payload_too_large_maps_to_413() {
        let err = Error::PayloadTooLarge("upload exceeds 1024 bytes".into());
        assert_eq!(err.http_status(), 413);
        assert_eq!(err.code(), "payload_too_large");
    }

    #[test]
    fn upload_message_keeps_transport_text() {
        let err = Error::Upload("permission denied".into());
        assert_eq!(err.to_string(), "Failed to upload image: permission denied");
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.code(), "io_error");
    }
}
