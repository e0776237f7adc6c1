//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; any [`blogforge_common::Error`]
//! converts into an [`AppError`] with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blogforge_common::Error;
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<blogforge_media::Error> for AppError {
    fn from(e: blogforge_media::Error) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Server error in API handler");
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
        }

        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
