//! Image uploads.
//!
//! `POST /api/uploads/:folder` takes a multipart form with a single `file`
//! field, normalizes the image and answers with its public URL. The stored
//! files are served back by the `/storage` route.

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    routing::post,
    Extension, Json, Router,
};
use blogforge_common::{Error, UploadFolder};
use blogforge_media::ImageAsset;
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;

use super::auth::CurrentUser;
use super::error::AppError;
use super::AppContext;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

pub fn upload_routes(max_upload_bytes: usize) -> Router<AppContext> {
    Router::new()
        .route("/uploads/:folder", post(upload_image))
        .route_layer(DefaultBodyLimit::disable())
        .route_layer(RequestBodyLimitLayer::new(max_upload_bytes))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub public_url: String,
    pub path: String,
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge("Upload exceeds the maximum allowed size".into())
    } else {
        Error::validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}

/// POST /api/uploads/:folder
async fn upload_image(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Path(folder): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let folder: UploadFolder = folder.parse()?;

    let mut asset = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        asset = Some(ImageAsset::new(filename, data));
        break;
    }

    let asset = asset.ok_or_else(|| {
        Error::validation(format!("Missing multipart field '{}'", FILE_FIELD))
    })?;

    tracing::debug!(
        user_id = %current.user.id,
        folder = %folder,
        filename = %asset.filename,
        bytes = asset.data.len(),
        "Received upload"
    );

    let stored = ctx.images.upload(asset, folder).await?;

    Ok(Json(UploadResponse {
        public_url: stored.public_url,
        path: stored.path,
    }))
}
