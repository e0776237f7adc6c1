//! The signed-in user's own profile.

use axum::{extract::State, routing::get, Extension, Json, Router};
use blogforge_common::Error;
use blogforge_db::models::User;
use blogforge_db::pool::get_conn;
use blogforge_db::queries::users;
use serde::Deserialize;

use super::auth::CurrentUser;
use super::error::AppError;
use super::AppContext;

pub fn profile_routes() -> Router<AppContext> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

/// Fields left out keep their current value. An empty `avatar_url` removes
/// the avatar.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// GET /api/profile
async fn get_profile(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

/// PUT /api/profile
async fn update_profile(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, AppError> {
    let user = current.user;

    let full_name = match payload.full_name.as_deref().map(str::trim) {
        Some("") => return Err(Error::validation("Full name cannot be empty").into()),
        Some(name) => Some(name),
        None => user.full_name.as_deref(),
    };
    let avatar_url = match payload.avatar_url.as_deref() {
        Some("") => None,
        Some(url) => Some(url),
        None => user.avatar_url.as_deref(),
    };

    let conn = get_conn(&ctx.db)?;
    let updated = users::update_profile(&conn, user.id, full_name, avatar_url)?;

    tracing::info!(user_id = %updated.id, "Updated profile");
    Ok(Json(updated))
}
