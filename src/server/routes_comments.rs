//! Comment routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use blogforge_common::{CommentId, Error};
use blogforge_db::models::Comment;
use blogforge_db::pool::get_conn;
use blogforge_db::queries::{comments, posts};
use serde::Deserialize;

use super::auth::CurrentUser;
use super::error::AppError;
use super::routes_posts::parse_post_id;
use super::AppContext;

pub fn comment_routes() -> Router<AppContext> {
    Router::new()
        .route(
            "/posts/:id/comments",
            get(list_comments).post(create_comment),
        )
        .route("/comments/:id", delete(delete_comment))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// GET /api/posts/:id/comments
async fn list_comments(
    State(ctx): State<AppContext>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let post_id = parse_post_id(&post_id)?;
    let conn = get_conn(&ctx.db)?;

    if posts::get_post(&conn, post_id)?.is_none() {
        return Err(Error::not_found("post", post_id).into());
    }

    Ok(Json(comments::list_comments_for_post(&conn, post_id)?))
}

/// POST /api/posts/:id/comments
async fn create_comment(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let post_id = parse_post_id(&post_id)?;
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(Error::validation("Comment cannot be empty").into());
    }

    let conn = get_conn(&ctx.db)?;
    let comment = comments::create_comment(&conn, post_id, current.user.id, content)?;

    tracing::info!(comment_id = %comment.id, post_id = %post_id, "Added comment");
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/comments/:id
///
/// Only the comment's author may delete it.
async fn delete_comment(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: CommentId = id
        .parse()
        .map_err(|_| Error::validation(format!("Invalid comment id '{}'", id)))?;

    let conn = get_conn(&ctx.db)?;
    let comment = comments::get_comment(&conn, id)?.ok_or_else(|| Error::not_found("comment", id))?;

    if comment.author_id != current.user.id {
        return Err(Error::Forbidden("Only the author can delete this comment".into()).into());
    }

    comments::delete_comment(&conn, id)?;
    tracing::info!(comment_id = %id, "Deleted comment");
    Ok(StatusCode::NO_CONTENT)
}
