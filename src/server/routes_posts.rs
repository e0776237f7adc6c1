//! Post routes: the paged feed and post CRUD.
//!
//! Only a post's author may change or delete it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use blogforge_common::{Error, PostId, ViewFilter};
use blogforge_db::models::{NewPost, Post, PostChanges};
use blogforge_db::pool::get_conn;
use blogforge_db::queries::posts;
use serde::{Deserialize, Serialize};

use super::auth::CurrentUser;
use super::error::AppError;
use super::AppContext;
use crate::feed::Pagination;

pub fn post_routes() -> Router<AppContext> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub filter: ViewFilter,
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
    pub filter: ViewFilter,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub(crate) fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    raw.parse()
        .map_err(|_| Error::validation(format!("Invalid post id '{}'", raw)))
}

fn require_text(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Load a post and check that `user` wrote it.
fn owned_post(ctx: &AppContext, id: PostId, current: &CurrentUser) -> Result<Post, Error> {
    let conn = get_conn(&ctx.db)?;
    let post = posts::get_post(&conn, id)?.ok_or_else(|| Error::not_found("post", id))?;
    if post.author_id != current.user.id {
        return Err(Error::Forbidden(
            "Only the author can modify this post".into(),
        ));
    }
    Ok(post)
}

/// GET /api/posts?page=&filter=all|my-posts
async fn list_posts(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedPage>, AppError> {
    let author = match query.filter {
        ViewFilter::All => None,
        ViewFilter::MyPosts => Some(current.user.id),
    };

    let conn = get_conn(&ctx.db)?;
    let total = posts::count_posts(&conn, author)?;
    let pagination = Pagination::for_page(
        query.page.unwrap_or(1),
        ctx.config.feed.page_size,
        total,
    );
    let page = posts::list_posts(&conn, author, pagination.limit(), pagination.offset())?;

    tracing::debug!(
        filter = %query.filter,
        page = pagination.current_page,
        returned = page.len(),
        total,
        "Listed posts"
    );

    Ok(Json(FeedPage {
        posts: page,
        pagination,
        filter: query.filter,
    }))
}

/// POST /api/posts
async fn create_post(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    require_text("Title", &payload.title)?;
    require_text("Content", &payload.content)?;

    let new_post = NewPost {
        title: payload.title.trim().to_string(),
        content: payload.content,
        image_url: payload.image_url.filter(|url| !url.is_empty()),
        author_id: current.user.id,
    };

    let conn = get_conn(&ctx.db)?;
    let post = posts::create_post(&conn, &new_post)?;

    tracing::info!(post_id = %post.id, author = %post.author_id, "Created post");
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts/:id
async fn get_post(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let id = parse_post_id(&id)?;
    let conn = get_conn(&ctx.db)?;
    let post = posts::get_post(&conn, id)?.ok_or_else(|| Error::not_found("post", id))?;
    Ok(Json(post))
}

/// PUT /api/posts/:id
async fn update_post(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(mut changes): Json<PostChanges>,
) -> Result<Json<Post>, AppError> {
    let id = parse_post_id(&id)?;

    if let Some(title) = changes.title.take() {
        require_text("Title", &title)?;
        changes.title = Some(title.trim().to_string());
    }
    if let Some(content) = &changes.content {
        require_text("Content", content)?;
    }

    owned_post(&ctx, id, &current)?;

    let conn = get_conn(&ctx.db)?;
    let post = posts::update_post(&conn, id, &changes)?;

    tracing::info!(post_id = %post.id, "Updated post");
    Ok(Json(post))
}

/// DELETE /api/posts/:id
async fn delete_post(
    State(ctx): State<AppContext>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_post_id(&id)?;
    owned_post(&ctx, id, &current)?;

    let conn = get_conn(&ctx.db)?;
    posts::delete_post(&conn, id)?;

    tracing::info!(post_id = %id, "Deleted post");
    Ok(StatusCode::NO_CONTENT)
}
