//! Accounts and sessions: registration, login, logout, and the middleware
//! that resolves the caller's session token into a [`CurrentUser`].
//!
//! Tokens are opaque random strings stored in the `auth_tokens` table. Clients
//! send them as `Authorization: Bearer <token>` or through the
//! `blogforge_session` cookie set on login.

use std::time::Duration as StdDuration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use blogforge_common::Error;
use blogforge_db::models::User;
use blogforge_db::pool::{get_conn, DbPool};
use blogforge_db::queries::{auth_tokens, users};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::AppError;
use super::AppContext;

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "blogforge_session";

const MIN_PASSWORD_LEN: usize = 6;

/// The authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), Error> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("A valid email address is required"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if req.full_name.trim().is_empty() {
        return Err(Error::validation("Full name is required"));
    }
    Ok(())
}

/// Generate a bcrypt password hash
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Generate a random session token
pub fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn extract_token(bearer: Option<&str>, jar: &CookieJar) -> Option<String> {
    bearer
        .map(str::to_string)
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
}

fn session_cookie(token: String, hours: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(hours))
        .build()
}

/// Create and store a session token for `user`.
fn issue_session(ctx: &AppContext, user: User) -> Result<AuthResponse, Error> {
    let expires_at = Utc::now() + Duration::hours(ctx.config.auth.session_hours());
    let token = generate_token();

    let conn = get_conn(&ctx.db)?;
    auth_tokens::create_token(&conn, user.id, &token, expires_at)?;

    Ok(AuthResponse {
        user,
        token,
        expires_at,
    })
}

/// Resolve a session token to its user.
///
/// Expired tokens are deleted and rejected.
pub fn authenticate(db: &DbPool, token: &str) -> Result<User, Error> {
    let conn = get_conn(db)?;

    match auth_tokens::get_token_with_user(&conn, token)? {
        Some((auth_token, user)) if auth_token.is_valid_at(Utc::now()) => Ok(user),
        Some(_) => {
            auth_tokens::delete_token(&conn, token)?;
            tracing::debug!("Rejected expired session token");
            Err(Error::Unauthorized("Session expired".into()))
        }
        None => Err(Error::Unauthorized("Invalid session token".into())),
    }
}

/// Middleware for routes that need a signed-in user
pub async fn require_auth(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(bearer.as_ref().map(|b| b.token()), &jar)
        .ok_or_else(|| Error::Unauthorized("Authentication required".into()))?;

    let user = authenticate(&ctx.db, &token)?;
    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// POST /api/auth/register
pub async fn register(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    validate_registration(&payload)?;

    let cost = ctx.config.auth.bcrypt_cost;
    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| Error::internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| Error::internal(format!("Failed to hash password: {}", e)))?;

    let user = {
        let conn = get_conn(&ctx.db)?;
        users::create_user(
            &conn,
            &payload.email,
            &password_hash,
            Some(payload.full_name.trim()),
        )?
    };

    tracing::info!(user_id = %user.id, "Registered new user");

    let session = issue_session(&ctx, user)?;
    let cookie = session_cookie(session.token.clone(), ctx.config.auth.session_hours());

    Ok((StatusCode::CREATED, jar.add(cookie), Json(session)))
}

/// POST /api/auth/login
pub async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let invalid = || Error::Unauthorized("Invalid login credentials".into());

    let user = {
        let conn = get_conn(&ctx.db)?;
        users::get_user_by_email(&conn, &payload.email)?
    }
    .ok_or_else(invalid)?;

    let password = payload.password;
    let hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| Error::internal(format!("password verification task failed: {}", e)))?;

    if !matches!(verified, Ok(true)) {
        tracing::debug!(user_id = %user.id, "Failed login attempt");
        return Err(invalid().into());
    }

    let session = issue_session(&ctx, user)?;
    let cookie = session_cookie(session.token.clone(), ctx.config.auth.session_hours());

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok((jar.add(cookie), Json(session)))
}

/// POST /api/auth/logout
///
/// Succeeds whether or not the caller had a valid session.
pub async fn logout(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    if let Some(token) = extract_token(bearer.as_ref().map(|b| b.token()), &jar) {
        let conn = get_conn(&ctx.db)?;
        auth_tokens::delete_token(&conn, &token)?;
    }

    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();

    Ok((jar.remove(cookie), Json(json!({ "success": true }))))
}

/// GET /api/auth/me
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

/// Periodically delete expired session tokens.
pub fn start_token_cleanup(db: DbPool, every: StdDuration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let result = get_conn(&db)
                .and_then(|conn| auth_tokens::delete_expired_tokens(&conn, Utc::now()));
            match result {
                Ok(0) => {}
                Ok(count) => tracing::info!("Purged {} expired session tokens", count),
                Err(e) => tracing::warn!("Failed to purge expired session tokens: {}", e),
            }
        }
    })
}
