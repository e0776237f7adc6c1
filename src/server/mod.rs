use crate::config::Config;
use crate::images::{ImageService, ImageStorage};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use blogforge_db::pool::DbPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod auth;
pub mod error;
pub mod routes_comments;
pub mod routes_posts;
pub mod routes_profile;
pub mod routes_uploads;

/// How often expired session tokens are purged.
const TOKEN_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub images: ImageService,
}

impl AppContext {
    /// Build a context whose uploads are stored on disk under
    /// `config.storage.storage_dir()`.
    pub fn new(config: Config, db: DbPool) -> Self {
        let storage = ImageStorage::new(config.storage.storage_dir(), config.public_base_url());
        let images = ImageService::new(Arc::new(storage), config.images.normalize_options());

        Self {
            db,
            config: Arc::new(config),
            images,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let storage_dir = ctx.config.storage.storage_dir();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(&ctx))
        .nest_service("/storage", ServeDir::new(storage_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn api_routes(ctx: &AppContext) -> Router<AppContext> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .merge(routes_posts::post_routes())
        .merge(routes_comments::comment_routes())
        .merge(routes_profile::profile_routes())
        .merge(routes_uploads::upload_routes(
            ctx.config.server.max_upload_bytes,
        ))
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::require_auth,
        ));

    public_routes.merge(protected_routes)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config, db: DbPool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let storage_dir = config.storage.storage_dir();
    tokio::fs::create_dir_all(&storage_dir)
        .await
        .with_context(|| format!("Failed to create storage directory {:?}", storage_dir))?;

    let cleanup = auth::start_token_cleanup(db.clone(), TOKEN_CLEANUP_INTERVAL);

    let ctx = AppContext::new(config, db);
    tracing::info!("Serving uploads from {:?}", storage_dir);
    if ctx.config.server.public_url.is_none() {
        tracing::warn!(
            "server.public_url is not set; upload URLs will use {}",
            ctx.config.public_base_url()
        );
    } else {
        tracing::info!("Public base URL is {}", ctx.config.public_base_url());
    }

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
