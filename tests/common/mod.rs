//! Shared test harness for integration tests.
//!
//! [`TestHarness`] builds a full [`AppContext`] backed by an in-memory
//! database and a temporary storage directory, and drives the router with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use blogforge::config::Config;
use blogforge::server::{create_router, AppContext};
use blogforge_db::pool::{init_memory_pool, DbPool};
use http_body_util::BodyExt;
use image::{ImageBuffer, Rgb};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PUBLIC_URL: &str = "http://blog.test";
pub const PASSWORD: &str = "correct horse";

const BOUNDARY: &str = "blogforge-test-boundary";

/// Test harness wrapping an [`AppContext`] with an in-memory DB.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    dir: TempDir,
}

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration.
    ///
    /// Storage, public URL and bcrypt cost are always overridden.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        config.storage.data_dir = dir.path().to_path_buf();
        config.server.public_url = Some(PUBLIC_URL.to_string());
        config.auth.bcrypt_cost = 4;

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(config, db.clone());

        Self { ctx, db, dir }
    }

    pub fn app(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.dir.path().join("storage")
    }

    /// Send a request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    /// Send a JSON request, optionally authenticated with a bearer token.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.json(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.json(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.json(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.json(Method::DELETE, uri, Some(token), None).await
    }

    /// Register a user and return their session token.
    pub async fn register(&self, email: &str, full_name: &str) -> String {
        let response = self
            .json(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "full_name": full_name,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json());
        response.json()["token"].as_str().unwrap().to_string()
    }

    /// Create a post and return its JSON.
    pub async fn create_post(&self, token: &str, title: &str) -> Value {
        let response = self
            .post(
                "/api/posts",
                token,
                json!({ "title": title, "content": format!("{} body", title) }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json());
        response.json()
    }

    /// Upload `data` as the multipart `file` field.
    pub async fn upload(
        &self,
        folder: &str,
        token: Option<&str>,
        filename: &str,
        data: &[u8],
    ) -> TestResponse {
        let body = multipart_body("file", filename, data);
        let mut builder = Request::post(format!("/api/uploads/{}", folder))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header(header::CONTENT_LENGTH, body.len());
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }
}

/// Build a multipart body with a single file field.
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Encode a gradient PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}
