//! Common test utilities for Jobtrack server integration tests
//!
//! Every [`TestApp`] is a full router over its own in-memory database, media
//! directory and session store, so tests never share state.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestApp;
//!
//! #[tokio::test]
//! async fn test_profile() {
//!     let app = TestApp::spawn().await;
//!     let mut taro = app.register("taro@example.com").await;
//!
//!     let response = taro.get("/api/me").await;
//!     assert_eq!(response.status, StatusCode::OK);
//! }
//! ```

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use jobtrack_server::{
    api::{create_router, AppState},
    config::Config,
    db,
    middleware::rate_limit::RateLimitConfig,
};

/// Password used by [`TestApp::register`]
pub const TEST_PASSWORD: &str = "correct-horse-42";

const MULTIPART_BOUNDARY: &str = "jobtrack-test-boundary";

/// Limits high enough that ordinary tests never hit them
pub fn generous_rate_limits() -> RateLimitConfig {
    RateLimitConfig {
        auth_per_minute: 1_000,
        settings_per_minute: 1_000,
        resource_per_hour: 10_000,
        trust_forwarded_for: false,
    }
}

/// Full application under test
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    media_root: TempDir,
    next_ip: std::sync::atomic::AtomicU8,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_rate_limits(generous_rate_limits()).await
    }

    pub async fn with_rate_limits(rate_limit: RateLimitConfig) -> Self {
        let media_root = TempDir::new().expect("Failed to create media directory");

        let mut config = Config::default();
        config.uploads.media_root = media_root.path().to_path_buf();
        config.rate_limit = rate_limit;

        let pool = db::connect_in_memory()
            .await
            .expect("Failed to create in-memory database");

        let state = AppState::new(pool.clone(), &config);
        state
            .storage
            .ensure_root()
            .await
            .expect("Failed to prepare media root");

        let router = create_router(state, &config, MemoryStore::default());

        Self {
            router,
            pool,
            media_root,
            next_ip: std::sync::atomic::AtomicU8::new(1),
        }
    }

    pub fn media_root(&self) -> PathBuf {
        self.media_root.path().to_path_buf()
    }

    /// Anonymous client connecting from its own peer address
    pub fn client(&self) -> TestClient<'_> {
        let n = self
            .next_ip
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        TestClient {
            app: self,
            cookie: None,
            ip: format!("203.0.113.{n}"),
            peer: SocketAddr::from((Ipv4Addr::new(203, 0, 113, n), 40_000)),
        }
    }

    /// Register `email` and return its logged-in client
    pub async fn register(&self, email: &str) -> TestClient<'_> {
        let mut client = self.client();
        let response = client
            .post_json(
                "/api/auth/register",
                json!({
                    "email": email,
                    "password": TEST_PASSWORD,
                    "password_confirm": TEST_PASSWORD,
                }),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "registration failed: {}",
            response.text()
        );
        client
    }
}

/// Response with the body already read
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("response is not JSON ({e}): {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Part of a multipart request body
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            },
            Part::File {
                name,
                file_name,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            },
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// One browser: carries its session cookie between requests
///
/// Requests arrive from `peer` and report `ip` in `X-Forwarded-For` unless the
/// caller sets that header itself.
pub struct TestClient<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
    pub ip: String,
    pub peer: SocketAddr,
}

impl TestClient<'_> {
    pub fn is_logged_in(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let mut builder = builder.extension(ConnectInfo(self.peer));
        let has_forwarded = builder
            .headers_ref()
            .is_some_and(|headers| headers.contains_key("x-forwarded-for"));
        if !has_forwarded {
            builder = builder.header("x-forwarded-for", &self.ip);
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(body).expect("Failed to build request");

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            if set_cookie.contains("Max-Age=0") {
                self.cookie = None;
            } else if let Some(pair) = set_cookie.split(';').next() {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().method(Method::GET).uri(uri), Body::empty())
            .await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().method(Method::DELETE).uri(uri), Body::empty())
            .await
    }

    pub async fn post_empty(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().method(Method::POST).uri(uri), Body::empty())
            .await
    }

    pub async fn post_json(&mut self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::POST, uri, body).await
    }

    pub async fn patch_json(&mut self, uri: &str, body: Value) -> TestResponse {
        self.json(Method::PATCH, uri, body).await
    }

    pub async fn json(&mut self, method: Method, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    pub async fn multipart(&mut self, method: Method, uri: &str, parts: &[Part<'_>]) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                ),
            Body::from(multipart_body(parts)),
        )
        .await
    }

    /// Create a company and return its id
    pub async fn create_company(&mut self, body: Value) -> i64 {
        let response = self.post_json("/api/companies", body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "company create failed: {}",
            response.text()
        );
        response.json()["id"].as_i64().expect("company id")
    }

    /// Create an entry-sheet version and return its JSON
    pub async fn create_es(&mut self, body: Value) -> Value {
        let response = self.post_json("/api/es", body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "ES create failed: {}",
            response.text()
        );
        response.json()
    }
}
