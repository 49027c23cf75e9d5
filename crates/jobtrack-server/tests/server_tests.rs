//! Server-level tests: health, fallback routing and the middleware stack

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use jobtrack_server::{
    api::{create_router, AppState},
    config::{Config, CorsConfig},
    db,
};

mod common;
use common::TestApp;

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::spawn().await;

    let response = app.client().get("/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let app = TestApp::spawn().await;
    app.pool.close().await;

    let response = app.client().get("/api/health").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json(), json!({ "status": "unavailable" }));
}

#[tokio::test]
async fn test_unknown_path_returns_json_404() {
    let app = TestApp::spawn().await;

    let response = app.client().get("/api/does-not-exist").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let body = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["detail"], "Not found.");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::spawn().await;
    let mut client = app.register("taro@example.com").await;

    let response = client
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/companies")
                .header(header::CONTENT_TYPE, "application/json"),
            Body::from("{not json"),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_session_cookie_is_http_only() {
    let app = TestApp::spawn().await;
    let mut client = app.client();

    let response = client
        .post_json(
            "/api/auth/register",
            json!({
                "email": "taro@example.com",
                "password": common::TEST_PASSWORD,
                "password_confirm": common::TEST_PASSWORD,
            }),
        )
        .await;

    let cookie = response.header(header::SET_COOKIE).expect("session cookie");
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("SameSite=Lax"), "{cookie}");
}

#[tokio::test]
async fn test_cors_allows_configured_origin_with_credentials() {
    let mut config = Config::default();
    config.cors = CorsConfig {
        allowed_origins: vec!["http://localhost:5173".to_string()],
        allow_credentials: true,
    };
    let media = tempfile::TempDir::new().unwrap();
    config.uploads.media_root = media.path().to_path_buf();

    let pool = db::connect_in_memory().await.unwrap();
    let router = create_router(AppState::new(pool, &config), &config, MemoryStore::default());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}
