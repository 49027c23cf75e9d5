//! Application state and top-level router

pub mod response;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_sessions::MemoryStore;

use crate::config::{Config, UploadConfig};
use crate::db;
use crate::error::AppError;
use crate::features;
use crate::middleware::{self, rate_limit::RateLimiters};
use crate::storage::MediaStorage;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub storage: MediaStorage,
    pub uploads: Arc<UploadConfig>,
    pub limiters: RateLimiters,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        Self {
            db,
            storage: MediaStorage::new(config.uploads.media_root.clone()),
            uploads: Arc::new(config.uploads.clone()),
            limiters: RateLimiters::new(&config.rate_limit),
        }
    }
}

/// Full application: `/api/*` JSON routes and `/media/*` files
///
/// Layers from innermost to outermost: sessions, compression, request
/// tracing, CORS.
pub fn create_router(state: AppState, config: &Config, store: MemoryStore) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .merge(features::router(&state));

    Router::new()
        .nest("/api", api)
        .nest("/media", features::media::media_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::session_layer(store, &config.session))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match db::health_check(&state.db).await {
        Ok(()) => Ok(Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!(error = ?e, "Database health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            ))
        },
    }
}

async fn not_found() -> AppError {
    AppError::not_found()
}
