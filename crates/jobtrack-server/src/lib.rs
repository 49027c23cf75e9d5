//! jobtrack server library
//!
//! HTTP API for a personal job-application tracker. Users keep a list of
//! companies, file entry-sheet (ES) versions under them with optional
//! document uploads, and can review an append-only audit trail of their
//! security-relevant activity.
//!
//! # Architecture
//!
//! Features are vertical slices (`features::*`) with commands for writes
//! and queries for reads. Every owned resource is looked up through
//! owner-scoped helpers, so another user's row is indistinguishable from a
//! missing one. Mutations are wrapped in an [`audit::AuditInterceptor`] that
//! writes one audit row per success.
//!
//! Request flow: rate-limit gate, session identity, owner-scoped store,
//! audit write, response.
//!
//! # Example
//!
//! ```no_run
//! use jobtrack_server::{api, config::Config, db};
//! use tower_sessions::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!
//!     let state = api::AppState::new(pool, &config);
//!     let app = api::create_router(state, &config, MemoryStore::default());
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod storage;

pub use error::AppError;
