//! Jobtrack Server - Main entry point

use anyhow::{Context, Result};
use jobtrack_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tower_sessions::MemoryStore;
use tracing::info;

use jobtrack_server::{
    api::{create_router, AppState},
    config::Config,
    db,
    middleware::rate_limit::{spawn_cleanup, LIMITER_CLEANUP_INTERVAL},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over the built-in defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("jobtrack-server")
        .filter_directives("jobtrack_server=debug,tower_http=debug,sqlx=warn")
        .build();
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Dropping the guard stops the background log writer
    let _log_guard = init_logging(&log_config)?;

    info!("Starting Jobtrack Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool)
        .await
        .context("Failed to run migrations")?;
    info!("Database migrations completed");

    let state = AppState::new(db_pool, &config);
    state
        .storage
        .ensure_root()
        .await
        .with_context(|| format!("Failed to create media root {}", state.storage.root().display()))?;

    let _limiter_cleanup = spawn_cleanup(state.limiters.clone(), LIMITER_CLEANUP_INTERVAL);

    let app = create_router(state, &config, MemoryStore::default());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    // Connect info feeds the client IP used by rate limiting and audit rows
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
