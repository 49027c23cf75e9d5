//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::middleware::rate_limit::RateLimitConfig;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://jobtrack.db?mode=rwc";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Sessions expire after this many seconds without a request (two weeks).
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: i64 = 60 * 60 * 24 * 14;

/// Default directory holding uploaded files.
pub const DEFAULT_MEDIA_ROOT: &str = "./media";

/// Default maximum upload size (10 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions accepted for entry-sheet attachments.
pub const DEFAULT_UPLOAD_ALLOWED_EXTENSIONS: &[&str] =
    &[".pdf", ".doc", ".docx", ".txt", ".png", ".jpg", ".jpeg"];

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
    pub uploads: UploadConfig,
    pub rate_limit: RateLimitConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Only send the cookie over HTTPS
    pub secure_cookie: bool,
    pub idle_timeout_secs: i64,
}

/// Upload limits and storage location for entry-sheet files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub media_root: PathBuf,
    pub max_bytes: u64,
    /// Lowercase extensions including the leading dot
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|allowed| allowed == extension)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }
    Some(if trimmed.starts_with('.') { trimmed } else { format!(".{trimmed}") })
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("JOBTRACK_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("JOBTRACK_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "JOBTRACK_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_or(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
                connect_timeout_secs: env_or(
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                ),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            session: SessionConfig {
                secure_cookie: env_or("SESSION_SECURE_COOKIE", defaults.session.secure_cookie),
                idle_timeout_secs: env_or(
                    "SESSION_IDLE_TIMEOUT_SECS",
                    DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
                ),
            },
            uploads: UploadConfig {
                media_root: std::env::var("MEDIA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.uploads.media_root),
                max_bytes: env_or("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES),
                allowed_extensions: match std::env::var("UPLOAD_ALLOWED_EXTENSIONS") {
                    Ok(list) => list.split(',').filter_map(normalize_extension).collect(),
                    Err(_) => defaults.uploads.allowed_extensions,
                },
            },
            rate_limit: RateLimitConfig::from_env(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.session.idle_timeout_secs <= 0 {
            anyhow::bail!("Session idle timeout must be positive");
        }

        if self.uploads.max_bytes == 0 {
            anyhow::bail!("Upload max_bytes must be greater than 0");
        }

        if self.uploads.allowed_extensions.is_empty() {
            anyhow::bail!("At least one upload extension must be allowed");
        }

        self.rate_limit.validate()?;

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            session: SessionConfig {
                secure_cookie: false,
                idle_timeout_secs: DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
            },
            uploads: UploadConfig {
                media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
                max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
                allowed_extensions: DEFAULT_UPLOAD_ALLOWED_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            },
            rate_limit: RateLimitConfig::default(),
        }
    }
}
