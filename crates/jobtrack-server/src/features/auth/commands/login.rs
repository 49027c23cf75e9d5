//! Log in with email (or username) and password
//!
//! Every attempt that reaches credential checking is audited. Failures record
//! the submitted identifier in `input_email` and no user link.

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::audit::{self, AuditAction, CreateAuditEntry};
use crate::error::AppError;
use crate::features::auth::password::verify_blocking;
use crate::features::auth::session::CurrentUser;
use crate::features::auth::types::UserRecord;
use crate::middleware::ClientInfo;

/// `username` takes precedence over `email` when both are sent
#[derive(Clone, Default, Deserialize)]
pub struct LoginCommand {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LoginCommand {
    /// An empty `username` falls back to `email`
    pub fn identifier(&self) -> Option<&str> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|s| !s.is_empty())
        }
        present(&self.username).or_else(|| present(&self.email))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("username/email and password are required.")]
    MissingCredentials,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error(transparent)]
    Verify(AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LoginError> for AppError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::MissingCredentials => AppError::BadRequest(e.to_string()),
            LoginError::InvalidCredentials => AppError::InvalidCredentials,
            LoginError::Verify(inner) => inner,
            LoginError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, command, client))]
pub async fn handle(
    pool: &SqlitePool,
    command: LoginCommand,
    client: &ClientInfo,
) -> Result<CurrentUser, LoginError> {
    let identifier = command.identifier().ok_or(LoginError::MissingCredentials)?.to_string();
    let password = command
        .password
        .filter(|p| !p.is_empty())
        .ok_or(LoginError::MissingCredentials)?;

    let user = sqlx::query_as::<_, UserRecord>(
        "SELECT id, username, email, password_hash FROM users WHERE username = ?",
    )
    .bind(&identifier)
    .fetch_optional(pool)
    .await?;

    // Unknown identifiers still pay for a verify
    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    let verified = verify_blocking(password, stored_hash)
        .await
        .map_err(LoginError::Verify)?;
    let authenticated = user.filter(|_| verified);

    let Some(user) = authenticated else {
        tracing::warn!(ip = ?client.ip_address, "Login failed");
        let entry = CreateAuditEntry::builder(AuditAction::LoginFail)
            .input_email(&identifier)
            .client(client)
            .build();
        audit::record(pool, entry).await;
        return Err(LoginError::InvalidCredentials);
    };

    tracing::info!(user_id = user.id, "Login succeeded");
    let entry = CreateAuditEntry::builder(AuditAction::LoginSuccess)
        .user(user.id)
        .client(client)
        .build();
    audit::record(pool, entry).await;

    Ok(CurrentUser::from(user))
}
