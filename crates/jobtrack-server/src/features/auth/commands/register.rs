//! Register a new account
//!
//! The email doubles as the login name. A successful registration is recorded
//! as `LOGIN_SUCCESS`, since the route logs the new user straight in.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::audit::{self, AuditAction, CreateAuditEntry};
use crate::error::{AppError, FieldErrors};
use crate::features::auth::password::hash_blocking;
use crate::features::auth::session::CurrentUser;
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::validation::{
    validate_email, validate_password, validate_password_confirmation,
};
use crate::middleware::ClientInfo;

#[derive(Clone, Default, Deserialize)]
pub struct RegisterCommand {
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

impl std::fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("User already exists.")]
    AlreadyExists,

    #[error(transparent)]
    Hash(AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RegisterError> for AppError {
    fn from(e: RegisterError) -> Self {
        match e {
            RegisterError::Validation(errors) => AppError::Validation(errors),
            RegisterError::AlreadyExists => AppError::AlreadyExists(e.to_string()),
            RegisterError::Hash(inner) => inner,
            RegisterError::Database(e) => AppError::Database(e),
        }
    }
}

impl RegisterCommand {
    pub fn validate(&self) -> Result<(), RegisterError> {
        let mut errors = FieldErrors::new();
        errors.check("email", validate_email(self.email.as_deref()));
        errors.check("password", validate_password(self.password.as_deref()));
        errors.check(
            "password_confirm",
            validate_password_confirmation(self.password.as_deref(), self.password_confirm.as_deref()),
        );
        errors.into_result().map_err(RegisterError::Validation)
    }
}

#[tracing::instrument(skip(pool, command, client), fields(email = ?command.email))]
pub async fn handle(
    pool: &SqlitePool,
    command: RegisterCommand,
    client: &ClientInfo,
) -> Result<CurrentUser, RegisterError> {
    command.validate()?;

    let email = command.email.unwrap_or_default();
    let password = command.password.unwrap_or_default();

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?)")
        .bind(&email)
        .fetch_one(pool)
        .await?;
    if exists {
        return Err(RegisterError::AlreadyExists);
    }

    let password_hash = hash_blocking(password).await.map_err(RegisterError::Hash)?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (username, email, password_hash, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(&email)
    .bind(&password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique_violation(e, RegisterError::AlreadyExists, RegisterError::Database))?;

    tracing::info!(user_id = id, "User registered");

    let entry = CreateAuditEntry::builder(AuditAction::LoginSuccess)
        .user(id)
        .client(client)
        .build();
    audit::record(pool, entry).await;

    Ok(CurrentUser {
        id,
        username: email.clone(),
        email,
    })
}
