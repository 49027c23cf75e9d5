//! Partial update of the caller's settings
//!
//! Only `diff_enabled`, `display_name` and `graduation_year` can change.
//! Unknown keys in the body are ignored and omitted keys keep their value.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::audit::{self, AuditAction, CreateAuditEntry};
use crate::error::{AppError, FieldErrors};
use crate::features::auth::queries::get_or_create_settings;
use crate::features::auth::types::{
    UserSettings, MAX_DISPLAY_NAME_LENGTH, MAX_GRADUATION_YEAR_LENGTH,
};
use crate::features::shared::validation::validate_max_length;
use crate::middleware::ClientInfo;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettingsCommand {
    pub diff_enabled: Option<bool>,
    pub display_name: Option<String>,
    pub graduation_year: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateSettingsError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateSettingsError> for AppError {
    fn from(e: UpdateSettingsError) -> Self {
        match e {
            UpdateSettingsError::Validation(errors) => AppError::Validation(errors),
            UpdateSettingsError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateSettingsCommand {
    pub fn validate(&self) -> Result<(), UpdateSettingsError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.display_name {
            errors.check("display_name", validate_max_length(name, MAX_DISPLAY_NAME_LENGTH));
        }
        if let Some(year) = &self.graduation_year {
            errors.check(
                "graduation_year",
                validate_max_length(year, MAX_GRADUATION_YEAR_LENGTH),
            );
        }
        errors.into_result().map_err(UpdateSettingsError::Validation)
    }
}

#[tracing::instrument(skip(pool, command, client))]
pub async fn handle(
    pool: &SqlitePool,
    user_id: i64,
    command: UpdateSettingsCommand,
    client: &ClientInfo,
) -> Result<UserSettings, UpdateSettingsError> {
    command.validate()?;

    // Make sure the row exists before the partial UPDATE
    get_or_create_settings(pool, user_id).await?;

    let settings = sqlx::query_as::<_, UserSettings>(
        r#"
        UPDATE user_settings
        SET diff_enabled    = COALESCE(?, diff_enabled),
            display_name    = COALESCE(?, display_name),
            graduation_year = COALESCE(?, graduation_year),
            updated_at      = ?
        WHERE user_id = ?
        RETURNING user_id, diff_enabled, display_name, graduation_year, created_at, updated_at
        "#,
    )
    .bind(command.diff_enabled)
    .bind(&command.display_name)
    .bind(&command.graduation_year)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let entry = CreateAuditEntry::builder(AuditAction::SettingsUpdate)
        .user(user_id)
        .client(client)
        .build();
    audit::record(pool, entry).await;

    Ok(settings)
}
