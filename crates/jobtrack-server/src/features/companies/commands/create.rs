//! Create a company owned by the caller
//!
//! The owner always comes from the session. An `owner` key in the body is
//! not part of the command and is dropped during deserialization.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::{AppError, FieldErrors};
use crate::features::companies::types::{
    Company, COMPANY_COLUMNS, MAX_NAME_LENGTH, MAX_SHORT_TEXT_LENGTH,
};
use crate::features::shared::validation::{validate_max_length, validate_required_text};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCompanyCommand {
    pub name: Option<String>,
    pub job_role: Option<String>,
    pub apply_route: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status_text: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateCompanyError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateCompanyError> for AppError {
    fn from(e: CreateCompanyError) -> Self {
        match e {
            CreateCompanyError::Validation(errors) => AppError::Validation(errors),
            CreateCompanyError::Database(e) => AppError::Database(e),
        }
    }
}

impl CreateCompanyCommand {
    pub fn validate(&self) -> Result<(), CreateCompanyError> {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_required_text(self.name.as_deref(), MAX_NAME_LENGTH));
        for (field, value) in [
            ("job_role", &self.job_role),
            ("apply_route", &self.apply_route),
            ("status_text", &self.status_text),
        ] {
            if let Some(value) = value {
                errors.check(field, validate_max_length(value, MAX_SHORT_TEXT_LENGTH));
            }
        }
        errors.into_result().map_err(CreateCompanyError::Validation)
    }
}

#[tracing::instrument(skip(pool, command), fields(name = ?command.name))]
pub async fn handle(
    pool: &SqlitePool,
    owner_id: i64,
    command: CreateCompanyCommand,
) -> Result<Company, CreateCompanyError> {
    command.validate()?;

    let now = Utc::now();
    let company = sqlx::query_as::<_, Company>(&format!(
        r#"
        INSERT INTO companies
            (owner_id, name, job_role, apply_route, deadline, status_text, memo, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {COMPANY_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(command.name.unwrap_or_default())
    .bind(command.job_role.unwrap_or_default())
    .bind(command.apply_route.unwrap_or_default())
    .bind(command.deadline)
    .bind(command.status_text.unwrap_or_default())
    .bind(command.memo.unwrap_or_default())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::info!(company_id = company.id, "Company created");
    Ok(company)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{test_pool, TestUser};

    #[test]
    fn test_owner_in_body_is_ignored() {
        let cmd: CreateCompanyCommand =
            serde_json::from_str(r#"{"name": "Acme", "owner": 999}"#).unwrap();
        assert_eq!(cmd.name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_validation() {
        let Err(CreateCompanyError::Validation(errors)) = CreateCompanyCommand::default().validate()
        else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("name"), Some(&["This field is required.".to_string()][..]));

        let cmd = CreateCompanyCommand {
            name: Some("Acme".into()),
            job_role: Some("x".repeat(201)),
            ..Default::default()
        };
        let Err(CreateCompanyError::Validation(errors)) = cmd.validate() else {
            panic!("expected validation error");
        };
        assert!(errors.get("job_role").is_some());
    }

    #[tokio::test]
    async fn test_create_sets_owner_and_defaults() {
        let pool = test_pool().await;
        let user = TestUser::new("taro@example.com").insert(&pool).await.unwrap();

        let cmd = CreateCompanyCommand {
            name: Some("Acme".into()),
            deadline: NaiveDate::from_ymd_opt(2026, 1, 15),
            ..Default::default()
        };
        let company = handle(&pool, user.id, cmd).await.unwrap();

        assert_eq!(company.owner_id, user.id);
        assert_eq!(company.name, "Acme");
        assert_eq!(company.job_role, "");
        assert_eq!(company.deadline, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(company.created_at, company.updated_at);
    }
}
