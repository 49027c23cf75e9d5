//! Partial update of one of the caller's companies
//!
//! Omitted fields keep their value; `"deadline": null` clears the deadline.
//! Another user's company is reported as not found.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::{AppError, FieldErrors};
use crate::features::companies::types::{
    Company, COMPANY_COLUMNS, MAX_NAME_LENGTH, MAX_SHORT_TEXT_LENGTH,
};
use crate::features::shared::deserialize_nullable;
use crate::features::shared::validation::{validate_max_length, validate_not_blank};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompanyCommand {
    pub name: Option<String>,
    pub job_role: Option<String>,
    pub apply_route: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub deadline: Option<Option<NaiveDate>>,
    pub status_text: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateCompanyError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Company {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateCompanyError> for AppError {
    fn from(e: UpdateCompanyError) -> Self {
        match e {
            UpdateCompanyError::Validation(errors) => AppError::Validation(errors),
            UpdateCompanyError::NotFound(_) => AppError::not_found(),
            UpdateCompanyError::Database(e) => AppError::Database(e),
        }
    }
}

impl UpdateCompanyCommand {
    pub fn validate(&self) -> Result<(), UpdateCompanyError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            errors.check("name", validate_not_blank(name, MAX_NAME_LENGTH));
        }
        for (field, value) in [
            ("job_role", &self.job_role),
            ("apply_route", &self.apply_route),
            ("status_text", &self.status_text),
        ] {
            if let Some(value) = value {
                errors.check(field, validate_max_length(value, MAX_SHORT_TEXT_LENGTH));
            }
        }
        errors.into_result().map_err(UpdateCompanyError::Validation)
    }
}

#[tracing::instrument(skip(pool, command))]
pub async fn handle(
    pool: &SqlitePool,
    owner_id: i64,
    id: i64,
    command: UpdateCompanyCommand,
) -> Result<Company, UpdateCompanyError> {
    command.validate()?;

    let (deadline_set, deadline) = match command.deadline {
        Some(value) => (true, value),
        None => (false, None),
    };

    let company = sqlx::query_as::<_, Company>(&format!(
        r#"
        UPDATE companies
        SET name        = COALESCE(?, name),
            job_role    = COALESCE(?, job_role),
            apply_route = COALESCE(?, apply_route),
            deadline    = CASE WHEN ? THEN ? ELSE deadline END,
            status_text = COALESCE(?, status_text),
            memo        = COALESCE(?, memo),
            updated_at  = ?
        WHERE id = ? AND owner_id = ?
        RETURNING {COMPANY_COLUMNS}
        "#
    ))
    .bind(&command.name)
    .bind(&command.job_role)
    .bind(&command.apply_route)
    .bind(deadline_set)
    .bind(deadline)
    .bind(&command.status_text)
    .bind(&command.memo)
    .bind(Utc::now())
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?
    .ok_or(UpdateCompanyError::NotFound(id))?;

    tracing::info!(company_id = company.id, "Company updated");
    Ok(company)
}
