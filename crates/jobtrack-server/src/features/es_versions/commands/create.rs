//! Create an entry-sheet version under one of the caller's companies
//!
//! The company is checked twice. Validation rejects a company the caller
//! does not own with a field error, and the insert itself only succeeds when
//! the company is still owned at write time. The second check failing means
//! the company changed hands or vanished in between, which surfaces as
//! permission denied.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use super::{check_common_fields, FileStore, INVALID_COMPANY};
use crate::error::{AppError, FieldErrors};
use crate::features::companies::Company;
use crate::features::es_versions::types::{EsResult, EsVersion, ES_COLUMNS};
use crate::features::shared::is_owned;
use crate::storage::upload::UploadedFile;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEsVersionCommand {
    pub company: Option<i64>,
    pub body: Option<String>,
    pub submitted_at: Option<NaiveDate>,
    pub submitted_via: Option<String>,
    pub result: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateEsVersionError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Company {0} is not owned by the caller")]
    CompanyNotOwned(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CreateEsVersionError> for AppError {
    fn from(e: CreateEsVersionError) -> Self {
        match e {
            CreateEsVersionError::Validation(errors) => AppError::Validation(errors),
            CreateEsVersionError::CompanyNotOwned(_) => {
                AppError::PermissionDenied(INVALID_COMPANY.to_string())
            },
            CreateEsVersionError::Storage(e) => AppError::Io(e),
            CreateEsVersionError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, files, command, file), fields(company = ?command.company))]
pub async fn handle(
    pool: &SqlitePool,
    files: FileStore<'_>,
    owner_id: i64,
    command: CreateEsVersionCommand,
    file: Option<UploadedFile>,
) -> Result<EsVersion, CreateEsVersionError> {
    let mut errors = FieldErrors::new();
    let result = check_common_fields(
        &mut errors,
        command.result.as_deref(),
        command.submitted_via.as_deref(),
    );
    files.check(&mut errors, file.as_ref());

    match command.company {
        None => errors.add("company", "This field is required."),
        Some(company_id) => {
            if !is_owned::<Company>(pool, owner_id, company_id).await? {
                errors.add("company", INVALID_COMPANY);
            }
        },
    }
    errors.into_result().map_err(CreateEsVersionError::Validation)?;
    let company_id = command.company.unwrap_or_default();

    let stored = match &file {
        Some(file) => Some(files.save(file).await?),
        None => None,
    };

    let now = Utc::now();
    let inserted = sqlx::query_as::<_, EsVersion>(&format!(
        r#"
        INSERT INTO es_versions
            (owner_id, company_id, body, submitted_at, submitted_via, result, memo, file,
             created_at, updated_at)
        SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
        WHERE EXISTS (SELECT 1 FROM companies WHERE id = ? AND owner_id = ?)
        RETURNING {ES_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(company_id)
    .bind(command.body.unwrap_or_default())
    .bind(command.submitted_at)
    .bind(command.submitted_via.unwrap_or_default())
    .bind(result.unwrap_or_default())
    .bind(command.memo.unwrap_or_default())
    .bind(&stored)
    .bind(now)
    .bind(now)
    .bind(company_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await;

    match inserted {
        Ok(Some(es)) => {
            tracing::info!(es_id = es.id, "ES version created");
            Ok(es)
        },
        Ok(None) => {
            files.discard(stored.as_deref()).await;
            tracing::warn!(company_id, "Company ownership changed before insert");
            Err(CreateEsVersionError::CompanyNotOwned(company_id))
        },
        Err(e) => {
            files.discard(stored.as_deref()).await;
            Err(e.into())
        },
    }
}
