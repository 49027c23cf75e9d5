//! Partial update of one of the caller's entry-sheet versions
//!
//! Moving the version to another company requires that company to be the
//! caller's as well. A new upload replaces the stored reference; the
//! previous file is left in storage.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use super::{check_common_fields, FileStore, INVALID_COMPANY};
use crate::error::{AppError, FieldErrors};
use crate::features::companies::Company;
use crate::features::es_versions::payload::FileChange;
use crate::features::es_versions::types::{EsVersion, ES_COLUMNS};
use crate::features::shared::{deserialize_nullable, is_owned};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEsVersionCommand {
    pub company: Option<i64>,
    pub body: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub submitted_at: Option<Option<NaiveDate>>,
    pub submitted_via: Option<String>,
    pub result: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateEsVersionError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("ES version {0} not found")]
    NotFound(i64),

    #[error("Company {0} is not owned by the caller")]
    CompanyNotOwned(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UpdateEsVersionError> for AppError {
    fn from(e: UpdateEsVersionError) -> Self {
        match e {
            UpdateEsVersionError::Validation(errors) => AppError::Validation(errors),
            UpdateEsVersionError::NotFound(_) => AppError::not_found(),
            UpdateEsVersionError::CompanyNotOwned(_) => {
                AppError::PermissionDenied(INVALID_COMPANY.to_string())
            },
            UpdateEsVersionError::Storage(e) => AppError::Io(e),
            UpdateEsVersionError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool, files, command, file))]
pub async fn handle(
    pool: &SqlitePool,
    files: FileStore<'_>,
    owner_id: i64,
    id: i64,
    command: UpdateEsVersionCommand,
    file: FileChange,
) -> Result<EsVersion, UpdateEsVersionError> {
    if !is_owned::<EsVersion>(pool, owner_id, id).await? {
        return Err(UpdateEsVersionError::NotFound(id));
    }

    let mut errors = FieldErrors::new();
    let result = check_common_fields(
        &mut errors,
        command.result.as_deref(),
        command.submitted_via.as_deref(),
    );
    if let FileChange::Replace(upload) = &file {
        files.check(&mut errors, Some(upload));
    }
    if let Some(company_id) = command.company {
        if !is_owned::<Company>(pool, owner_id, company_id).await? {
            errors.add("company", INVALID_COMPANY);
        }
    }
    errors.into_result().map_err(UpdateEsVersionError::Validation)?;

    let (file_set, stored) = match &file {
        FileChange::Keep => (false, None),
        FileChange::Clear => (true, None),
        FileChange::Replace(upload) => (true, Some(files.save(upload).await?)),
    };
    let (submitted_at_set, submitted_at) = match command.submitted_at {
        Some(value) => (true, value),
        None => (false, None),
    };

    let updated = sqlx::query_as::<_, EsVersion>(&format!(
        r#"
        UPDATE es_versions
        SET company_id    = COALESCE(?, company_id),
            body          = COALESCE(?, body),
            submitted_at  = CASE WHEN ? THEN ? ELSE submitted_at END,
            submitted_via = COALESCE(?, submitted_via),
            result        = COALESCE(?, result),
            memo          = COALESCE(?, memo),
            file          = CASE WHEN ? THEN ? ELSE file END,
            updated_at    = ?
        WHERE id = ? AND owner_id = ?
          AND EXISTS (
              SELECT 1 FROM companies
              WHERE id = COALESCE(?, es_versions.company_id) AND owner_id = ?
          )
        RETURNING {ES_COLUMNS}
        "#
    ))
    .bind(command.company)
    .bind(&command.body)
    .bind(submitted_at_set)
    .bind(submitted_at)
    .bind(&command.submitted_via)
    .bind(result)
    .bind(&command.memo)
    .bind(file_set)
    .bind(&stored)
    .bind(Utc::now())
    .bind(id)
    .bind(owner_id)
    .bind(command.company)
    .bind(owner_id)
    .fetch_optional(pool)
    .await;

    match updated {
        Ok(Some(es)) => {
            tracing::info!(es_id = es.id, "ES version updated");
            Ok(es)
        },
        Ok(None) => {
            files.discard(stored.as_deref()).await;
            match command.company {
                Some(company_id) if is_owned::<EsVersion>(pool, owner_id, id).await? => {
                    Err(UpdateEsVersionError::CompanyNotOwned(company_id))
                },
                _ => Err(UpdateEsVersionError::NotFound(id)),
            }
        },
        Err(e) => {
            files.discard(stored.as_deref()).await;
            Err(e.into())
        },
    }
}
