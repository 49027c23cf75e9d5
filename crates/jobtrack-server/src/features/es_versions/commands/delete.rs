//! Hard delete of one of the caller's entry-sheet versions

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::features::es_versions::types::EsVersion;
use crate::features::shared::delete_owned;

#[derive(Debug, thiserror::Error)]
pub enum DeleteEsVersionError {
    #[error("ES version {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteEsVersionError> for AppError {
    fn from(e: DeleteEsVersionError) -> Self {
        match e {
            DeleteEsVersionError::NotFound(_) => AppError::not_found(),
            DeleteEsVersionError::Database(e) => AppError::Database(e),
        }
    }
}

/// Returns the id of the deleted row
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &SqlitePool, owner_id: i64, id: i64) -> Result<i64, DeleteEsVersionError> {
    let deleted = delete_owned::<EsVersion>(pool, owner_id, id)
        .await?
        .ok_or(DeleteEsVersionError::NotFound(id))?;

    tracing::info!(es_id = deleted, "ES version deleted");
    Ok(deleted)
}
