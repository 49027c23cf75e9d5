use sqlx::SqlitePool;

use crate::error::AppError;
use crate::features::es_versions::types::EsVersion;
use crate::features::shared::fetch_owned;

#[derive(Debug, thiserror::Error)]
pub enum GetEsVersionError {
    #[error("ES version {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetEsVersionError> for AppError {
    fn from(e: GetEsVersionError) -> Self {
        match e {
            GetEsVersionError::NotFound(_) => AppError::not_found(),
            GetEsVersionError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &SqlitePool, owner_id: i64, id: i64) -> Result<EsVersion, GetEsVersionError> {
    fetch_owned::<EsVersion>(pool, owner_id, id)
        .await?
        .ok_or(GetEsVersionError::NotFound(id))
}
