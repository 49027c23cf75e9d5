//! Single company lookup

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::features::companies::types::Company;
use crate::features::shared::fetch_owned;

#[derive(Debug, thiserror::Error)]
pub enum GetCompanyError {
    #[error("Company {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<GetCompanyError> for AppError {
    fn from(e: GetCompanyError) -> Self {
        match e {
            GetCompanyError::NotFound(_) => AppError::not_found(),
            GetCompanyError::Database(e) => AppError::Database(e),
        }
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &SqlitePool, owner_id: i64, id: i64) -> Result<Company, GetCompanyError> {
    fetch_owned::<Company>(pool, owner_id, id)
        .await?
        .ok_or(GetCompanyError::NotFound(id))
}
