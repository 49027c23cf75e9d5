//! Hard delete of one of the caller's companies
//!
//! Entry-sheet versions filed under the company go with it (cascade).

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::features::companies::types::Company;
use crate::features::shared::delete_owned;

#[derive(Debug, thiserror::Error)]
pub enum DeleteCompanyError {
    #[error("Company {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DeleteCompanyError> for AppError {
    fn from(e: DeleteCompanyError) -> Self {
        match e {
            DeleteCompanyError::NotFound(_) => AppError::not_found(),
            DeleteCompanyError::Database(e) => AppError::Database(e),
        }
    }
}

/// Returns the id of the deleted row
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: &SqlitePool, owner_id: i64, id: i64) -> Result<i64, DeleteCompanyError> {
    let deleted = delete_owned::<Company>(pool, owner_id, id)
        .await?
        .ok_or(DeleteCompanyError::NotFound(id))?;

    tracing::info!(company_id = deleted, "Company deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{test_pool, TestCompany, TestEsVersion, TestUser};

    #[tokio::test]
    async fn test_delete_cascades_to_es_versions() {
        let pool = test_pool().await;
        let user = TestUser::new("taro@example.com").insert(&pool).await.unwrap();
        let company = TestCompany::new(&user, "Acme").insert(&pool).await.unwrap();
        TestEsVersion::new(&user, &company).insert(&pool).await.unwrap();

        assert_eq!(handle(&pool, user.id, company.id).await.unwrap(), company.id);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM es_versions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);

        assert!(matches!(
            handle(&pool, user.id, company.id).await,
            Err(DeleteCompanyError::NotFound(_))
        ));
    }
}
