//! Company list of the caller, unpaginated

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::features::companies::types::{Company, CompanyOrdering};
use crate::features::shared::list_owned;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCompaniesQuery {
    pub ordering: Option<String>,
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &SqlitePool,
    owner_id: i64,
    query: ListCompaniesQuery,
) -> Result<Vec<Company>, sqlx::Error> {
    let ordering = CompanyOrdering::parse(query.ordering.as_deref());
    list_owned::<Company>(pool, owner_id, &[], ordering.sql()).await
}
