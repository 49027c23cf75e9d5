//! Entry-sheet versions of the caller, newest first
//!
//! The company filter narrows the owner filter; it never widens it.

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::features::es_versions::types::EsVersionSummary;
use crate::features::shared::list_owned;

const ES_ORDER: &str = "created_at DESC, id DESC";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEsVersionsQuery {
    pub company_id: Option<i64>,
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: &SqlitePool,
    owner_id: i64,
    query: ListEsVersionsQuery,
) -> Result<Vec<EsVersionSummary>, sqlx::Error> {
    match query.company_id {
        Some(company_id) => {
            list_owned::<EsVersionSummary>(pool, owner_id, &[("company_id", company_id)], ES_ORDER)
                .await
        },
        None => list_owned::<EsVersionSummary>(pool, owner_id, &[], ES_ORDER).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{test_pool, TestCompany, TestEsVersion, TestUser};

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let pool = test_pool().await;
        let alice = TestUser::new("alice@example.com").insert(&pool).await.unwrap();
        let bob = TestUser::new("bob@example.com").insert(&pool).await.unwrap();
        let acme = TestCompany::new(&alice, "Acme").insert(&pool).await.unwrap();
        let globex = TestCompany::new(&alice, "Globex").insert(&pool).await.unwrap();
        let bobs = TestCompany::new(&bob, "Initech").insert(&pool).await.unwrap();

        let first = TestEsVersion::new(&alice, &acme).insert(&pool).await.unwrap();
        let second = TestEsVersion::new(&alice, &globex).insert(&pool).await.unwrap();
        let third = TestEsVersion::new(&alice, &acme).insert(&pool).await.unwrap();
        TestEsVersion::new(&bob, &bobs).insert(&pool).await.unwrap();

        let all = handle(&pool, alice.id, ListEsVersionsQuery::default()).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|es| es.id).collect();
        assert_eq!(ids, [third.id, second.id, first.id]);

        let acme_only = handle(&pool, alice.id, ListEsVersionsQuery { company_id: Some(acme.id) })
            .await
            .unwrap();
        let ids: Vec<i64> = acme_only.iter().map(|es| es.id).collect();
        assert_eq!(ids, [third.id, first.id]);

        let foreign = handle(&pool, alice.id, ListEsVersionsQuery { company_id: Some(bobs.id) })
            .await
            .unwrap();
        assert!(foreign.is_empty());
    }

    #[tokio::test]
    async fn test_list_projection_has_no_body() {
        let pool = test_pool().await;
        let user = TestUser::new("taro@example.com").insert(&pool).await.unwrap();
        let company = TestCompany::new(&user, "Acme").insert(&pool).await.unwrap();
        TestEsVersion::new(&user, &company).with_body("long text").insert(&pool).await.unwrap();

        let list = handle(&pool, user.id, ListEsVersionsQuery::default()).await.unwrap();
        let json = serde_json::to_value(&list).unwrap();
        assert!(json[0].get("body").is_none());
        assert_eq!(json[0]["company"], company.id);
    }
}
