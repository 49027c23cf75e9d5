//! Audit logging around resource mutations
//!
//! A resource opts in by declaring an [`AuditPolicy`] (its target-type label
//! and the action recorded for each mutation kind) and implementing
//! [`AuditTarget`] on the values its create/update/delete handlers return.
//! [`AuditInterceptor`] then runs the handler future and, only when it
//! succeeds, writes exactly one audit row for it.
//!
//! The audit insert happens after the mutation has been committed and is not
//! part of the same transaction. If it fails the mutation stands and the
//! failure is logged.

use sqlx::SqlitePool;
use std::future::Future;

use super::models::{AuditAction, CreateAuditEntry};
use crate::middleware::ClientInfo;

/// Kind of mutation being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

/// Per-resource audit mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditPolicy {
    pub target_type: &'static str,
    pub on_create: AuditAction,
    pub on_update: AuditAction,
    pub on_delete: AuditAction,
}

impl AuditPolicy {
    pub fn action_for(&self, mutation: Mutation) -> AuditAction {
        match mutation {
            Mutation::Create => self.on_create,
            Mutation::Update => self.on_update,
            Mutation::Delete => self.on_delete,
        }
    }
}

/// Value whose id is recorded as the audit target
///
/// Delete handlers return the id of the removed row, captured before the
/// row disappeared.
pub trait AuditTarget {
    fn audit_target_id(&self) -> i64;
}

impl AuditTarget for i64 {
    fn audit_target_id(&self) -> i64 {
        *self
    }
}

/// Writes one audit row per successful mutation for one actor and request
pub struct AuditInterceptor<'a> {
    pool: &'a SqlitePool,
    policy: &'static AuditPolicy,
    actor_id: i64,
    client: &'a ClientInfo,
}

impl<'a> AuditInterceptor<'a> {
    pub fn new(
        pool: &'a SqlitePool,
        policy: &'static AuditPolicy,
        actor_id: i64,
        client: &'a ClientInfo,
    ) -> Self {
        Self {
            pool,
            policy,
            actor_id,
            client,
        }
    }

    pub async fn on_create<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        T: AuditTarget,
        F: Future<Output = Result<T, E>>,
    {
        self.run(Mutation::Create, operation).await
    }

    pub async fn on_update<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        T: AuditTarget,
        F: Future<Output = Result<T, E>>,
    {
        self.run(Mutation::Update, operation).await
    }

    pub async fn on_delete<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        T: AuditTarget,
        F: Future<Output = Result<T, E>>,
    {
        self.run(Mutation::Delete, operation).await
    }

    /// Await `operation`; record it only when it returned `Ok`
    pub async fn run<T, E, F>(&self, mutation: Mutation, operation: F) -> Result<T, E>
    where
        T: AuditTarget,
        F: Future<Output = Result<T, E>>,
    {
        let value = operation.await?;
        self.record(mutation, value.audit_target_id()).await;
        Ok(value)
    }

    async fn record(&self, mutation: Mutation, target_id: i64) {
        let action = self.policy.action_for(mutation);
        let entry = CreateAuditEntry::builder(action)
            .user(self.actor_id)
            .target(self.policy.target_type, target_id)
            .client(self.client)
            .build();

        super::record(self.pool, entry).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::queries::list_all_audit_logs;
    use crate::features::shared::test_helpers::{test_pool, TestUser};

    static WIDGET_AUDIT: AuditPolicy = AuditPolicy {
        target_type: "Widget",
        on_create: AuditAction::CompanyCreate,
        on_update: AuditAction::CompanyUpdate,
        on_delete: AuditAction::CompanyDelete,
    };

    struct Widget(i64);

    impl AuditTarget for Widget {
        fn audit_target_id(&self) -> i64 {
            self.0
        }
    }

    fn client() -> ClientInfo {
        ClientInfo {
            ip_address: Some("198.51.100.4".into()),
            user_agent: "test-agent".into(),
            ..ClientInfo::default()
        }
    }

    #[test]
    fn test_policy_maps_mutations() {
        assert_eq!(WIDGET_AUDIT.action_for(Mutation::Create), AuditAction::CompanyCreate);
        assert_eq!(WIDGET_AUDIT.action_for(Mutation::Update), AuditAction::CompanyUpdate);
        assert_eq!(WIDGET_AUDIT.action_for(Mutation::Delete), AuditAction::CompanyDelete);
    }

    #[tokio::test]
    async fn test_success_writes_exactly_one_entry() {
        let pool = test_pool().await;
        let user = TestUser::new("dave@example.com").insert(&pool).await.unwrap();
        let client = client();
        let interceptor = AuditInterceptor::new(&pool, &WIDGET_AUDIT, user.id, &client);

        let widget = interceptor
            .on_delete(async { Ok::<_, String>(Widget(42)) })
            .await
            .unwrap();
        assert_eq!(widget.0, 42);

        let logs = list_all_audit_logs(&pool).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "COMPANY_DELETE");
        assert_eq!(logs[0].target_type, "Widget");
        assert_eq!(logs[0].target_id, Some(42));
        assert_eq!(logs[0].user_id, Some(user.id));
        assert_eq!(logs[0].ip_address.as_deref(), Some("198.51.100.4"));
        assert_eq!(logs[0].user_agent, "test-agent");
    }

    #[tokio::test]
    async fn test_failure_writes_nothing() {
        let pool = test_pool().await;
        let user = TestUser::new("erin@example.com").insert(&pool).await.unwrap();
        let client = client();
        let interceptor = AuditInterceptor::new(&pool, &WIDGET_AUDIT, user.id, &client);

        let result = interceptor
            .on_update(async { Err::<Widget, _>("not found") })
            .await;
        assert!(result.is_err());

        assert!(list_all_audit_logs(&pool).await.unwrap().is_empty());
    }
}
