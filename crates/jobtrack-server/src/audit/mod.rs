//! Audit logging module
//!
//! The audit trail is append-only. Rows are written for authentication events
//! (login success and failure, logout), settings changes, and every
//! successful company or entry-sheet mutation. Users can read their own rows
//! through [`audit_routes`] and nothing else.
//!
//! # Usage
//!
//! Resource mutations go through [`AuditInterceptor`]:
//!
//! ```rust,ignore
//! let audit = AuditInterceptor::new(&state.db, &COMPANY_AUDIT, user.id, &client);
//! let company = audit.on_create(create::handle(&state.db, user.id, command)).await?;
//! ```
//!
//! Other events are written directly:
//!
//! ```rust,ignore
//! let entry = CreateAuditEntry::builder(AuditAction::Logout)
//!     .user(user.id)
//!     .client(&client)
//!     .build();
//! create_audit_entry(&pool, entry).await?;
//! ```

mod interceptor;
mod models;
mod queries;
mod routes;

pub use interceptor::{AuditInterceptor, AuditPolicy, AuditTarget, Mutation};
pub use models::{AuditAction, AuditEntry, AuditEntryBuilder, AuditOrdering, AuditQuery, CreateAuditEntry};
pub use queries::{create_audit_entry, get_user_audit_log, list_all_audit_logs, list_user_audit_logs};
pub use routes::audit_routes;

/// Write an audit entry, logging instead of failing the request on error
pub async fn record(pool: &sqlx::SqlitePool, entry: CreateAuditEntry) {
    let action = entry.action;
    if let Err(e) = create_audit_entry(pool, entry).await {
        tracing::error!(error = ?e, %action, "Failed to write audit log entry");
    }
}
