//! Database queries for audit logs
//!
//! Only inserts and reads exist. The table itself refuses UPDATE and DELETE.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::models::{AuditEntry, AuditOrdering, AuditQuery, CreateAuditEntry, AUDIT_COLUMNS};

/// Insert a new audit log entry
pub async fn create_audit_entry(
    pool: &SqlitePool,
    entry: CreateAuditEntry,
) -> Result<AuditEntry, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO audit_logs (
            user_id, input_email, action, target_type, target_id,
            ip_address, user_agent, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {AUDIT_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, AuditEntry>(&sql)
        .bind(entry.user_id)
        .bind(&entry.input_email)
        .bind(entry.action.as_str())
        .bind(&entry.target_type)
        .bind(entry.target_id)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    debug!(
        audit_id = record.id,
        action = %entry.action,
        target_type = %entry.target_type,
        "Created audit log entry"
    );

    Ok(record)
}

/// Audit entries belonging to `user_id`
pub async fn list_user_audit_logs(
    pool: &SqlitePool,
    user_id: i64,
    query: &AuditQuery,
) -> Result<Vec<AuditEntry>, sqlx::Error> {
    let ordering = AuditOrdering::parse(query.ordering.as_deref());

    let mut sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE user_id = ?");
    if query.action.is_some() {
        sql.push_str(" AND action = ?");
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(ordering.sql());

    let mut builder = sqlx::query_as::<_, AuditEntry>(&sql).bind(user_id);
    if let Some(action) = query.action {
        builder = builder.bind(action.as_str());
    }

    builder.fetch_all(pool).await
}

/// A single audit entry, only if it belongs to `user_id`
pub async fn get_user_audit_log(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
) -> Result<Option<AuditEntry>, sqlx::Error> {
    let sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_logs WHERE id = ? AND user_id = ?");

    sqlx::query_as::<_, AuditEntry>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Every entry, newest first (used by tests and operators)
pub async fn list_all_audit_logs(pool: &SqlitePool) -> Result<Vec<AuditEntry>, sqlx::Error> {
    let sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_logs ORDER BY created_at DESC, id DESC");
    sqlx::query_as::<_, AuditEntry>(&sql).fetch_all(pool).await
}
