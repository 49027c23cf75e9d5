//! Audit a logout; the route destroys the session afterwards

use sqlx::SqlitePool;

use crate::audit::{self, AuditAction, CreateAuditEntry};
use crate::features::auth::session::CurrentUser;
use crate::middleware::ClientInfo;

#[tracing::instrument(skip(pool, user, client), fields(user_id = user.id))]
pub async fn handle(pool: &SqlitePool, user: &CurrentUser, client: &ClientInfo) {
    let entry = CreateAuditEntry::builder(AuditAction::Logout)
        .user(user.id)
        .client(client)
        .build();
    audit::record(pool, entry).await;
    tracing::info!("User logged out");
}
