//! Read-only audit log API
//!
//! - `GET /auditlogs` - the caller's own entries, newest first
//! - `GET /auditlogs/:id` - one of the caller's entries
//!
//! Any other method on these paths answers 405; entries are never created,
//! changed or removed through the API.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use super::models::{AuditEntry, AuditQuery};
use super::queries::{get_user_audit_log, list_user_audit_logs};
use crate::api::AppState;
use crate::error::AppError;
use crate::features::auth::CurrentUser;

pub fn audit_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auditlogs",
            get(list_audit_logs).fallback(method_not_allowed),
        )
        .route(
            "/auditlogs/:id",
            get(get_audit_log).fallback(method_not_allowed),
        )
}

#[tracing::instrument(skip(state, user, query), fields(user_id = user.id))]
async fn list_audit_logs(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let logs = list_user_audit_logs(&state.db, user.id, &query).await?;
    Ok(Json(logs))
}

#[tracing::instrument(skip(state, user), fields(user_id = user.id))]
async fn get_audit_log(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<AuditEntry>, AppError> {
    get_user_audit_log(&state.db, user.id, id)
        .await?
        .map(Json)
        .ok_or_else(AppError::not_found)
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
