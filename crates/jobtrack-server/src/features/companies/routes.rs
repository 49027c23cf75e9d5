//! Company API routes
//!
//! - `GET /companies` - list (`?ordering=deadline|-deadline|updated_at|-updated_at`)
//! - `POST /companies` - create
//! - `GET /companies/:id` - retrieve
//! - `PATCH /companies/:id` - partial update
//! - `DELETE /companies/:id` - delete
//!
//! Every route counts against the caller's hourly resource quota. Mutations
//! are audited through [`AuditInterceptor`] with [`COMPANY_AUDIT`].

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};

use super::commands::{self, CreateCompanyCommand, UpdateCompanyCommand};
use super::queries::{self, ListCompaniesQuery};
use super::types::{Company, COMPANY_AUDIT};
use crate::api::AppState;
use crate::audit::AuditInterceptor;
use crate::error::AppError;
use crate::features::auth::CurrentUser;
use crate::features::shared::AppJson;
use crate::middleware::rate_limit::{limit_resource, RateLimiters};
use crate::middleware::ClientInfo;

pub const RATE_LIMIT_SCOPE: &str = "companies";

pub fn companies_routes(limiters: &RateLimiters) -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/:id",
            get(get_company).patch(update_company).delete(delete_company),
        )
        .route_layer(from_fn_with_state(
            (limiters.clone(), RATE_LIMIT_SCOPE),
            limit_resource,
        ))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
async fn list_companies(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListCompaniesQuery>,
) -> Result<Json<Vec<Company>>, AppError> {
    Ok(Json(queries::list::handle(&state.db, user.id, query).await?))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
async fn create_company(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    AppJson(command): AppJson<CreateCompanyCommand>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let audit = AuditInterceptor::new(&state.db, &COMPANY_AUDIT, user.id, &client);
    let company = audit
        .on_create(commands::create::handle(&state.db, user.id, command))
        .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[tracing::instrument(skip_all, fields(user_id = user.id, company_id = id))]
async fn get_company(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(queries::get::handle(&state.db, user.id, id).await?))
}

#[tracing::instrument(skip_all, fields(user_id = user.id, company_id = id))]
async fn update_company(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<i64>,
    AppJson(command): AppJson<UpdateCompanyCommand>,
) -> Result<Json<Company>, AppError> {
    let audit = AuditInterceptor::new(&state.db, &COMPANY_AUDIT, user.id, &client);
    let company = audit
        .on_update(commands::update::handle(&state.db, user.id, id, command))
        .await?;
    Ok(Json(company))
}

#[tracing::instrument(skip_all, fields(user_id = user.id, company_id = id))]
async fn delete_company(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let audit = AuditInterceptor::new(&state.db, &COMPANY_AUDIT, user.id, &client);
    audit
        .on_delete(commands::delete::handle(&state.db, user.id, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
