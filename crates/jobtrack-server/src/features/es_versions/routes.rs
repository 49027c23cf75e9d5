//! Entry-sheet API routes
//!
//! - `GET /es` - list, without bodies (`?company_id=` filter)
//! - `POST /es` - create (JSON or multipart with a `file` part)
//! - `GET /es/:id` - retrieve
//! - `PATCH /es/:id` - partial update (JSON or multipart)
//! - `DELETE /es/:id` - delete
//! - `GET /companies/:id/es` - list for one company
//! - `POST /companies/:id/es` - create under that company
//!
//! All routes share one hourly quota per user, separate from companies.

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};

use super::commands::{self, CreateEsVersionCommand, FileStore, UpdateEsVersionCommand};
use super::payload::EsPayload;
use super::queries::{self, ListEsVersionsQuery};
use super::types::{EsVersion, EsVersionSummary, ES_AUDIT};
use crate::api::AppState;
use crate::audit::AuditInterceptor;
use crate::config::UploadConfig;
use crate::error::AppError;
use crate::features::auth::CurrentUser;
use crate::middleware::rate_limit::{limit_resource, RateLimiters};
use crate::middleware::ClientInfo;

pub const RATE_LIMIT_SCOPE: &str = "es";

/// Room for multipart framing and text fields around the file itself
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

pub fn es_routes(limiters: &RateLimiters, uploads: &UploadConfig) -> Router<AppState> {
    let body_limit = usize::try_from(uploads.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(BODY_LIMIT_SLACK);

    Router::new()
        .route("/es", get(list_es).post(create_es))
        .route("/es/:id", get(get_es).patch(update_es).delete(delete_es))
        .route(
            "/companies/:id/es",
            get(list_company_es).post(create_company_es),
        )
        .route_layer(from_fn_with_state(
            (limiters.clone(), RATE_LIMIT_SCOPE),
            limit_resource,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
}

fn file_store(state: &AppState) -> FileStore<'_> {
    FileStore {
        storage: &state.storage,
        uploads: &state.uploads,
    }
}

async fn create(
    state: &AppState,
    user: &CurrentUser,
    client: &ClientInfo,
    payload: EsPayload<CreateEsVersionCommand>,
) -> Result<(StatusCode, Json<EsVersion>), AppError> {
    let audit = AuditInterceptor::new(&state.db, &ES_AUDIT, user.id, client);
    let es = audit
        .on_create(commands::create::handle(
            &state.db,
            file_store(state),
            user.id,
            payload.fields,
            payload.file.into_upload(),
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(es)))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
async fn list_es(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListEsVersionsQuery>,
) -> Result<Json<Vec<EsVersionSummary>>, AppError> {
    Ok(Json(queries::list::handle(&state.db, user.id, query).await?))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
async fn create_es(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    payload: EsPayload<CreateEsVersionCommand>,
) -> Result<(StatusCode, Json<EsVersion>), AppError> {
    create(&state, &user, &client, payload).await
}

#[tracing::instrument(skip_all, fields(user_id = user.id, company_id = company_id))]
async fn list_company_es(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(company_id): Path<i64>,
) -> Result<Json<Vec<EsVersionSummary>>, AppError> {
    let query = ListEsVersionsQuery {
        company_id: Some(company_id),
    };
    Ok(Json(queries::list::handle(&state.db, user.id, query).await?))
}

/// The company in the path wins over any `company` in the body
#[tracing::instrument(skip_all, fields(user_id = user.id, company_id = company_id))]
async fn create_company_es(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    Path(company_id): Path<i64>,
    mut payload: EsPayload<CreateEsVersionCommand>,
) -> Result<(StatusCode, Json<EsVersion>), AppError> {
    payload.fields.company = Some(company_id);
    create(&state, &user, &client, payload).await
}

#[tracing::instrument(skip_all, fields(user_id = user.id, es_id = id))]
async fn get_es(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<EsVersion>, AppError> {
    Ok(Json(queries::get::handle(&state.db, user.id, id).await?))
}

#[tracing::instrument(skip_all, fields(user_id = user.id, es_id = id))]
async fn update_es(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<i64>,
    payload: EsPayload<UpdateEsVersionCommand>,
) -> Result<Json<EsVersion>, AppError> {
    let audit = AuditInterceptor::new(&state.db, &ES_AUDIT, user.id, &client);
    let es = audit
        .on_update(commands::update::handle(
            &state.db,
            file_store(&state),
            user.id,
            id,
            payload.fields,
            payload.file,
        ))
        .await?;
    Ok(Json(es))
}

#[tracing::instrument(skip_all, fields(user_id = user.id, es_id = id))]
async fn delete_es(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let audit = AuditInterceptor::new(&state.db, &ES_AUDIT, user.id, &client);
    audit
        .on_delete(commands::delete::handle(&state.db, user.id, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
