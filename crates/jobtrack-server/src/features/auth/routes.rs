//! Account API routes
//!
//! - `POST /auth/register` - create an account and log in (5/min per IP)
//! - `POST /auth/login` - log in (5/min per IP)
//! - `POST /auth/logout` - log out
//! - `GET /me` - profile of the caller
//! - `PATCH /me/settings` - partial settings update (30/min per user)

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use tower_sessions::Session;

use super::commands::{self, LoginCommand, RegisterCommand, UpdateSettingsCommand};
use super::queries::{get_profile, profile::profile_of};
use super::session::{login_session, logout_session, CurrentUser};
use super::types::UserProfile;
use crate::api::AppState;
use crate::error::AppError;
use crate::features::shared::AppJson;
use crate::middleware::rate_limit::{limit_auth, limit_settings, RateLimiters};
use crate::middleware::ClientInfo;

pub fn auth_routes(limiters: &RateLimiters) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route_layer(from_fn_with_state(limiters.clone(), limit_auth));

    let settings = Router::new()
        .route("/me/settings", patch(update_settings))
        .route_layer(from_fn_with_state(limiters.clone(), limit_settings));

    Router::new()
        .route("/auth/logout", post(logout))
        .route("/me", get(me))
        .merge(public)
        .merge(settings)
}

#[tracing::instrument(skip_all)]
async fn register(
    State(state): State<AppState>,
    session: Session,
    client: ClientInfo,
    AppJson(command): AppJson<RegisterCommand>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let user = commands::register::handle(&state.db, command, &client).await?;
    login_session(&session, user.id).await?;

    let profile = get_profile(&state.db, &user).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[tracing::instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    client: ClientInfo,
    AppJson(command): AppJson<LoginCommand>,
) -> Result<Json<UserProfile>, AppError> {
    let user = commands::login::handle(&state.db, command, &client).await?;
    login_session(&session, user.id).await?;

    Ok(Json(get_profile(&state.db, &user).await?))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
async fn logout(
    State(state): State<AppState>,
    session: Session,
    user: CurrentUser,
    client: ClientInfo,
) -> Result<impl IntoResponse, AppError> {
    commands::logout::handle(&state.db, &user, &client).await;
    logout_session(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(get_profile(&state.db, &user).await?))
}

#[tracing::instrument(skip_all, fields(user_id = user.id))]
async fn update_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    client: ClientInfo,
    AppJson(command): AppJson<UpdateSettingsCommand>,
) -> Result<Json<UserProfile>, AppError> {
    let settings = commands::update_settings::handle(&state.db, user.id, command, &client).await?;
    Ok(Json(profile_of(&user, settings)))
}
