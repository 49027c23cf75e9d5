//! Feature modules implementing the jobtrack API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes:
//!
//! - **auth**: registration, login, logout, profile and settings
//! - **companies**: companies the user applies to
//! - **es_versions**: entry-sheet versions filed under a company, with uploads
//! - **media**: ownership-checked access to uploaded files
//!
//! Audit-log routes live in [`crate::audit`].

pub mod auth;
pub mod companies;
pub mod es_versions;
pub mod media;
pub mod shared;

use axum::Router;

use crate::api::AppState;

/// All JSON routes, to be nested under `/api`
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::auth_routes(&state.limiters))
        .merge(companies::companies_routes(&state.limiters))
        .merge(es_versions::es_routes(&state.limiters, &state.uploads))
        .merge(crate::audit::audit_routes())
}
