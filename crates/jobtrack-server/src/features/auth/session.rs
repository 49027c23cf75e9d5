//! Session-backed identity
//!
//! The only thing stored in the session is the authenticated user's id.
//! [`CurrentUser`] resolves it on every request and rejects with 403 when
//! the session is anonymous or points at a user that no longer exists.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::SqlitePool;
use tower_sessions::Session;

use super::types::UserRecord;
use crate::api::AppState;
use crate::error::AppError;

pub const USER_ID_KEY: &str = "user_id";

/// Id of the logged-in user, if any
pub async fn session_user_id(session: &Session) -> Result<Option<i64>, AppError> {
    Ok(session.get::<i64>(USER_ID_KEY).await?)
}

/// Attach `user_id` to the session under a fresh session id
pub async fn login_session(session: &Session, user_id: i64) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Drop all session data and the session record itself
pub async fn logout_session(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl CurrentUser {
    /// Explicit email, falling back to the login name
    pub fn display_email(&self) -> &str {
        if self.email.is_empty() {
            &self.username
        } else {
            &self.email
        }
    }

    pub async fn load(pool: &SqlitePool, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, password_hash FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user.map(Self::from))
    }
}

impl From<UserRecord> for CurrentUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(message.to_string()))?;

        let user_id = session_user_id(&session)
            .await?
            .ok_or(AppError::AuthenticationRequired)?;

        CurrentUser::load(&state.db, user_id)
            .await?
            .ok_or(AppError::AuthenticationRequired)
    }
}
