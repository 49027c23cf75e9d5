//! Account, settings and profile payload types

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const DEFAULT_DISPLAY_NAME: &str = "就活 太郎";
pub const DEFAULT_GRADUATION_YEAR: &str = "2026年卒";
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;
pub const MAX_GRADUATION_YEAR_LENGTH: usize = 20;

#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserSettings {
    pub user_id: i64,
    pub diff_enabled: bool,
    pub display_name: String,
    pub graduation_year: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body returned by register, login, `/me` and settings updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub diff_enabled: bool,
    pub display_name: String,
    pub graduation_year: String,
}
