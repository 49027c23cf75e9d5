//! Profile lookup with lazily created settings
//!
//! Settings rows are never created at registration. The first read inserts
//! the defaults; later reads see the stored row. Both steps run in one
//! transaction and the insert is a no-op when a row already exists, so
//! concurrent first reads still end with exactly one row.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::features::auth::session::CurrentUser;
use crate::features::auth::types::{
    UserProfile, UserSettings, DEFAULT_DISPLAY_NAME, DEFAULT_GRADUATION_YEAR,
};

const SETTINGS_COLUMNS: &str =
    "user_id, diff_enabled, display_name, graduation_year, created_at, updated_at";

/// Settings of `user_id`, inserting defaults if absent
#[tracing::instrument(skip(pool))]
pub async fn get_or_create_settings(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<UserSettings, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    let inserted = sqlx::query(
        r#"
        INSERT INTO user_settings
            (user_id, diff_enabled, display_name, graduation_year, created_at, updated_at)
        VALUES (?, 1, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(DEFAULT_DISPLAY_NAME)
    .bind(DEFAULT_GRADUATION_YEAR)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let settings = sqlx::query_as::<_, UserSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM user_settings WHERE user_id = ?"
    ))
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    if inserted > 0 {
        tracing::debug!("Created default settings");
    }

    Ok(settings)
}

pub async fn get_profile(pool: &SqlitePool, user: &CurrentUser) -> Result<UserProfile, sqlx::Error> {
    let settings = get_or_create_settings(pool, user.id).await?;
    Ok(profile_of(user, settings))
}

pub(crate) fn profile_of(user: &CurrentUser, settings: UserSettings) -> UserProfile {
    UserProfile {
        id: user.id,
        email: user.display_email().to_string(),
        diff_enabled: settings.diff_enabled,
        display_name: settings.display_name,
        graduation_year: settings.graduation_year,
    }
}
