//! Who may read which stored file
//!
//! Access is a closed allow-list of path prefixes. Entry-sheet uploads are
//! readable by the owner of the row that references the exact path. Any
//! other prefix is refused.

use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::storage::{MediaStorage, ES_FILES_PREFIX};

/// Absolute path of `relative` if `user_id` may read it
///
/// Missing files, paths escaping the media root and files the user does
/// not own all yield `None`; callers answer 404 in every case.
#[tracing::instrument(skip(pool, storage))]
pub async fn authorize(
    pool: &SqlitePool,
    storage: &MediaStorage,
    user_id: i64,
    relative: &str,
) -> Result<Option<PathBuf>, sqlx::Error> {
    let Some(full_path) = storage.resolve(relative).await else {
        return Ok(None);
    };

    if !relative.starts_with(ES_FILES_PREFIX) {
        tracing::debug!("Media path outside of allowed prefixes");
        return Ok(None);
    }

    let owned: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM es_versions WHERE file = ? AND owner_id = ?)",
    )
    .bind(relative)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(owned.then_some(full_path))
}
