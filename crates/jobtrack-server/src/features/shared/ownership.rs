//! Owner-scoped data access shared by every owned resource
//!
//! Each query here filters on `owner_id` in SQL, so a row that belongs to
//! another user behaves exactly like a row that does not exist. Feature
//! handlers never look rows up by id alone.
//!
//! ```rust,ignore
//! let company = fetch_owned::<Company>(&pool, user.id, id)
//!     .await?
//!     .ok_or(GetCompanyError::NotFound(id))?;
//! ```

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

/// A table whose rows carry an `owner_id` column
///
/// Several projections of the same table may implement this with different
/// column lists.
pub trait OwnedResource: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: &'static str;
    /// Columns selected for this projection
    const COLUMNS: &'static str;
}

/// Row `id` if, and only if, it belongs to `owner_id`
pub async fn fetch_owned<R: OwnedResource>(
    pool: &SqlitePool,
    owner_id: i64,
    id: i64,
) -> Result<Option<R>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ? AND owner_id = ?",
        R::COLUMNS,
        R::TABLE
    );

    sqlx::query_as::<_, R>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

/// Whether row `id` exists and belongs to `owner_id`
pub async fn is_owned<R: OwnedResource>(
    pool: &SqlitePool,
    owner_id: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE id = ? AND owner_id = ?)",
        R::TABLE
    );

    sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_one(pool)
        .await
}

/// All rows of `owner_id`, narrowed by equality `filters`
///
/// Filter columns and `order_by` are compile-time constants supplied by the
/// feature; only values are bound.
pub async fn list_owned<R: OwnedResource>(
    pool: &SqlitePool,
    owner_id: i64,
    filters: &[(&'static str, i64)],
    order_by: &'static str,
) -> Result<Vec<R>, sqlx::Error> {
    let mut sql = format!("SELECT {} FROM {} WHERE owner_id = ?", R::COLUMNS, R::TABLE);
    for (column, _) in filters {
        sql.push_str(&format!(" AND {column} = ?"));
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(order_by);

    let mut query = sqlx::query_as::<_, R>(&sql).bind(owner_id);
    for (_, value) in filters {
        query = query.bind(*value);
    }

    query.fetch_all(pool).await
}

/// Hard-delete row `id` of `owner_id`, returning its id when a row went away
pub async fn delete_owned<R: OwnedResource>(
    pool: &SqlitePool,
    owner_id: i64,
    id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let sql = format!(
        "DELETE FROM {} WHERE id = ? AND owner_id = ? RETURNING id",
        R::TABLE
    );

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}
