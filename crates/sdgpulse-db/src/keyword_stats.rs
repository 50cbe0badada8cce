//! Database operations for the `keyword_stats_snapshots` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `keyword_stats_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordStatsRow {
    pub scope: String,
    pub stats: Value,
    pub computed_at: DateTime<Utc>,
}

/// Overwrite the keyword statistics snapshot for a scope.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn replace_keyword_stats(
    pool: &PgPool,
    scope: &str,
    stats: &Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO keyword_stats_snapshots (scope, stats, computed_at) \
         VALUES ($1, $2, NOW()) \
         ON CONFLICT (scope) DO UPDATE SET \
             stats = EXCLUDED.stats, \
             computed_at = NOW()",
    )
    .bind(scope)
    .bind(stats)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches the keyword statistics snapshot for one scope.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the scope has no snapshot, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_keyword_stats(pool: &PgPool, scope: &str) -> Result<KeywordStatsRow, DbError> {
    let row = sqlx::query_as::<_, KeywordStatsRow>(
        "SELECT scope, stats, computed_at FROM keyword_stats_snapshots WHERE scope = $1",
    )
    .bind(scope)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}
