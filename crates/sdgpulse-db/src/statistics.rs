//! Database operations for the `statistics_snapshots` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A freshly computed snapshot for one scope, ready to overwrite the stored
/// one. Ranking fields are `None` when the scope has no ranked topics yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewStatistics {
    pub scope: String,
    pub total: i64,
    pub sdg_total: i64,
    pub max_topic: Option<String>,
    pub max_count: Option<i64>,
    pub min_topic: Option<String>,
    pub min_count: Option<i64>,
    pub max_positive_topic: Option<String>,
    pub max_positive_share: Option<f64>,
    pub max_negative_topic: Option<String>,
    pub max_negative_share: Option<f64>,
}

/// A row from the `statistics_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatisticsRow {
    pub scope: String,
    pub total: i64,
    pub sdg_total: i64,
    pub max_topic: Option<String>,
    pub max_count: Option<i64>,
    pub min_topic: Option<String>,
    pub min_count: Option<i64>,
    pub max_positive_topic: Option<String>,
    pub max_positive_share: Option<f64>,
    pub max_negative_topic: Option<String>,
    pub max_negative_share: Option<f64>,
    pub computed_at: DateTime<Utc>,
}

const STATISTICS_COLUMNS: &str = "scope, total, sdg_total, max_topic, max_count, min_topic, min_count, \
     max_positive_topic, max_positive_share, max_negative_topic, max_negative_share, computed_at";

/// Overwrite the snapshot for a scope.
///
/// The row is fully replaced; stale ranking fields from a previous run never
/// survive into the new snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_statistics(pool: &PgPool, stats: &NewStatistics) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO statistics_snapshots \
             (scope, total, sdg_total, max_topic, max_count, min_topic, min_count, \
              max_positive_topic, max_positive_share, max_negative_topic, max_negative_share, \
              computed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW()) \
         ON CONFLICT (scope) DO UPDATE SET \
             total = EXCLUDED.total, \
             sdg_total = EXCLUDED.sdg_total, \
             max_topic = EXCLUDED.max_topic, \
             max_count = EXCLUDED.max_count, \
             min_topic = EXCLUDED.min_topic, \
             min_count = EXCLUDED.min_count, \
             max_positive_topic = EXCLUDED.max_positive_topic, \
             max_positive_share = EXCLUDED.max_positive_share, \
             max_negative_topic = EXCLUDED.max_negative_topic, \
             max_negative_share = EXCLUDED.max_negative_share, \
             computed_at = NOW()",
    )
    .bind(&stats.scope)
    .bind(stats.total)
    .bind(stats.sdg_total)
    .bind(&stats.max_topic)
    .bind(stats.max_count)
    .bind(&stats.min_topic)
    .bind(stats.min_count)
    .bind(&stats.max_positive_topic)
    .bind(stats.max_positive_share)
    .bind(&stats.max_negative_topic)
    .bind(stats.max_negative_share)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches the snapshot for one scope.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the scope has no snapshot, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_statistics(pool: &PgPool, scope: &str) -> Result<StatisticsRow, DbError> {
    let row = sqlx::query_as::<_, StatisticsRow>(&format!(
        "SELECT {STATISTICS_COLUMNS} FROM statistics_snapshots WHERE scope = $1"
    ))
    .bind(scope)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns every stored snapshot, ordered by scope.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_statistics(pool: &PgPool) -> Result<Vec<StatisticsRow>, DbError> {
    let rows = sqlx::query_as::<_, StatisticsRow>(&format!(
        "SELECT {STATISTICS_COLUMNS} FROM statistics_snapshots ORDER BY scope"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
