//! Database operations for the `weekly_counts` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::DbError;

/// One additive increment: `n` newly classified posts in the week starting
/// `week_start` for a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBump {
    pub subscription_id: i64,
    pub week_start: NaiveDate,
    pub n: i64,
}

/// Summed volume for one topic within a scope.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicVolumeRow {
    pub topic_id: String,
    pub is_sdg: bool,
    pub total: i64,
}

/// One point of a weekly trend series.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeeklySeriesRow {
    pub week_start: NaiveDate,
    pub posts: i64,
}

/// Fold weekly increments into the table, in one transaction.
///
/// Counts are additive: an existing (subscription, week) row is incremented,
/// never replaced, so weeks never lose posts across runs.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any upsert fails.
pub async fn bump_weekly_counts(pool: &PgPool, bumps: &[WeekBump]) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    for bump in bumps {
        sqlx::query(
            "INSERT INTO weekly_counts (subscription_id, week_start, post_count) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (subscription_id, week_start) DO UPDATE SET \
                 post_count = weekly_counts.post_count + EXCLUDED.post_count, \
                 updated_at = NOW()",
        )
        .bind(bump.subscription_id)
        .bind(bump.week_start)
        .bind(bump.n)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Summed weekly counts per topic for one country, or across all countries
/// when `country_code` is `None`.
///
/// Topics with no counted posts do not appear.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn topic_volumes(
    pool: &PgPool,
    country_code: Option<&str>,
) -> Result<Vec<TopicVolumeRow>, DbError> {
    let rows = sqlx::query_as::<_, TopicVolumeRow>(
        "SELECT s.topic_id, t.is_sdg, SUM(w.post_count)::BIGINT AS total \
         FROM weekly_counts w \
         JOIN subscriptions s ON s.id = w.subscription_id \
         JOIN topics t ON t.id = s.topic_id \
         WHERE ($1::TEXT IS NULL OR s.country_code = $1) \
         GROUP BY s.topic_id, t.is_sdg \
         ORDER BY s.topic_id",
    )
    .bind(country_code)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Weekly trend series for a scope, optionally narrowed to one topic.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn weekly_series(
    pool: &PgPool,
    country_code: Option<&str>,
    topic_id: Option<&str>,
) -> Result<Vec<WeeklySeriesRow>, DbError> {
    let rows = sqlx::query_as::<_, WeeklySeriesRow>(
        "SELECT w.week_start, SUM(w.post_count)::BIGINT AS posts \
         FROM weekly_counts w \
         JOIN subscriptions s ON s.id = w.subscription_id \
         WHERE ($1::TEXT IS NULL OR s.country_code = $1) \
           AND ($2::TEXT IS NULL OR s.topic_id = $2) \
         GROUP BY w.week_start \
         ORDER BY w.week_start",
    )
    .bind(country_code)
    .bind(topic_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
