//! Database operations for the `wordcloud_snapshots` table.
//!
//! Snapshots are replaced wholesale: a new computation deletes the previous
//! rows for its exact scope and inserts the fresh ranking, so a shrinking
//! corpus can never leave stale entries behind.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `wordcloud_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WordcloudRow {
    pub id: i64,
    pub scope: String,
    pub topic_id: Option<String>,
    pub lang: String,
    pub is_overall: bool,
    /// Ranked `[{"word": ..., "count": ...}]` entries.
    pub entries: Value,
    pub computed_at: DateTime<Utc>,
}

/// Overwrite the snapshot for one (scope, topic, lang).
///
/// `topic_id = None` addresses the cross-topic aggregate cloud for the
/// scope; `is_overall` is stored accordingly.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete or insert fails; the transaction
/// is rolled back and the previous snapshot survives.
pub async fn replace_wordcloud(
    pool: &PgPool,
    scope: &str,
    topic_id: Option<&str>,
    lang: &str,
    entries: &Value,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM wordcloud_snapshots \
         WHERE scope = $1 AND topic_id IS NOT DISTINCT FROM $2 AND lang = $3",
    )
    .bind(scope)
    .bind(topic_id)
    .bind(lang)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO wordcloud_snapshots (scope, topic_id, lang, is_overall, entries) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(scope)
    .bind(topic_id)
    .bind(lang)
    .bind(topic_id.is_none())
    .bind(entries)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Returns the snapshots for a scope, optionally narrowed to one topic.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_wordclouds(
    pool: &PgPool,
    scope: &str,
    topic_id: Option<&str>,
) -> Result<Vec<WordcloudRow>, DbError> {
    let rows = match topic_id {
        Some(topic) => {
            sqlx::query_as::<_, WordcloudRow>(
                "SELECT id, scope, topic_id, lang, is_overall, entries, computed_at \
                 FROM wordcloud_snapshots \
                 WHERE scope = $1 AND topic_id = $2 \
                 ORDER BY lang",
            )
            .bind(scope)
            .bind(topic)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, WordcloudRow>(
                "SELECT id, scope, topic_id, lang, is_overall, entries, computed_at \
                 FROM wordcloud_snapshots \
                 WHERE scope = $1 \
                 ORDER BY topic_id NULLS FIRST, lang",
            )
            .bind(scope)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}
