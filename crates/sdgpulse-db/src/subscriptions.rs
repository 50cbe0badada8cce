//! Database operations for the `subscriptions` table.

use sqlx::PgPool;

use crate::DbError;

/// A subscription joined with the query parts it is collected under.
///
/// `topic_query` / `country_query` are already resolved for the
/// subscription's language.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub id: i64,
    pub country_code: String,
    pub topic_id: String,
    pub lang: String,
    pub since_id: i64,
    pub is_sdg: bool,
    pub topic_query: String,
    pub country_query: String,
}

const SUBSCRIPTION_SELECT: &str = "SELECT s.id, s.country_code, s.topic_id, s.lang, s.since_id, \
            t.is_sdg, \
            CASE s.lang WHEN 'ar' THEN t.query_ar ELSE t.query_en END AS topic_query, \
            CASE s.lang WHEN 'ar' THEN c.query_ar ELSE c.query_en END AS country_query \
     FROM subscriptions s \
     JOIN countries c ON c.code = s.country_code \
     JOIN topics t ON t.id = s.topic_id";

/// Returns every active subscription in id order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_subscriptions(pool: &PgPool) -> Result<Vec<SubscriptionRow>, DbError> {
    let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
        "{SUBSCRIPTION_SELECT} WHERE s.is_active ORDER BY s.id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single subscription by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_subscription(pool: &PgPool, id: i64) -> Result<SubscriptionRow, DbError> {
    let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
        "{SUBSCRIPTION_SELECT} WHERE s.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}
