//! Database operations for the `posts` table.

use chrono::{DateTime, Utc};
use sdgpulse_core::Sentiment;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A validated post ready for insertion.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_id: i64,
    pub text: String,
    pub lang: String,
    pub created_at: DateTime<Utc>,
}

/// A stored post that has not been labeled yet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnlabeledPostRow {
    pub post_id: i64,
    pub subscription_id: i64,
    pub text: String,
    pub lang: String,
    pub created_at: DateTime<Utc>,
}

/// Classified post count for one (topic, sentiment) pair within a scope.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SentimentTallyRow {
    pub topic_id: String,
    pub is_sdg: bool,
    pub sentiment: String,
    pub posts: i64,
}

/// A post's text and its sentiment label, if classified.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoredTextRow {
    pub text: String,
    pub sentiment: Option<String>,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Persist one fetched page: insert the posts and advance the cursor, in a
/// single transaction.
///
/// Posts already present (by `post_id`) are skipped. The cursor is advanced
/// with `GREATEST`, so it never moves backwards; committing it together with
/// the posts means it can never point past data that failed to persist.
///
/// Returns the number of posts actually inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the transaction is
/// rolled back and the cursor keeps its previous value.
pub async fn insert_posts_page(
    pool: &PgPool,
    subscription_id: i64,
    posts: &[NewPost],
    max_seen_id: i64,
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for post in posts {
        let result = sqlx::query(
            "INSERT INTO posts (post_id, subscription_id, text, lang, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (post_id) DO NOTHING",
        )
        .bind(post.post_id)
        .bind(subscription_id)
        .bind(&post.text)
        .bind(&post.lang)
        .bind(post.created_at)
        .execute(&mut *tx)
        .await?;

        inserted += result.rows_affected();
    }

    sqlx::query(
        "UPDATE subscriptions \
         SET since_id = GREATEST(since_id, $2), updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(subscription_id)
    .bind(max_seen_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(inserted)
}

/// Apply sentiment labels to posts, in one transaction.
///
/// Returns the number of rows updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any update fails.
pub async fn set_sentiment_labels(
    pool: &PgPool,
    labels: &[(i64, Sentiment)],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut updated = 0u64;

    for (post_id, sentiment) in labels {
        let result = sqlx::query("UPDATE posts SET sentiment = $2 WHERE post_id = $1")
            .bind(post_id)
            .bind(sentiment.as_str())
            .execute(&mut *tx)
            .await?;
        updated += result.rows_affected();
    }

    tx.commit().await?;
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns all unlabeled posts belonging to the given subscriptions, in
/// `post_id` order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unlabeled_posts(
    pool: &PgPool,
    subscription_ids: &[i64],
) -> Result<Vec<UnlabeledPostRow>, DbError> {
    let rows = sqlx::query_as::<_, UnlabeledPostRow>(
        "SELECT post_id, subscription_id, text, lang, created_at \
         FROM posts \
         WHERE sentiment IS NULL AND subscription_id = ANY($1) \
         ORDER BY post_id",
    )
    .bind(subscription_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Classified post counts grouped by (topic, sentiment) for one country, or
/// across all countries when `country_code` is `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn topic_sentiment_tallies(
    pool: &PgPool,
    country_code: Option<&str>,
) -> Result<Vec<SentimentTallyRow>, DbError> {
    let rows = match country_code {
        Some(code) => {
            sqlx::query_as::<_, SentimentTallyRow>(
                "SELECT s.topic_id, t.is_sdg, p.sentiment, COUNT(*) AS posts \
                 FROM posts p \
                 JOIN subscriptions s ON s.id = p.subscription_id \
                 JOIN topics t ON t.id = s.topic_id \
                 WHERE p.sentiment IS NOT NULL AND s.country_code = $1 \
                 GROUP BY s.topic_id, t.is_sdg, p.sentiment",
            )
            .bind(code)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SentimentTallyRow>(
                "SELECT s.topic_id, t.is_sdg, p.sentiment, COUNT(*) AS posts \
                 FROM posts p \
                 JOIN subscriptions s ON s.id = p.subscription_id \
                 JOIN topics t ON t.id = s.topic_id \
                 WHERE p.sentiment IS NOT NULL \
                 GROUP BY s.topic_id, t.is_sdg, p.sentiment",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

/// Returns the text of every post in one subscription.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_texts_for_subscription(
    pool: &PgPool,
    subscription_id: i64,
) -> Result<Vec<String>, DbError> {
    let texts = sqlx::query_scalar::<_, String>(
        "SELECT text FROM posts WHERE subscription_id = $1 ORDER BY post_id",
    )
    .bind(subscription_id)
    .fetch_all(pool)
    .await?;

    Ok(texts)
}

/// Returns the text of every post collected in the given language, across
/// all countries and topics.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_texts_for_lang(pool: &PgPool, lang: &str) -> Result<Vec<String>, DbError> {
    let texts = sqlx::query_scalar::<_, String>(
        "SELECT p.text \
         FROM posts p \
         JOIN subscriptions s ON s.id = p.subscription_id \
         WHERE s.lang = $1 \
         ORDER BY p.post_id",
    )
    .bind(lang)
    .fetch_all(pool)
    .await?;

    Ok(texts)
}

/// Returns text and sentiment for every post in one country, or for all
/// posts when `country_code` is `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scored_texts(
    pool: &PgPool,
    country_code: Option<&str>,
) -> Result<Vec<ScoredTextRow>, DbError> {
    let rows = match country_code {
        Some(code) => {
            sqlx::query_as::<_, ScoredTextRow>(
                "SELECT p.text, p.sentiment \
                 FROM posts p \
                 JOIN subscriptions s ON s.id = p.subscription_id \
                 WHERE s.country_code = $1 \
                 ORDER BY p.post_id",
            )
            .bind(code)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ScoredTextRow>("SELECT text, sentiment FROM posts ORDER BY post_id")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}

/// Total number of stored posts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_posts(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
