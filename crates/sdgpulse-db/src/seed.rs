use sdgpulse_core::ReferenceData;
use sqlx::PgPool;

use crate::DbError;

/// Upsert the reference data (countries, topics) and create the subscription
/// cross-product.
///
/// Existing subscriptions keep their cursor: the upsert touches only the
/// reference columns, never `since_id`. Combinations that disappeared from
/// the config are deactivated rather than deleted, so their history stays
/// queryable. All statements run inside a single transaction; if any
/// operation fails the entire batch is rolled back.
///
/// Returns the number of active subscriptions after seeding.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_reference(pool: &PgPool, reference: &ReferenceData) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    for country in &reference.countries {
        sqlx::query(
            "INSERT INTO countries (code, name_en, name_ar, query_en, query_ar) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (code) DO UPDATE SET \
                 name_en = EXCLUDED.name_en, \
                 name_ar = EXCLUDED.name_ar, \
                 query_en = EXCLUDED.query_en, \
                 query_ar = EXCLUDED.query_ar, \
                 updated_at = NOW()",
        )
        .bind(&country.code)
        .bind(&country.name_en)
        .bind(&country.name_ar)
        .bind(&country.query_en)
        .bind(&country.query_ar)
        .execute(&mut *tx)
        .await?;
    }

    for topic in &reference.topics {
        sqlx::query(
            "INSERT INTO topics (id, name, query_en, query_ar, is_sdg) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 query_en = EXCLUDED.query_en, \
                 query_ar = EXCLUDED.query_ar, \
                 is_sdg = EXCLUDED.is_sdg, \
                 updated_at = NOW()",
        )
        .bind(&topic.id)
        .bind(&topic.name)
        .bind(&topic.query_en)
        .bind(&topic.query_ar)
        .bind(topic.is_sdg)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("UPDATE subscriptions SET is_active = FALSE, updated_at = NOW()")
        .execute(&mut *tx)
        .await?;

    let mut active = 0usize;
    for (country, topic, lang) in reference.subscription_universe() {
        sqlx::query(
            "INSERT INTO subscriptions (country_code, topic_id, lang, is_active) \
             VALUES ($1, $2, $3, TRUE) \
             ON CONFLICT (country_code, topic_id, lang) DO UPDATE SET \
                 is_active = TRUE, \
                 updated_at = NOW()",
        )
        .bind(&country.code)
        .bind(&topic.id)
        .bind(lang.as_str())
        .execute(&mut *tx)
        .await?;
        active += 1;
    }

    tx.commit().await?;
    Ok(active)
}
