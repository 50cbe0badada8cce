//! Per-subscription collection: paged fetch, validation, deduplicated
//! persistence, cursor advance.
//!
//! Each page is committed together with its cursor advance in one
//! transaction, so a failure on a later page leaves the cursor at the last
//! committed page and never past unpersisted data.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sdgpulse_core::{compose_scope_query, AppConfig};
use sdgpulse_db::{DbError, NewPost, SubscriptionRow};
use sdgpulse_search::{RawPost, SearchClient};
use sqlx::PgPool;

use crate::report::SubscriptionOutcome;
use crate::PipelineError;

const WRITE_RETRY_DELAY_MS: u64 = 250;

/// One page's worth of validated posts plus bookkeeping.
struct ValidatedPage {
    posts: Vec<NewPost>,
    /// Posts dropped by validation.
    skipped: i32,
    /// Highest post id observed on the page, including dropped posts.
    max_seen_id: i64,
}

/// Collect all pages for one subscription and record its outcome on the run.
///
/// Fetch and persistence failures are recovered here: the subscription is
/// marked failed on the run with whatever counts it committed, and the run
/// continues with the others. Only a failure to record the outcome row
/// itself propagates.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if the outcome row cannot be written.
pub(crate) async fn collect_subscription(
    pool: &PgPool,
    client: &SearchClient,
    config: &AppConfig,
    run_id: i64,
    sub: &SubscriptionRow,
) -> Result<SubscriptionOutcome, PipelineError> {
    let query = compose_scope_query(&sub.topic_query, &sub.country_query, &sub.lang);

    let mut new_posts: i32 = 0;
    let mut skipped_posts: i32 = 0;
    let mut next_token: Option<String> = None;
    let mut failure: Option<String> = None;

    for page_no in 1..=config.collect_max_pages.max(1) {
        // The cursor bounds only the first request; subsequent pages follow
        // the pagination token, which already encodes the window.
        let since_id = (page_no == 1 && sub.since_id > 0).then_some(sub.since_id);

        let page = match client
            .fetch_page(
                &query,
                config.collect_page_size,
                since_id,
                next_token.as_deref(),
            )
            .await
        {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(
                    subscription_id = sub.id,
                    country = %sub.country_code,
                    topic = %sub.topic_id,
                    page = page_no,
                    error = %err,
                    "page fetch failed after retries"
                );
                failure = Some(format!("page {page_no} fetch failed: {err}"));
                break;
            }
        };

        if page.posts.is_empty() {
            break;
        }

        let validated = validate_page(&page.posts, &sub.lang);
        skipped_posts = skipped_posts.saturating_add(validated.skipped);

        let inserted = match persist_page_with_retries(
            pool,
            sub.id,
            &validated.posts,
            validated.max_seen_id,
            config.collect_write_retries,
        )
        .await
        {
            Ok(inserted) => inserted,
            Err(err) => {
                tracing::error!(
                    subscription_id = sub.id,
                    country = %sub.country_code,
                    topic = %sub.topic_id,
                    page = page_no,
                    error = %err,
                    "page write failed after retries"
                );
                failure = Some(format!("page {page_no} write failed: {err}"));
                break;
            }
        };

        let inserted = i32::try_from(inserted).unwrap_or(i32::MAX);
        let duplicates =
            i32::try_from(validated.posts.len()).unwrap_or(i32::MAX) - inserted;
        new_posts = new_posts.saturating_add(inserted);
        skipped_posts = skipped_posts.saturating_add(duplicates);

        if inserted == 0 {
            // Everything on this page was already stored; deeper pages are
            // older still.
            break;
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    let succeeded = failure.is_none();
    let status = if succeeded { "succeeded" } else { "failed" };

    sdgpulse_db::upsert_run_subscription(
        pool,
        run_id,
        sub.id,
        status,
        new_posts,
        skipped_posts,
        failure.as_deref(),
    )
    .await?;

    tracing::debug!(
        subscription_id = sub.id,
        country = %sub.country_code,
        topic = %sub.topic_id,
        lang = %sub.lang,
        new_posts,
        skipped_posts,
        succeeded,
        "subscription collection finished"
    );

    Ok(SubscriptionOutcome {
        subscription_id: sub.id,
        country_code: sub.country_code.clone(),
        topic_id: sub.topic_id.clone(),
        lang: sub.lang.clone(),
        new_posts,
        skipped_posts,
        succeeded,
        error: failure,
    })
}

/// Validate a raw page into insertable posts.
///
/// A post with a non-numeric id, empty text, or an unparseable timestamp is
/// dropped and counted as skipped. Dropped posts still contribute to
/// `max_seen_id` when their id parses, so the cursor moves past them.
fn validate_page(raw: &[RawPost], fallback_lang: &str) -> ValidatedPage {
    let mut posts = Vec::with_capacity(raw.len());
    let mut skipped: i32 = 0;
    let mut max_seen_id: i64 = 0;

    for post in raw {
        let Ok(post_id) = post.id.parse::<i64>() else {
            tracing::debug!(id = %post.id, "dropping post with non-numeric id");
            skipped = skipped.saturating_add(1);
            continue;
        };
        max_seen_id = max_seen_id.max(post_id);

        let text = post.text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            tracing::debug!(post_id, "dropping post with empty text");
            skipped = skipped.saturating_add(1);
            continue;
        }

        let Some(created_at) = post.created_at.as_deref().and_then(parse_timestamp) else {
            tracing::debug!(post_id, "dropping post with missing or invalid timestamp");
            skipped = skipped.saturating_add(1);
            continue;
        };

        posts.push(NewPost {
            post_id,
            text: text.to_string(),
            lang: post
                .lang
                .clone()
                .unwrap_or_else(|| fallback_lang.to_string()),
            created_at,
        });
    }

    ValidatedPage {
        posts,
        skipped,
        max_seen_id,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Commit one page with bounded retries on write failure.
async fn persist_page_with_retries(
    pool: &PgPool,
    subscription_id: i64,
    posts: &[NewPost],
    max_seen_id: i64,
    write_retries: u32,
) -> Result<u64, DbError> {
    let mut attempt: u32 = 0;
    loop {
        match sdgpulse_db::insert_posts_page(pool, subscription_id, posts, max_seen_id).await {
            Ok(inserted) => return Ok(inserted),
            Err(err) if attempt < write_retries => {
                attempt += 1;
                tracing::warn!(
                    subscription_id,
                    attempt,
                    error = %err,
                    "page write failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(
                    WRITE_RETRY_DELAY_MS * u64::from(attempt),
                ))
                .await;
            }
            Err(err) => return Err(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
