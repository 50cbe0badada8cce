//! Run orchestration.
//!
//! A run walks the ledger lifecycle (`queued` to `running` to `succeeded` or
//! `failed`) around the stage sequence:
//!
//! 1. Probe the search credentials; a rejection fails the run before any
//!    subscription is touched.
//! 2. Collect every active subscription concurrently. A subscription failure
//!    is recorded on the run and never stops the others.
//! 3. Label the posts collected by the subscriptions that succeeded.
//! 4. Fold the labeled posts into the weekly counts.
//! 5. Recompute the statistics, word-cloud, and keyword snapshots from the
//!    full corpus.
//!
//! Snapshots recompute from scratch every run, so a run that collected
//! nothing still leaves them consistent.

use futures::{stream, StreamExt};
use sdgpulse_core::{AppConfig, ReferenceData};
use sdgpulse_db::SubscriptionRow;
use sdgpulse_lexicon::{LexiconModel, StopwordTokenizer};
use sdgpulse_search::SearchClient;
use sqlx::PgPool;

use crate::report::{RunReport, SubscriptionOutcome};
use crate::{aggregate, classify, collector, keywords, wordcloud, PipelineError};

/// Execute one full pipeline run.
///
/// # Errors
///
/// Returns the fatal error that aborted the run: missing or rejected search
/// credentials, or a storage failure outside the per-subscription recovery
/// path. The run row is marked `failed` before the error is returned.
pub async fn run(
    pool: &PgPool,
    config: &AppConfig,
    reference: &ReferenceData,
    trigger_source: &str,
) -> Result<RunReport, PipelineError> {
    run_pipeline(pool, config, reference, trigger_source, true).await
}

/// Execute a collection-only run: collect, label, and fold weekly counts,
/// leaving the derived snapshots untouched.
///
/// # Errors
///
/// Same failure modes as [`run`].
pub async fn run_collection(
    pool: &PgPool,
    config: &AppConfig,
    reference: &ReferenceData,
    trigger_source: &str,
) -> Result<RunReport, PipelineError> {
    run_pipeline(pool, config, reference, trigger_source, false).await
}

async fn run_pipeline(
    pool: &PgPool,
    config: &AppConfig,
    reference: &ReferenceData,
    trigger_source: &str,
    recompute_snapshots: bool,
) -> Result<RunReport, PipelineError> {
    let client = build_search_client(config)?;
    let subscriptions = sdgpulse_db::list_active_subscriptions(pool).await?;

    let run = sdgpulse_db::create_pipeline_run(pool, trigger_source).await?;
    tracing::info!(
        run_id = run.id,
        public_id = %run.public_id,
        subscriptions = subscriptions.len(),
        trigger_source,
        "pipeline run created"
    );

    if let Err(err) = sdgpulse_db::start_pipeline_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "failed to start run").await;
        return Err(err.into());
    }

    let totals = match run_stages(
        pool,
        &client,
        config,
        reference,
        run.id,
        &subscriptions,
        recompute_snapshots,
    )
    .await
    {
        Ok(totals) => totals,
        Err(err) => {
            tracing::error!(run_id = run.id, error = %err, "pipeline run failed");
            fail_run_best_effort(pool, run.id, &err.to_string()).await;
            return Err(err);
        }
    };

    if let Err(err) = sdgpulse_db::complete_pipeline_run(pool, run.id, totals.posts_collected).await
    {
        fail_run_best_effort(pool, run.id, "failed to record completion").await;
        return Err(err.into());
    }

    let subscriptions_failed = totals.outcomes.iter().filter(|o| !o.succeeded).count();
    tracing::info!(
        run_id = run.id,
        posts_collected = totals.posts_collected,
        posts_labeled = totals.posts_labeled,
        subscriptions_failed,
        "pipeline run succeeded"
    );

    Ok(RunReport {
        run_id: run.id,
        public_id: run.public_id,
        subscriptions_attempted: totals.outcomes.len(),
        subscriptions_failed,
        posts_collected: totals.posts_collected,
        posts_labeled: totals.posts_labeled,
        statistics_scopes: totals.statistics_scopes,
        wordcloud_snapshots: totals.wordcloud_snapshots,
        keyword_scopes: totals.keyword_scopes,
        outcomes: totals.outcomes,
    })
}

struct StageTotals {
    outcomes: Vec<SubscriptionOutcome>,
    posts_collected: i32,
    posts_labeled: u64,
    statistics_scopes: usize,
    wordcloud_snapshots: usize,
    keyword_scopes: usize,
}

async fn run_stages(
    pool: &PgPool,
    client: &SearchClient,
    config: &AppConfig,
    reference: &ReferenceData,
    run_id: i64,
    subscriptions: &[SubscriptionRow],
    recompute_snapshots: bool,
) -> Result<StageTotals, PipelineError> {
    if let Err(err) = client.verify_credentials().await {
        tracing::error!(error = %err, "search credential probe failed");
        return Err(err.into());
    }

    let results: Vec<(&SubscriptionRow, Result<SubscriptionOutcome, PipelineError>)> =
        stream::iter(subscriptions)
            .map(|sub| async move {
                let outcome = collector::collect_subscription(pool, client, config, run_id, sub).await;
                (sub, outcome)
            })
            .buffer_unordered(config.collect_max_concurrent.max(1))
            .collect()
            .await;

    let mut outcomes = Vec::with_capacity(results.len());
    let mut posts_collected: i32 = 0;
    for (sub, result) in results {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    subscription_id = sub.id,
                    country = %sub.country_code,
                    topic = %sub.topic_id,
                    lang = %sub.lang,
                    error = %err,
                    "subscription collection failed"
                );
                SubscriptionOutcome {
                    subscription_id: sub.id,
                    country_code: sub.country_code.clone(),
                    topic_id: sub.topic_id.clone(),
                    lang: sub.lang.clone(),
                    new_posts: 0,
                    skipped_posts: 0,
                    succeeded: false,
                    error: Some(err.to_string()),
                }
            }
        };
        posts_collected = posts_collected.saturating_add(outcome.new_posts);
        outcomes.push(outcome);
    }

    let failed = outcomes.iter().filter(|o| !o.succeeded).count();
    if failed > 0 {
        tracing::warn!(
            failed,
            total = outcomes.len(),
            "some subscriptions failed to collect"
        );
    }
    tracing::info!(
        run_id,
        posts_collected,
        subscriptions = outcomes.len(),
        "collection stage finished"
    );

    let succeeded_ids: Vec<i64> = outcomes
        .iter()
        .filter(|o| o.succeeded)
        .map(|o| o.subscription_id)
        .collect();
    let labeled = classify::classify_new_posts(pool, &LexiconModel, &succeeded_ids).await?;
    let posts_labeled = u64::try_from(labeled.len()).unwrap_or(u64::MAX);

    let buckets = aggregate::fold_weekly_counts(pool, &labeled).await?;
    tracing::info!(run_id, posts_labeled, buckets, "aggregation stage finished");

    let (statistics_scopes, wordcloud_snapshots, keyword_scopes) = if recompute_snapshots {
        let statistics_scopes =
            aggregate::write_statistics(pool, reference, &config.region_code).await?;
        let wordcloud_snapshots = wordcloud::write_wordclouds(
            pool,
            &StopwordTokenizer,
            reference,
            subscriptions,
            &config.region_code,
            config.wordcloud_top_n,
        )
        .await?;
        let keyword_scopes = keywords::write_keyword_stats(pool, reference, &config.region_code).await?;
        tracing::info!(
            run_id,
            statistics_scopes,
            wordcloud_snapshots,
            keyword_scopes,
            "snapshot stage finished"
        );
        (statistics_scopes, wordcloud_snapshots, keyword_scopes)
    } else {
        (0, 0, 0)
    };

    Ok(StageTotals {
        outcomes,
        posts_collected,
        posts_labeled,
        statistics_scopes,
        wordcloud_snapshots,
        keyword_scopes,
    })
}

fn build_search_client(config: &AppConfig) -> Result<SearchClient, PipelineError> {
    let Some(token) = config.search_bearer_token.as_deref() else {
        return Err(PipelineError::MissingBearerToken);
    };

    let client = match config.search_base_url.as_deref() {
        Some(base_url) => SearchClient::with_base_url(
            Some(token),
            config.search_request_timeout_secs,
            &config.search_user_agent,
            config.search_min_request_interval_ms,
            config.search_max_retries,
            config.search_retry_backoff_base_secs,
            base_url,
        )?,
        None => SearchClient::new(
            Some(token),
            config.search_request_timeout_secs,
            &config.search_user_agent,
            config.search_min_request_interval_ms,
            config.search_max_retries,
            config.search_retry_backoff_base_secs,
        )?,
    };

    Ok(client)
}

/// Marks the run `failed`, logging instead of propagating when even that
/// write fails.
async fn fail_run_best_effort(pool: &PgPool, run_id: i64, message: &str) {
    if let Err(mark_err) = sdgpulse_db::fail_pipeline_run(pool, run_id, message).await {
        tracing::error!(run_id, error = %mark_err, "failed to mark run as failed");
    }
}
