//! `stats` and `wordcloud` command handlers.
//!
//! Both recompute snapshots from posts already in the database; neither
//! talks to the search API. Useful after a lexicon change or a manual
//! backfill, when the stored snapshots no longer reflect the corpus.

use sdgpulse_lexicon::StopwordTokenizer;

/// Recompute the per-scope statistics and keyword snapshots, then print a
/// summary table of the resulting statistics rows.
///
/// # Errors
///
/// Returns an error if the reference files cannot be loaded or a snapshot
/// write fails.
pub(crate) async fn run_stats(
    pool: &sqlx::PgPool,
    config: &sdgpulse_core::AppConfig,
) -> anyhow::Result<()> {
    let reference = crate::pipeline::load_reference(config)?;
    let scopes =
        sdgpulse_pipeline::aggregate::write_statistics(pool, &reference, &config.region_code)
            .await?;
    let keyword_scopes =
        sdgpulse_pipeline::keywords::write_keyword_stats(pool, &reference, &config.region_code)
            .await?;
    println!("recomputed {scopes} statistics scopes and {keyword_scopes} keyword scopes");

    let rows = sdgpulse_db::list_statistics(pool).await?;
    if !rows.is_empty() {
        println!();
        println!("| Scope | Total | SDG | Top topic | Quietest topic |");
        println!("|-------|-------|-----|-----------|----------------|");
        for row in &rows {
            println!(
                "| {} | {} | {} | {} | {} |",
                row.scope,
                row.total,
                row.sdg_total,
                format_topic(row.max_topic.as_deref(), row.max_count),
                format_topic(row.min_topic.as_deref(), row.min_count),
            );
        }
    }

    match sdgpulse_db::get_keyword_stats(pool, &config.region_code).await {
        Ok(row) => print_keyword_summary(&row),
        Err(sdgpulse_db::DbError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Recompute every word cloud snapshot and print the region-level top words.
///
/// # Errors
///
/// Returns an error if the reference files cannot be loaded or a snapshot
/// write fails.
pub(crate) async fn run_wordclouds(
    pool: &sqlx::PgPool,
    config: &sdgpulse_core::AppConfig,
) -> anyhow::Result<()> {
    let reference = crate::pipeline::load_reference(config)?;
    let subscriptions = sdgpulse_db::list_active_subscriptions(pool).await?;
    let snapshots = sdgpulse_pipeline::wordcloud::write_wordclouds(
        pool,
        &StopwordTokenizer,
        &reference,
        &subscriptions,
        &config.region_code,
        config.wordcloud_top_n,
    )
    .await?;
    println!("recomputed {snapshots} word cloud snapshots");

    // The region scope holds only the two cross-topic aggregate clouds.
    let overall = sdgpulse_db::list_wordclouds(pool, &config.region_code, None).await?;
    for cloud in &overall {
        let words: Vec<&str> = cloud
            .entries
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .take(5)
                    .filter_map(|e| e.get("word").and_then(serde_json::Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        println!("  {} {}: [{}]", cloud.scope, cloud.lang, words.join(", "));
    }
    Ok(())
}

fn format_topic(topic: Option<&str>, count: Option<i64>) -> String {
    topic.map_or_else(
        || "\u{2014}".to_string(),
        |t| format!("{t} ({})", count.unwrap_or(0)),
    )
}

fn print_keyword_summary(row: &sdgpulse_db::KeywordStatsRow) {
    let total = row
        .stats
        .get("total")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);
    let matches = row
        .stats
        .get("sdg_total")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);
    let top = row
        .stats
        .get("max")
        .and_then(|m| m.get("keyword"))
        .and_then(serde_json::Value::as_str);
    match top {
        Some(keyword) => println!(
            "keywords ({}): {total} posts scanned, {matches} matches, top keyword \"{keyword}\"",
            row.scope,
        ),
        None => println!(
            "keywords ({}): {total} posts scanned, {matches} matches",
            row.scope,
        ),
    }
}
