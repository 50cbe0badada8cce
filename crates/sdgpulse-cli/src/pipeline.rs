//! `run` and `collect` command handlers.
//!
//! Both delegate to `sdgpulse-pipeline` and print the resulting run report.
//! Per-subscription failures are part of a normal report and do not affect
//! the exit status; only fatal errors (rejected credentials, a storage
//! failure outside the per-subscription recovery path) propagate.

use sdgpulse_pipeline::RunReport;

/// Execute a full pipeline run and print the report.
///
/// # Errors
///
/// Returns an error if the reference files cannot be loaded or the run
/// fails fatally before or between stages.
pub(crate) async fn run_full(
    pool: &sqlx::PgPool,
    config: &sdgpulse_core::AppConfig,
) -> anyhow::Result<()> {
    let reference = load_reference(config)?;
    let report = sdgpulse_pipeline::run(pool, config, &reference, "cli").await?;
    print_report(&report);
    Ok(())
}

/// Collect and label new posts without recomputing snapshots.
///
/// # Errors
///
/// Same failure modes as [`run_full`]; snapshot stages are skipped, not
/// exempted.
pub(crate) async fn run_collection(
    pool: &sqlx::PgPool,
    config: &sdgpulse_core::AppConfig,
) -> anyhow::Result<()> {
    let reference = load_reference(config)?;
    let report = sdgpulse_pipeline::run_collection(pool, config, &reference, "cli").await?;
    print_report(&report);
    Ok(())
}

/// Load and validate the reference YAML files named in the config.
pub(crate) fn load_reference(
    config: &sdgpulse_core::AppConfig,
) -> anyhow::Result<sdgpulse_core::ReferenceData> {
    Ok(sdgpulse_core::ReferenceData::load(
        &config.countries_path,
        &config.topics_path,
    )?)
}

fn print_report(report: &RunReport) {
    println!(
        "run {} ({}): collected {} posts across {} subscriptions, labeled {}",
        report.run_id,
        report.public_id,
        report.posts_collected,
        report.subscriptions_attempted,
        report.posts_labeled
    );
    for outcome in report.failed_outcomes() {
        println!(
            "  failed {}/{}/{}: {}",
            outcome.country_code,
            outcome.topic_id,
            outcome.lang,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    if report.statistics_scopes > 0 || report.wordcloud_snapshots > 0 || report.keyword_scopes > 0 {
        println!(
            "snapshots: {} statistics scopes, {} word clouds, {} keyword scopes",
            report.statistics_scopes, report.wordcloud_snapshots, report.keyword_scopes
        );
    }
}
