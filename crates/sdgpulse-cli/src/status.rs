//! `status` command handler.
//!
//! Read-only views over the run ledger, printed as markdown-style tables
//! so they paste cleanly into an incident note.

use chrono::{DateTime, Utc};

/// Show recent runs, or one run's per-subscription results with `--run`.
///
/// # Errors
///
/// Returns an error if the run does not exist or the queries fail.
pub(crate) async fn run_status(
    pool: &sqlx::PgPool,
    run: Option<i64>,
    limit: i64,
) -> anyhow::Result<()> {
    if let Some(run_id) = run {
        return show_run(pool, run_id).await;
    }

    let runs = sdgpulse_db::list_pipeline_runs(pool, limit.max(1)).await?;
    if runs.is_empty() {
        println!("no pipeline runs recorded yet");
        return Ok(());
    }

    println!("| Run | Status | Trigger | Started | Took | Posts | Error |");
    println!("|-----|--------|---------|---------|------|-------|-------|");
    for r in &runs {
        println!(
            "| {} | {} | {} | {} | {} | {} | {} |",
            r.id,
            r.status,
            r.trigger_source,
            format_time(r.started_at),
            format_duration(r.started_at, r.completed_at),
            r.posts_collected,
            r.error_message.as_deref().unwrap_or("\u{2014}"),
        );
    }
    Ok(())
}

async fn show_run(pool: &sqlx::PgPool, run_id: i64) -> anyhow::Result<()> {
    let run = sdgpulse_db::get_pipeline_run(pool, run_id).await?;
    println!(
        "run {} ({}) is {}, started {}, {} posts collected",
        run.id,
        run.public_id,
        run.status,
        format_time(run.started_at),
        run.posts_collected
    );
    if let Some(message) = &run.error_message {
        println!("error: {message}");
    }

    let rows = sdgpulse_db::list_pipeline_run_subscriptions(pool, run_id).await?;
    if rows.is_empty() {
        println!("no subscription results recorded for this run");
        return Ok(());
    }

    println!();
    println!("| Subscription | Status | New | Skipped | Error |");
    println!("|--------------|--------|-----|---------|-------|");
    for row in &rows {
        println!(
            "| {} | {} | {} | {} | {} |",
            row.subscription_id,
            row.status,
            row.new_posts,
            row.skipped_posts,
            row.error_message.as_deref().unwrap_or("\u{2014}"),
        );
    }
    Ok(())
}

fn format_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

fn format_duration(started: Option<DateTime<Utc>>, completed: Option<DateTime<Utc>>) -> String {
    match (started, completed) {
        (Some(s), Some(c)) => format!("{}s", (c - s).num_seconds()),
        _ => "\u{2014}".to_string(),
    }
}
