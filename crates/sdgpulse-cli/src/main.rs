mod pipeline;
mod seed;
mod snapshots;
mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sdgpulse-cli")]
#[command(about = "SDG Pulse social listening pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute a full pipeline run: collect, label, aggregate, snapshot
    Run,
    /// Collect and label new posts without recomputing snapshots
    Collect,
    /// Sync subscriptions from the reference YAML files
    Seed,
    /// Recompute statistics and keyword snapshots from stored posts
    Stats,
    /// Recompute word cloud snapshots from stored posts
    Wordcloud,
    /// Show recent pipeline runs and their outcomes
    Status {
        /// Inspect one run's per-subscription results
        #[arg(long)]
        run: Option<i64>,

        /// Number of recent runs to list
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; see `sdgpulse-cli --help`");
        return Ok(());
    };

    let config = sdgpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = sdgpulse_db::PoolConfig::from_app_config(&config);
    let pool = sdgpulse_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = sdgpulse_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending database migrations");
    }

    match command {
        Commands::Run => pipeline::run_full(&pool, &config).await,
        Commands::Collect => pipeline::run_collection(&pool, &config).await,
        Commands::Seed => seed::run_seed(&pool, &config).await,
        Commands::Stats => snapshots::run_stats(&pool, &config).await,
        Commands::Wordcloud => snapshots::run_wordclouds(&pool, &config).await,
        Commands::Status { run, limit } => status::run_status(&pool, run, limit).await,
    }
}
