//! `seed` command handler.

/// Load the reference YAML files and sync the subscription universe.
///
/// Reseeding is safe to repeat: existing subscriptions keep their cursors,
/// and pairs no longer produced by the reference data are deactivated.
///
/// # Errors
///
/// Returns an error if a reference file is missing or invalid, or if the
/// seed transaction fails.
pub(crate) async fn run_seed(
    pool: &sqlx::PgPool,
    config: &sdgpulse_core::AppConfig,
) -> anyhow::Result<()> {
    let reference = crate::pipeline::load_reference(config)?;
    let active = sdgpulse_db::seed_reference(pool, &reference).await?;
    println!(
        "seeded {} countries and {} topics; {active} active subscriptions",
        reference.countries.len(),
        reference.topics.len(),
    );
    Ok(())
}
