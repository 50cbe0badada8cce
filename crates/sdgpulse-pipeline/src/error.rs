use thiserror::Error;

/// Errors that escape a pipeline stage.
///
/// Per-subscription collection failures are recovered inside the collector
/// and recorded on the run; they never surface here. What does surface is
/// fatal: missing or rejected search credentials, or a storage failure
/// outside the per-subscription recovery path.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("SDGPULSE_SEARCH_TOKEN is not configured")]
    MissingBearerToken,

    #[error("search API error: {0}")]
    Search(#[from] sdgpulse_search::SearchError),

    #[error("database error: {0}")]
    Db(#[from] sdgpulse_db::DbError),
}
