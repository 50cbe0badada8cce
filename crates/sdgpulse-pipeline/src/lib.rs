//! The SDG listening pipeline.
//!
//! Turns active subscriptions into stored, labeled posts and derived
//! snapshots. [`runner::run`] drives one full run: credential probe,
//! concurrent per-subscription collection behind monotonic `since_id`
//! cursors, lexicon sentiment labeling, weekly-count folding, and full
//! recomputation of the statistics, word-cloud, and keyword snapshots.
//! Every run is recorded in the `pipeline_runs` ledger with one result row
//! per subscription.

pub mod aggregate;
pub mod classify;
mod collector;
pub mod error;
pub mod keywords;
pub mod report;
pub mod runner;
pub mod wordcloud;

pub use error::PipelineError;
pub use report::{RunReport, SubscriptionOutcome};
pub use runner::{run, run_collection};
