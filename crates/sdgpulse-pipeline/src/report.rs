//! Run report types returned by the orchestrator.

use uuid::Uuid;

/// Outcome of collecting one subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionOutcome {
    pub subscription_id: i64,
    pub country_code: String,
    pub topic_id: String,
    pub lang: String,
    /// Posts actually inserted this run.
    pub new_posts: i32,
    /// Duplicates plus posts dropped by validation.
    pub skipped_posts: i32,
    pub succeeded: bool,
    /// Failure reason when `succeeded` is false. Partial counts above are
    /// still meaningful: pages committed before the failure stay persisted.
    pub error: Option<String>,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: i64,
    pub public_id: Uuid,
    pub subscriptions_attempted: usize,
    pub subscriptions_failed: usize,
    pub posts_collected: i32,
    pub posts_labeled: u64,
    pub statistics_scopes: usize,
    pub wordcloud_snapshots: usize,
    pub keyword_scopes: usize,
    pub outcomes: Vec<SubscriptionOutcome>,
}

impl RunReport {
    /// Outcomes for subscriptions that failed this run.
    pub fn failed_outcomes(&self) -> impl Iterator<Item = &SubscriptionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}
