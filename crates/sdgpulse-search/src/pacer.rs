//! Global spacing of outbound search requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive outbound requests.
///
/// One pacer is shared by every collection worker through the client, so the
/// spacing holds across the whole process rather than per subscription. A
/// zero interval disables pacing.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    #[must_use]
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            last_request: Mutex::new(None),
        }
    }

    /// Waits until at least the configured interval has passed since the
    /// previous request, then stamps the current time.
    ///
    /// The internal lock is held across the sleep so that concurrent callers
    /// are released one interval apart rather than all at once.
    pub async fn wait(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
