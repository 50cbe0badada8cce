//! Retry with exponential back-off and jitter for the search client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx, rate limiting, truncated pages).
//! Auth failures and unexpected 4xx statuses are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::SearchError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 5xx responses: transient server/infrastructure errors.
/// - [`SearchError::RateLimited`]: the server asked for a pause; the request
///   itself is still valid.
/// - [`SearchError::Deserialize`]: pages occasionally arrive truncated; a
///   re-fetch parses.
///
/// **Not retriable (hard stop):**
/// - [`SearchError::Auth`]: bad credentials; retrying returns the same 401.
/// - [`SearchError::UnexpectedStatus`]: the request itself is wrong.
/// - [`SearchError::InvalidBaseUrl`]: configuration problem.
pub(crate) fn is_retriable(err: &SearchError) -> bool {
    match err {
        SearchError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SearchError::RateLimited { .. } | SearchError::Deserialize { .. } => true,
        SearchError::Auth { .. }
        | SearchError::UnexpectedStatus { .. }
        | SearchError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The sleep before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds
/// with ±25% jitter, capped at 60 s. When the failure was
/// [`SearchError::RateLimited`], the server's `Retry-After` value is a lower
/// bound for the sleep. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, SearchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SearchError>>,
{
    const MAX_DELAY_SECS: u64 = 60;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_secs.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_SECS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let mut delay_secs = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                if let SearchError::RateLimited { retry_after_secs } = &err {
                    delay_secs = delay_secs.max(*retry_after_secs);
                }
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs,
                    error = %err,
                    "transient search error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn deserialize_err() -> SearchError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        SearchError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn auth_is_not_retriable() {
        assert!(!is_retriable(&SearchError::Auth { status: 401 }));
    }

    #[test]
    fn unexpected_status_is_not_retriable() {
        assert!(!is_retriable(&SearchError::UnexpectedStatus {
            status: 400,
            url: "https://example.com".to_owned(),
        }));
    }

    #[test]
    fn rate_limited_is_retriable() {
        assert!(is_retriable(&SearchError::RateLimited {
            retry_after_secs: 30
        }));
    }

    #[test]
    fn deserialize_error_is_retriable() {
        assert!(is_retriable(&deserialize_err()));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, SearchError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limited_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(SearchError::RateLimited {
                        retry_after_secs: 0,
                    })
                } else {
                    Ok::<u32, SearchError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_deserialize_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(deserialize_err())
                } else {
                    Ok::<u32, SearchError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(SearchError::RateLimited {
                    retry_after_secs: 0,
                })
            }
        })
        .await;
        // max_retries=2 means 3 total attempts
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(SearchError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_auth_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(SearchError::Auth { status: 401 })
            }
        })
        .await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "Auth must not be retried"
        );
        assert!(matches!(result, Err(SearchError::Auth { status: 401 })));
    }
}
