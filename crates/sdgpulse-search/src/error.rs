use thiserror::Error;

/// Errors returned by the post search API client.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The API rejected the bearer token (HTTP 401 or 403). Never retried;
    /// callers treat this as fatal for the whole run.
    #[error("search API rejected credentials (HTTP {status})")]
    Auth { status: u16 },

    /// HTTP 429. `retry_after_secs` carries the `Retry-After` header value
    /// when the server sent one, falling back to 60 seconds.
    #[error("search API rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other non-2xx status (4xx outside auth and rate limiting).
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL could not be parsed.
    #[error("invalid search base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
