//! HTTP client for the recent post search endpoint.
//!
//! Wraps `reqwest` with bearer authentication, global request pacing, typed
//! status mapping, and automatic retry on transient failures. Pagination is
//! cursor-driven: callers feed the `next_token` from one page into the next
//! request.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::SearchError;
use crate::pacer::RequestPacer;
use crate::retry::retry_with_backoff;
use crate::types::{SearchPage, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

/// Post fields requested alongside every result.
const POST_FIELDS: &str = "created_at,lang";

/// Query used by [`SearchClient::verify_credentials`]. Any match count is
/// fine; only the HTTP status matters.
const PROBE_QUERY: &str = "sdg";

/// Smallest page size the API accepts.
const PROBE_MAX_RESULTS: u32 = 10;

/// Client for the recent post search API.
///
/// Manages the HTTP client, bearer token, base URL, and the shared request
/// pacer. Use [`SearchClient::new`] for production or
/// [`SearchClient::with_base_url`] to point at a mock server in tests.
pub struct SearchClient {
    client: Client,
    bearer_token: Option<String>,
    base_url: Url,
    pacer: RequestPacer,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential back-off.
    backoff_base_secs: u64,
}

impl SearchClient {
    /// Creates a new client pointed at the production search endpoint.
    ///
    /// `min_request_interval_ms` spaces every outbound request made through
    /// this client, across all concurrent callers. Set `max_retries` to `0`
    /// to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        bearer_token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        min_request_interval_ms: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SearchError> {
        Self::with_base_url(
            bearer_token,
            timeout_secs,
            user_agent,
            min_request_interval_ms,
            max_retries,
            backoff_base_secs,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client against a custom endpoint URL (for testing with
    /// wiremock).
    ///
    /// `base_url` is the full endpoint URL; query parameters are appended to
    /// it as-is.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        bearer_token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        min_request_interval_ms: u64,
        max_retries: u32,
        backoff_base_secs: u64,
        base_url: &str,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let parsed = Url::parse(base_url).map_err(|e| SearchError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            bearer_token: bearer_token.map(str::to_owned),
            base_url: parsed,
            pacer: RequestPacer::new(min_request_interval_ms),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one page of posts matching `query`, strictly newer than
    /// `since_id` when given.
    ///
    /// `next_token` must come from the previous page of the same query.
    /// Transient failures (429, 5xx, network errors, truncated bodies) are
    /// retried with back-off before the error is surfaced.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Auth`]: HTTP 401/403 (not retried).
    /// - [`SearchError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`SearchError::UnexpectedStatus`]: any other non-2xx status (5xx
    ///   retried, 4xx not).
    /// - [`SearchError::Http`]: network or TLS failure after all retries
    ///   exhausted.
    /// - [`SearchError::Deserialize`]: body failed to parse after all
    ///   retries exhausted.
    pub async fn fetch_page(
        &self,
        query: &str,
        max_results: u32,
        since_id: Option<i64>,
        next_token: Option<&str>,
    ) -> Result<SearchPage, SearchError> {
        let url = self.build_url(query, max_results, since_id, next_token);

        let response = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move { self.request_page(url).await }
        })
        .await?;

        let next_token = response.meta.as_ref().and_then(|m| m.next_token.clone());
        let result_count = response
            .meta
            .as_ref()
            .and_then(|m| m.result_count)
            .unwrap_or(response.data.len() as u64);

        Ok(SearchPage {
            posts: response.data,
            next_token,
            result_count,
        })
    }

    /// Probes the API with a minimal query to validate the configured
    /// credentials before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Auth`] when the token is rejected; other
    /// variants surface network or protocol failures as in
    /// [`Self::fetch_page`].
    pub async fn verify_credentials(&self) -> Result<(), SearchError> {
        self.fetch_page(PROBE_QUERY, PROBE_MAX_RESULTS, None, None)
            .await
            .map(|_| ())
    }

    /// Sends one GET for `url`, maps the status to a typed error, and parses
    /// the body. The request waits on the shared pacer first, so retries are
    /// paced like fresh requests.
    async fn request_page(&self, url: Url) -> Result<SearchResponse, SearchError> {
        self.pacer.wait().await;

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SearchError::Auth {
                status: status.as_u16(),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(SearchError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<SearchResponse>(&body).map_err(|e| SearchError::Deserialize {
            context: format!("search page from {url}"),
            source: e,
        })
    }

    /// Builds the request URL with properly percent-encoded query parameters.
    fn build_url(
        &self,
        query: &str,
        max_results: u32,
        since_id: Option<i64>,
        next_token: Option<&str>,
    ) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            pairs.append_pair("max_results", &max_results.to_string());
            pairs.append_pair("tweet.fields", POST_FIELDS);
            if let Some(id) = since_id {
                pairs.append_pair("since_id", &id.to_string());
            }
            if let Some(token) = next_token {
                pairs.append_pair("next_token", token);
            }
        }
        url
    }
}
