//! Typed response shapes for the recent-search endpoint.

use serde::Deserialize;

/// Top-level JSON envelope returned by a search request.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    /// Matching posts, newest first. The key is absent on empty pages.
    #[serde(default)]
    pub data: Vec<RawPost>,
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}

/// One post as returned by the API, before validation.
///
/// Only `id` is guaranteed by the API contract; everything else is optional
/// and checked by the collector before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    /// Post identifier as a decimal string.
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    /// RFC 3339 creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// BCP-47 language tag detected by the platform.
    #[serde(default)]
    pub lang: Option<String>,
}

/// Pagination and count metadata for one page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMeta {
    /// Opaque cursor for the next page. Absent on the last page.
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub result_count: Option<u64>,
}

/// One fetched page, flattened for callers.
#[derive(Debug)]
pub struct SearchPage {
    pub posts: Vec<RawPost>,
    /// Cursor to request the following page, if the API reported one.
    pub next_token: Option<String>,
    pub result_count: u64,
}

impl SearchPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
