//! Async client for the recent post search API.
//!
//! [`SearchClient`] drives cursor-based pagination over the search endpoint
//! with bearer authentication, a shared minimum interval between requests,
//! and bounded retry with exponential back-off on transient failures. Raw
//! pages come back as [`SearchPage`] values; validation of individual posts
//! is the caller's job.

pub mod client;
pub mod error;
pub mod pacer;
pub mod types;

mod retry;

pub use client::SearchClient;
pub use error::SearchError;
pub use pacer::RequestPacer;
pub use types::{RawPost, ResponseMeta, SearchPage, SearchResponse};
