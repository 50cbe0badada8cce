use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub countries_path: PathBuf,
    pub topics_path: PathBuf,
    /// Bearer token for the post-search API. Absent on read-only deployments
    /// (the API server never calls out); the pipeline refuses to start
    /// without it.
    pub search_bearer_token: Option<String>,
    /// Override of the search endpoint, used against self-hosted proxies.
    pub search_base_url: Option<String>,
    /// Scope code for the cross-country aggregate snapshots.
    pub region_code: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub search_request_timeout_secs: u64,
    pub search_user_agent: String,
    pub search_min_request_interval_ms: u64,
    pub search_max_retries: u32,
    pub search_retry_backoff_base_secs: u64,
    pub collect_max_concurrent: usize,
    pub collect_page_size: u32,
    pub collect_max_pages: u32,
    pub collect_write_retries: u32,
    pub wordcloud_top_n: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("countries_path", &self.countries_path)
            .field("topics_path", &self.topics_path)
            .field("database_url", &"[redacted]")
            .field(
                "search_bearer_token",
                &self.search_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("search_base_url", &self.search_base_url)
            .field("region_code", &self.region_code)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "search_request_timeout_secs",
                &self.search_request_timeout_secs,
            )
            .field("search_user_agent", &self.search_user_agent)
            .field(
                "search_min_request_interval_ms",
                &self.search_min_request_interval_ms,
            )
            .field("search_max_retries", &self.search_max_retries)
            .field(
                "search_retry_backoff_base_secs",
                &self.search_retry_backoff_base_secs,
            )
            .field("collect_max_concurrent", &self.collect_max_concurrent)
            .field("collect_page_size", &self.collect_page_size)
            .field("collect_max_pages", &self.collect_max_pages)
            .field("collect_write_retries", &self.collect_write_retries)
            .field("wordcloud_top_n", &self.wordcloud_top_n)
            .finish()
    }
}
