//! Shared HTTP client for upstream image search requests.
//!
//! Provides a configured [`reqwest::Client`] that always presents the same
//! browser-like User-Agent, so the upstream treats requests like ordinary
//! page views.

use crate::config::ImageSearchConfig;
use crate::error::SearchError;
use std::time::Duration;

/// Desktop Chrome User-Agent sent when no custom value is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36";

/// Build a [`reqwest::Client`] configured for upstream scraping.
///
/// The client has:
/// - Total request timeout from config
/// - Fixed User-Agent (or custom if configured)
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the client cannot be constructed.
pub fn build_client(config: &ImageSearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(user_agent(config))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// The User-Agent the client presents for `config`.
pub fn user_agent(config: &ImageSearchConfig) -> &str {
    config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
}
