//! Image search configuration with sensible defaults.
//!
//! [`ImageSearchConfig`] controls the upstream address, batch limits, the
//! size of the admission gate, the result cache, and request behaviour. The
//! defaults are tuned for polite scraping of a single upstream.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration for the bulk image resolution pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Missing fields fall back to their
/// defaults when deserialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSearchConfig {
    /// Scheme and host of the image search upstream.
    pub base_url: String,
    /// Number of images requested per query by the orchestrator.
    pub images_per_query: usize,
    /// Maximum number of locations accepted in a single list request.
    pub max_batch_size: usize,
    /// Maximum number of upstream calls in flight at once, process-wide.
    pub max_concurrent_requests: usize,
    /// Per-request upstream timeout in seconds.
    pub timeout_seconds: u64,
    /// How long a resolved result stays cached.
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached `(query, max_images)` entries.
    pub cache_capacity: u64,
    /// Custom User-Agent string. If `None`, a fixed desktop browser
    /// User-Agent is sent.
    pub user_agent: Option<String>,
    /// Collapse concurrent cache misses for the same key into one upstream
    /// call. Off by default: each miss proceeds independently.
    pub coalesce_in_flight: bool,
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.bing.com".to_owned(),
            images_per_query: 5,
            max_batch_size: 20,
            max_concurrent_requests: 50,
            timeout_seconds: 10,
            cache_ttl_seconds: 3600,
            cache_capacity: 1000,
            user_agent: None,
            coalesce_in_flight: false,
        }
    }
}

impl ImageSearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Every numeric limit must be greater than 0 and `base_url` must not
    /// be empty.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.base_url.trim().is_empty() {
            return Err(SearchError::Config("base_url must not be empty".into()));
        }
        let limits = [
            ("images_per_query", self.images_per_query as u64),
            ("max_batch_size", self.max_batch_size as u64),
            ("max_concurrent_requests", self.max_concurrent_requests as u64),
            ("timeout_seconds", self.timeout_seconds),
            ("cache_ttl_seconds", self.cache_ttl_seconds),
            ("cache_capacity", self.cache_capacity),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(SearchError::Config(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        Ok(())
    }
}
