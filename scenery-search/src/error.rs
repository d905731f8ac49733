//! Error types for the scenery-search crate.
//!
//! Messages are stable strings suitable for logs. Upstream failures never
//! reach API clients verbatim; the orchestrator folds them into empty
//! results.

/// Errors that can occur while resolving images for a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The request body had the wrong shape or type. Rejected before any
    /// upstream work starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The upstream did not answer within the configured timeout.
    #[error("upstream timed out: {0}")]
    UpstreamTimeout(String),

    /// The upstream answered with a non-success status.
    #[error("upstream unavailable: HTTP {status}")]
    UpstreamUnavailable {
        /// HTTP status returned by the upstream.
        status: u16,
    },

    /// Transport-level failure (DNS, connection reset, body read).
    #[error("upstream error: {0}")]
    UpstreamError(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Whether this error was caused by the upstream rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTimeout(_) | Self::UpstreamUnavailable { .. } | Self::UpstreamError(_)
        )
    }

    /// Human-readable reason to report back to the caller.
    ///
    /// For [`SearchError::InvalidInput`] this is the bare reason without the
    /// `invalid input:` prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::InvalidInput(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for scenery-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
