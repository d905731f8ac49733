//! Error types for the scenery service.

use scenery_search::SearchError;

/// Top-level error type for the HTTP service.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration could not be loaded, saved or validated.
    #[error("config error: {0}")]
    Config(String),

    /// The listener could not be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the image resolution core.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServerError>;
