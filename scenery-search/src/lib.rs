//! # scenery-search
//!
//! Bulk destination image lookup over a slow, rate-limited image search
//! upstream.
//!
//! ## Design
//!
//! - Fetches Bing Images result pages and reads the media URL out of each
//!   result tile's embedded JSON metadata
//! - Drops images from stock photo providers known to watermark previews
//! - In-memory LRU cache keyed by `(query, max_images)` with configurable TTL
//! - A process-wide semaphore caps concurrent upstream calls
//! - Graceful degradation: a failing location yields an empty list while the
//!   rest of the batch resolves normally
//!
//! The cache and the gate are plain values built once at startup and handed
//! to the [`BulkOrchestrator`]; there are no hidden globals.

pub mod cache;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod extract;
pub mod gate;
pub mod http;
pub mod orchestrator;
pub mod resolver;
pub mod types;
pub mod watermark;

pub use cache::{CacheKey, ResultCache};
pub use config::ImageSearchConfig;
pub use engine::ImageSource;
pub use engines::BingImages;
pub use error::{Result, SearchError};
pub use gate::ConcurrencyGate;
pub use orchestrator::{
    BatchOutcome, BatchRequest, BatchResponse, BulkOrchestrator, ImageParams, LocationRequest,
    QueryOutcome,
};
pub use resolver::Resolver;
pub use types::ImageResult;

/// Build an orchestrator backed by Bing Images.
///
/// Validates `config`, then creates the shared cache, gate and HTTP client
/// it describes.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid or the HTTP client
/// cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scenery_search::Result<()> {
/// let orchestrator = scenery_search::bing_orchestrator(&Default::default())?;
/// let outcome = orchestrator
///     .handle_json(serde_json::json!(["Paris", "Rome"]))
///     .await?;
/// println!("{:?}", outcome.into_response());
/// # Ok(())
/// # }
/// ```
pub fn bing_orchestrator(config: &ImageSearchConfig) -> Result<BulkOrchestrator<BingImages>> {
    config.validate()?;
    let source = BingImages::new(config)?;
    Ok(BulkOrchestrator::from_config(source, config))
}
