//! Scenery: bulk destination image lookup over HTTP.
//!
//! Wraps the [`scenery_search`] resolution pipeline in an axum service:
//! a batch of location names goes in, a watermark-filtered list of image
//! URLs per location comes out. Results are cached and upstream requests
//! are bounded by a global concurrency gate.

pub mod config;
pub mod error;
pub mod server;

pub use config::{SceneryConfig, ServerConfig};
pub use error::{Result, ServerError};
pub use server::SceneryServer;
