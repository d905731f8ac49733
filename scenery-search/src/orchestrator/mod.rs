//! Bulk orchestrator: request validation, concurrent fan-out, per-query degradation.
//!
//! This module classifies incoming request bodies, resolves every location
//! concurrently through the shared resolver, absorbs upstream failures into
//! empty results, and assembles the response keyed by location.

pub mod bulk;
pub mod request;

pub use bulk::{BatchOutcome, BatchResponse, BulkOrchestrator, QueryOutcome};
pub use request::{BatchRequest, ImageParams, LocationRequest};
