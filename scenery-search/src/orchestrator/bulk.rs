//! Bulk orchestrator: concurrent per-location fan-out with per-item degradation.
//!
//! Every query in a batch is resolved concurrently through the shared
//! [`Resolver`]. A failing query degrades to an empty result for that query
//! alone; siblings are unaffected and the batch as a whole never fails once
//! its shape has been validated.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::config::ImageSearchConfig;
use crate::engine::ImageSource;
use crate::error::SearchError;
use crate::resolver::Resolver;
use crate::types::ImageResult;

use super::request::{BatchRequest, LocationRequest};

/// How a single query ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The upstream answered; the result may still be empty.
    Resolved(ImageResult),
    /// Resolution failed and the query was degraded to an empty result.
    Degraded(SearchError),
}

impl QueryOutcome {
    /// Whether the query was degraded.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// The images to report: the resolved result, or nothing when degraded.
    pub fn into_images(self) -> ImageResult {
        match self {
            Self::Resolved(images) => images,
            Self::Degraded(_) => ImageResult::new(),
        }
    }
}

impl From<Result<ImageResult, SearchError>> for QueryOutcome {
    fn from(result: Result<ImageResult, SearchError>) -> Self {
        match result {
            Ok(images) => Self::Resolved(images),
            Err(err) => Self::Degraded(err),
        }
    }
}

/// Outcome of a whole request, before it is flattened into a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// One outcome per input location, in input order.
    Locations(Vec<(String, QueryOutcome)>),
    /// Outcome of a single-location request.
    Single(QueryOutcome),
}

impl BatchOutcome {
    /// Number of queries that were degraded.
    pub fn degraded_count(&self) -> usize {
        match self {
            Self::Locations(outcomes) => outcomes.iter().filter(|(_, o)| o.is_degraded()).count(),
            Self::Single(outcome) => usize::from(outcome.is_degraded()),
        }
    }

    /// Flatten into the wire response. Degraded queries become empty arrays.
    pub fn into_response(self) -> BatchResponse {
        match self {
            Self::Locations(outcomes) => BatchResponse::Locations(
                outcomes
                    .into_iter()
                    .map(|(query, outcome)| (query, outcome.into_images().into_urls()))
                    .collect(),
            ),
            Self::Single(outcome) => BatchResponse::Single {
                images: outcome.into_images().into_urls(),
            },
        }
    }
}

/// Response body of the bulk endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    /// `{"<location>": ["url", ...], ...}` with one key per distinct location.
    Locations(BTreeMap<String, Vec<String>>),
    /// `{"images": ["url", ...]}`.
    Single {
        /// Resolved image URLs.
        images: Vec<String>,
    },
}

/// Accepts batches and fans them out to the shared resolver.
#[derive(Debug)]
pub struct BulkOrchestrator<S> {
    resolver: Resolver<S>,
    images_per_query: usize,
    max_batch_size: usize,
}

impl<S: ImageSource> BulkOrchestrator<S> {
    /// Create an orchestrator over `resolver`.
    pub fn new(resolver: Resolver<S>, images_per_query: usize, max_batch_size: usize) -> Self {
        Self {
            resolver,
            images_per_query,
            max_batch_size,
        }
    }

    /// Create an orchestrator, cache and gate from `config`.
    pub fn from_config(source: S, config: &ImageSearchConfig) -> Self {
        Self::new(
            Resolver::from_config(source, config),
            config.images_per_query,
            config.max_batch_size,
        )
    }

    /// Validate a JSON body and resolve it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidInput`] if the body has neither
    /// accepted shape. No upstream call is made in that case. Upstream
    /// failures never surface here.
    pub async fn handle_json(&self, body: Value) -> Result<BatchOutcome, SearchError> {
        let request = BatchRequest::from_json(body, self.max_batch_size)?;
        Ok(self.run(request).await)
    }

    /// Resolve an already validated request.
    pub async fn run(&self, request: BatchRequest) -> BatchOutcome {
        tracing::debug!(queries = request.queries().len(), "resolving batch");
        let outcome = match request {
            BatchRequest::Locations(locations) => {
                BatchOutcome::Locations(self.resolve_locations(locations).await)
            }
            BatchRequest::Single(request) => BatchOutcome::Single(self.resolve_single(&request).await),
        };

        let degraded = outcome.degraded_count();
        if degraded > 0 {
            tracing::warn!(
                degraded,
                source = self.resolver.source().name(),
                "batch completed with degraded queries"
            );
        }
        outcome
    }

    /// Resolve every location concurrently.
    ///
    /// All resolutions are started before any is awaited. Results are paired
    /// with their own query, so completion order does not matter. Repeated
    /// locations are resolved independently.
    pub async fn resolve_locations(&self, locations: Vec<String>) -> Vec<(String, QueryOutcome)> {
        let futures: Vec<_> = locations
            .into_iter()
            .map(|query| async move {
                let outcome = self.resolve_one(&query).await;
                (query, outcome)
            })
            .collect();

        futures::future::join_all(futures).await
    }

    /// Resolve a single-location request, degrading on failure.
    pub async fn resolve_single(&self, request: &LocationRequest) -> QueryOutcome {
        if let Some(params) = &request.params {
            tracing::trace!(?params, "display params accepted but not applied");
        }
        self.resolve_one(&request.location).await
    }

    async fn resolve_one(&self, query: &str) -> QueryOutcome {
        let outcome = QueryOutcome::from(self.resolver.resolve(query, self.images_per_query).await);
        match &outcome {
            QueryOutcome::Resolved(images) => {
                tracing::debug!(query, count = images.len(), "query resolved");
            }
            QueryOutcome::Degraded(err) => {
                tracing::debug!(query, "query degraded");
                tracing::warn!(error = %err, "image lookup failed; returning empty result");
            }
        }
        outcome
    }

    /// Number of entries currently in the shared cache.
    pub async fn cache_size(&self) -> u64 {
        self.resolver.cache().len().await
    }

    /// The shared resolver.
    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    /// Images requested per query.
    pub fn images_per_query(&self) -> usize {
        self.images_per_query
    }

    /// Largest accepted list request.
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
