//! Single-query resolution: cache, gate, fetch, extract, store.
//!
//! # Pipeline
//!
//! 1. Look up `(query, max_images)` in the [`ResultCache`]. A live entry is
//!    returned at once with no gate slot and no upstream call.
//! 2. Take a slot from the [`ConcurrencyGate`] and fetch the raw page.
//!    The slot is released as soon as the page is in hand.
//! 3. Extract image URLs outside the gate.
//! 4. Store the result with a fresh expiry and return it.
//!
//! Two concurrent misses for the same key both go upstream and both store
//! their result, unless `coalesce_in_flight` is set, in which case they
//! share one upstream call.

use crate::cache::{CacheKey, ResultCache};
use crate::config::ImageSearchConfig;
use crate::engine::ImageSource;
use crate::error::SearchError;
use crate::extract::extract_images;
use crate::gate::ConcurrencyGate;
use crate::types::ImageResult;

/// Resolves one query to an [`ImageResult`] through the shared cache and gate.
#[derive(Debug)]
pub struct Resolver<S> {
    source: S,
    cache: ResultCache,
    gate: ConcurrencyGate,
    coalesce_in_flight: bool,
}

impl<S: ImageSource> Resolver<S> {
    /// Create a resolver over `source` using the shared `cache` and `gate`.
    pub fn new(source: S, cache: ResultCache, gate: ConcurrencyGate) -> Self {
        Self {
            source,
            cache,
            gate,
            coalesce_in_flight: false,
        }
    }

    /// Create a resolver with a cache and gate sized from `config`.
    pub fn from_config(source: S, config: &ImageSearchConfig) -> Self {
        Self::new(
            source,
            ResultCache::from_config(config),
            ConcurrencyGate::from_config(config),
        )
        .with_coalescing(config.coalesce_in_flight)
    }

    /// Share one upstream call between concurrent misses for the same key.
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce_in_flight = enabled;
        self
    }

    /// Resolve `query` to at most `max_images` URLs.
    ///
    /// # Errors
    ///
    /// Propagates the upstream failure of the [`ImageSource`]. Extraction
    /// itself never fails.
    pub async fn resolve(&self, query: &str, max_images: usize) -> Result<ImageResult, SearchError> {
        let key = CacheKey::new(query, max_images);

        if let Some(hit) = self.cache.get(&key).await {
            tracing::trace!(query = key.query(), max_images = key.max_images(), "cache hit");
            return Ok(hit);
        }

        if self.coalesce_in_flight {
            return self
                .cache
                .get_or_try_insert_with(key, self.fetch_and_extract(query, max_images))
                .await;
        }

        let images = self.fetch_and_extract(query, max_images).await?;
        self.cache.insert(key, images.clone()).await;
        Ok(images)
    }

    async fn fetch_and_extract(
        &self,
        query: &str,
        max_images: usize,
    ) -> Result<ImageResult, SearchError> {
        let html = {
            let _slot = self.gate.acquire().await?;
            tracing::debug!(
                query,
                max_images,
                source = self.source.name(),
                in_flight = self.gate.in_use(),
                "fetching upstream"
            );
            self.source.fetch(query, max_images).await?
        };

        Ok(extract_images(&html, max_images))
    }

    /// The shared result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The shared admission gate.
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// The upstream this resolver fetches from.
    pub fn source(&self) -> &S {
        &self.source
    }
}
