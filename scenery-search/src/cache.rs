//! In-memory result cache with TTL and capacity eviction.
//!
//! Keyed by the exact `(query, max_images)` pair with no normalisation, so
//! `"Paris"` and `"paris "` are distinct entries. Uses [`moka`] with a
//! least-recently-used eviction policy once capacity is reached; entries
//! older than the TTL are treated as absent.
//!
//! One [`ResultCache`] is built at startup and shared by handle. Clones refer
//! to the same underlying store.

use std::time::Duration;

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use crate::config::ImageSearchConfig;
use crate::error::SearchError;
use crate::types::ImageResult;

/// Cache key: the query exactly as typed plus the requested image count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    max_images: usize,
}

impl CacheKey {
    /// Build a key for `query` and `max_images`.
    pub fn new(query: &str, max_images: usize) -> Self {
        Self {
            query: query.to_owned(),
            max_images,
        }
    }

    /// The query text of this key.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The requested image count of this key.
    pub fn max_images(&self) -> usize {
        self.max_images
    }
}

/// Shared, bounded, time-limited store of resolved results.
///
/// Reads and writes are recorded in buffers and applied at housekeeping
/// time, so the LRU order only reflects accesses up to the last flush.
/// Under a burst the victim may be an entry that was just read.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<CacheKey, ImageResult>,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { inner }
    }

    /// Create a cache sized from `config`.
    pub fn from_config(config: &ImageSearchConfig) -> Self {
        Self::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_seconds),
        )
    }

    /// Look up a live entry. Expired entries are reported as absent.
    pub async fn get(&self, key: &CacheKey) -> Option<ImageResult> {
        self.inner.get(key).await
    }

    /// Store `result` under `key` with a fresh expiry, replacing any
    /// previous value.
    pub async fn insert(&self, key: CacheKey, result: ImageResult) {
        self.inner.insert(key, result).await;
    }

    /// Return the live entry for `key`, or run `init` to produce one.
    ///
    /// Concurrent callers for the same key wait on a single `init`; the
    /// others receive its outcome. Errors are shared with every waiter and
    /// nothing is stored.
    pub async fn get_or_try_insert_with<F>(
        &self,
        key: CacheKey,
        init: F,
    ) -> Result<ImageResult, SearchError>
    where
        F: std::future::Future<Output = Result<ImageResult, SearchError>>,
    {
        self.inner
            .try_get_with(key, init)
            .await
            .map_err(|e| (*e).clone())
    }

    /// Number of entries currently held.
    ///
    /// Flushes pending housekeeping first so expired and evicted entries
    /// are not counted.
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    /// Whether the cache currently holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(urls: &[&str]) -> ImageResult {
        ImageResult::from(urls.iter().map(|u| (*u).to_owned()).collect::<Vec<_>>())
    }

    #[test]
    fn cache_key_is_case_and_whitespace_sensitive() {
        assert_ne!(CacheKey::new("Paris", 5), CacheKey::new("paris", 5));
        assert_ne!(CacheKey::new("Paris", 5), CacheKey::new("Paris ", 5));
        assert_eq!(CacheKey::new("Paris", 5), CacheKey::new("Paris", 5));
    }

    #[test]
    fn cache_key_includes_max_images() {
        assert_ne!(CacheKey::new("Rome", 5), CacheKey::new("Rome", 10));
        let key = CacheKey::new("Rome", 10);
        assert_eq!(key.query(), "Rome");
        assert_eq!(key.max_images(), 10);
    }

    #[tokio::test]
    async fn cache_miss_returns_none() {
        let cache = ResultCache::new(10, Duration::from_secs(60));
        assert!(cache.get(&CacheKey::new("nowhere", 5)).await.is_none());
    }

    #[tokio::test]
    async fn cache_insert_and_retrieve() {
        let cache = ResultCache::new(10, Duration::from_secs(60));
        let key = CacheKey::new("Tokyo", 5);
        cache.insert(key.clone(), result(&["https://a.example/1.jpg"])).await;

        let cached = cache.get(&key).await.expect("should be cached");
        assert_eq!(cached.urls(), ["https://a.example/1.jpg"]);
    }

    #[tokio::test]
    async fn overwrite_same_key_updates_value() {
        let cache = ResultCache::new(10, Duration::from_secs(60));
        let key = CacheKey::new("Lisbon", 5);
        cache.insert(key.clone(), result(&["https://old.example/x.jpg"])).await;
        cache.insert(key.clone(), result(&["https://new.example/x.jpg"])).await;

        let cached = cache.get(&key).await.expect("should be cached");
        assert_eq!(cached.urls(), ["https://new.example/x.jpg"]);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn expired_entries_are_absent() {
        let cache = ResultCache::new(10, Duration::from_millis(50));
        let key = CacheKey::new("Oslo", 5);
        cache.insert(key.clone(), result(&["https://a.example/o.jpg"])).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get(&key).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn size_never_exceeds_capacity() {
        let cache = ResultCache::new(3, Duration::from_secs(60));
        for i in 0..10 {
            cache
                .insert(CacheKey::new(&format!("city-{i}"), 5), ImageResult::new())
                .await;
        }
        assert!(cache.len().await <= 3);
    }

    #[tokio::test]
    async fn evicts_least_recently_used_entry() {
        let cache = ResultCache::new(2, Duration::from_secs(60));
        let a = CacheKey::new("Athens", 5);
        let b = CacheKey::new("Berlin", 5);
        let c = CacheKey::new("Cusco", 5);

        cache.insert(a.clone(), result(&["https://a.example/1.jpg"])).await;
        cache.insert(b.clone(), result(&["https://b.example/1.jpg"])).await;
        assert_eq!(cache.len().await, 2);

        assert!(cache.get(&a).await.is_some());
        assert_eq!(cache.len().await, 2);

        cache.insert(c.clone(), result(&["https://c.example/1.jpg"])).await;
        assert_eq!(cache.len().await, 2);

        assert!(cache.get(&a).await.is_some(), "recently read entry survives");
        assert!(cache.get(&b).await.is_none(), "least recently used entry is evicted");
        assert!(cache.get(&c).await.is_some(), "new entry is admitted");
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = ResultCache::new(10, Duration::from_secs(60));
        let handle = cache.clone();
        handle.insert(CacheKey::new("Cairo", 5), ImageResult::new()).await;
        assert!(cache.get(&CacheKey::new("Cairo", 5)).await.is_some());
    }

    #[tokio::test]
    async fn try_insert_stores_success() {
        let cache = ResultCache::new(10, Duration::from_secs(60));
        let key = CacheKey::new("Quito", 5);
        let value = cache
            .get_or_try_insert_with(key.clone(), async { Ok(result(&["https://q.example/1.jpg"])) })
            .await
            .expect("init succeeds");
        assert_eq!(value.len(), 1);
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn try_insert_does_not_store_failure() {
        let cache = ResultCache::new(10, Duration::from_secs(60));
        let key = CacheKey::new("Lima", 5);
        let err = cache
            .get_or_try_insert_with(key.clone(), async {
                Err(SearchError::UpstreamTimeout("slow".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err, SearchError::UpstreamTimeout("slow".into()));
        assert!(cache.get(&key).await.is_none());
    }
}
