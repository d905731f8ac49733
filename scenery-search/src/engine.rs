//! Trait definition for the raw image search upstream.
//!
//! The resolver only needs one thing from the upstream: the raw page for a
//! query. [`ImageSource`] is that seam, implemented by
//! [`crate::engines::BingImages`] in production and by in-process fakes in
//! tests.

use std::sync::Arc;

use crate::error::SearchError;

/// A raw image search backend.
///
/// Implementors issue exactly one outbound request per call and never retry.
/// They own the request timeout and the mapping of HTTP-layer failures onto
/// [`SearchError::UpstreamTimeout`], [`SearchError::UpstreamUnavailable`] and
/// [`SearchError::UpstreamError`].
///
/// All implementations must be `Send + Sync` so one instance can serve many
/// concurrent resolutions.
pub trait ImageSource: Send + Sync {
    /// Fetch the raw result page for `query`, asking for `count` images.
    ///
    /// # Errors
    ///
    /// Returns an upstream-class [`SearchError`] on timeout, non-success
    /// status or transport failure.
    fn fetch(
        &self,
        query: &str,
        count: usize,
    ) -> impl std::future::Future<Output = Result<String, SearchError>> + Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

impl<T: ImageSource> ImageSource for Arc<T> {
    async fn fetch(&self, query: &str, count: usize) -> Result<String, SearchError> {
        (**self).fetch(query, count).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
