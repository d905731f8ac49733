//! Core types for resolved image results.

use serde::{Deserialize, Serialize};

/// Image URLs resolved for one query.
///
/// Order is discovery order in the upstream payload. URLs are never
/// deduplicated and never come from a watermark domain. Serialises as a
/// plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageResult {
    urls: Vec<String>,
}

impl ImageResult {
    /// An empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a URL at the end of the result.
    pub fn push(&mut self, url: String) {
        self.urls.push(url);
    }

    /// Number of URLs in the result.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the result holds no URLs.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// The URLs in discovery order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Consume the result, returning the URLs.
    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

impl From<Vec<String>> for ImageResult {
    fn from(urls: Vec<String>) -> Self {
        Self { urls }
    }
}
