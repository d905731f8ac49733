//! Bing Images upstream.
//!
//! Bing's image results page embeds per-image metadata as JSON in the `m`
//! attribute of `a.iusc` anchors; [`crate::extract`] pulls the media URLs
//! out of it. This module only fetches the page.

use crate::config::ImageSearchConfig;
use crate::engine::ImageSource;
use crate::error::SearchError;
use crate::http;
use url::Url;

/// Path of the image results page, relative to the configured base URL.
const IMAGE_SEARCH_PATH: &str = "/images/search";

/// Bing image search page fetcher.
///
/// One client is built per instance and shared across all requests, so the
/// connection pool survives between queries.
#[derive(Debug, Clone)]
pub struct BingImages {
    client: reqwest::Client,
    endpoint: Url,
}

impl BingImages {
    /// Build a fetcher for the upstream described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `base_url` is not a valid absolute
    /// URL or the HTTP client cannot be constructed.
    pub fn new(config: &ImageSearchConfig) -> Result<Self, SearchError> {
        let mut endpoint = Url::parse(&config.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url {:?}: {e}", config.base_url)))?;
        endpoint.set_path(IMAGE_SEARCH_PATH);
        endpoint.set_query(None);

        Ok(Self {
            client: http::build_client(config)?,
            endpoint,
        })
    }

    /// The results page URL requests are sent to, without query parameters.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ImageSource for BingImages {
    async fn fetch(&self, query: &str, count: usize) -> Result<String, SearchError> {
        tracing::trace!(query, count, "Bing image search");

        let count = count.to_string();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Bing returned non-success status");
            return Err(SearchError::UpstreamUnavailable {
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(map_transport_error)?;

        tracing::trace!(bytes = html.len(), "Bing response received");
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "Bing"
    }
}

/// Map a reqwest failure onto the upstream error taxonomy.
fn map_transport_error(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::UpstreamTimeout(format!("Bing request timed out: {err}"))
    } else {
        SearchError::UpstreamError(format!("Bing request failed: {err}"))
    }
}
