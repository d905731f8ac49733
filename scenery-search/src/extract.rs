//! Image URL extraction from the upstream results page.
//!
//! Each result tile is an `a.iusc` anchor whose `m` attribute holds a JSON
//! object; its `murl` field is the full-size media URL. Tiles that fail to
//! decode are expected noise and are skipped.

use scraper::{Html, Selector};
use serde::Deserialize;

use crate::types::ImageResult;
use crate::watermark::is_watermark_source;

/// CSS selector for the per-image metadata anchors.
const TILE_SELECTOR: &str = "a.iusc";

/// Attribute carrying the serialised metadata object.
const METADATA_ATTR: &str = "m";

/// The part of a tile's metadata we care about.
#[derive(Debug, Deserialize)]
struct TileMetadata {
    /// Media URL of the full-size image.
    murl: Option<String>,
}

/// Extract up to `max_images` acceptable image URLs from `html`.
///
/// URLs are returned in page order. Watermark sources are dropped. Decoding
/// stops as soon as `max_images` URLs have been accepted. This never fails:
/// a page without usable tiles yields an empty result.
pub fn extract_images(html: &str, max_images: usize) -> ImageResult {
    let mut images = ImageResult::new();
    if max_images == 0 {
        return images;
    }

    let tile_sel = match Selector::parse(TILE_SELECTOR) {
        Ok(sel) => sel,
        Err(e) => {
            tracing::warn!(error = ?e, "invalid tile selector");
            return images;
        }
    };

    let document = Html::parse_document(html);

    for tile in document.select(&tile_sel) {
        let Some(raw) = tile.value().attr(METADATA_ATTR) else {
            continue;
        };

        let metadata: TileMetadata = match serde_json::from_str(raw) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable image tile");
                continue;
            }
        };

        match metadata.murl {
            Some(url) if !url.is_empty() && !is_watermark_source(&url) => images.push(url),
            _ => continue,
        }

        if images.len() >= max_images {
            break;
        }
    }

    tracing::debug!(count = images.len(), "image tiles extracted");
    images
}
