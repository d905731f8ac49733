//! Watermark source filter.
//!
//! Stock photo providers overlay branding on their previews. Any URL that
//! mentions one of their domains anywhere in its text is rejected. The
//! match is a plain substring test with no host parsing, so a blocked domain
//! hiding in a path segment or query parameter is caught too.

/// Domains known to serve watermarked images.
pub const WATERMARK_DOMAINS: &[&str] = &[
    "shutterstock.com",
    "alamy.com",
    "istockphoto.com",
    "dreamstime.com",
    "gettyimages.com",
    "123rf.com",
    "depositphotos.com",
    "bigstockphoto.com",
];

/// Returns `true` if `url` contains any watermark domain.
pub fn is_watermark_source(url: &str) -> bool {
    WATERMARK_DOMAINS.iter().any(|domain| url.contains(domain))
}
