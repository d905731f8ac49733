//! Image search upstream implementations.
//!
//! Each module provides a struct implementing [`crate::engine::ImageSource`]
//! that fetches a specific provider's image results page.

pub mod bing;

pub use bing::BingImages;
