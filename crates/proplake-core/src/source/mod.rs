//! Upstream extraction: date-bounded windows and the HTTP listing source.

mod client;
mod window;

pub use client::{HttpListingSource, ListingSource};
pub use window::{parse_bound, Bound, ExtractionWindow, WATERMARK_FLOOR};
