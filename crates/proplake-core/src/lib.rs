//! Proplake Core - incremental real-estate listing ingestion engine
//!
//! This library provides the core functionality for pulling time-stamped
//! property listings from an HTTP source and landing them in a two-tier
//! date-partitioned lake:
//!
//! - Watermark-driven incremental extraction windows
//! - A loosely-typed raw (bronze) tier that preserves source payloads
//! - A typed, deduplicated curated (silver) tier merged on (id, published_at)
//! - Idempotent re-runs: replayed windows never duplicate curated rows

pub mod bronze;
pub mod coerce;
pub mod config;
pub mod error;
pub mod flatten;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod silver;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result, SourceError, StoreError};
pub use pipeline::{Pipeline, RunReport};
