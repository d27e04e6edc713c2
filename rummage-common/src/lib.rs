//! # Rummage Common Library
//!
//! Shared code for the rummage search aggregator:
//! - Normalized result schema and source descriptors
//! - Parsed-query type produced by the bang router
//! - Search envelope and streaming event types
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod types;

pub use error::{Error, Result};
pub use types::query::ParsedQuery;
pub use types::result::SearchResult;
pub use types::source::{ExtractionMethod, Feature, SourceDescriptor};
