//! # Rummage Search Service (rummage-search)
//!
//! Concurrent multi-source search aggregator.
//!
//! **Purpose:** Parse a raw query (bang mini-language), fan it out across a
//! registry of heterogeneous source adapters, normalize everything into one
//! result schema, and deliver the merged set buffered or streamed over SSE.
//!
//! **Architecture:** One short-lived tokio task per selected source per
//! request, bulkhead-isolated behind per-source timeouts nested inside an
//! overall request deadline.

pub mod adapters;
pub mod api;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod query;
pub mod state;
pub mod suggest;
pub mod transport;

pub use error::{Error, Result};
pub use state::AppState;
