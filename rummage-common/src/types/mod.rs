//! Shared data types for the search aggregator

pub mod query;
pub mod result;
pub mod source;
