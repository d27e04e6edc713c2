//! Structured query produced by the bang router

use serde::{Deserialize, Serialize};

/// The router's view of one raw query string.
///
/// Invariant: `cleaned` never contains a token that was successfully
/// classified as a bang, performer filter, exclusion, or quoted phrase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Plain search words rejoined with single spaces, trimmed
    pub cleaned: String,
    /// Target source names in first-appearance order, de-duplicated.
    /// Empty means "search every enabled source".
    pub targets: Vec<String>,
    /// Exact phrases from matched double-quote pairs
    pub phrases: Vec<String>,
    /// Lowercased exclusion terms (`-word`)
    pub exclusions: Vec<String>,
    /// Lowercased performer filters (`@name`)
    pub performers: Vec<String>,
    /// True once any token resolved against the bang table
    pub has_bang: bool,
    /// Last `!token` that missed the bang table, kept verbatim
    pub invalid_bang: Option<String>,
}
