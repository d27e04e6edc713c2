//! Search envelope and streaming event types
//!
//! The buffered API returns one [`SearchEnvelope`]; the SSE API emits a
//! sequence of [`SearchEvent`]s in source-completion order, terminated by
//! `SearchEvent::Done`. Envelopes live for one request and are never
//! persisted.

use crate::types::result::SearchResult;
use serde::{Deserialize, Serialize};

/// Why one source contributed zero results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Buffered response for one search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEnvelope {
    pub query: String,
    pub cleaned_query: String,
    /// Sources actually dispatched (post bang-routing, post enabled filter)
    pub sources: Vec<String>,
    pub results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failed: Vec<SourceFailure>,
    pub elapsed_ms: u64,
    pub bang_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_bang: Option<String>,
}

/// Streaming events, one frame per completed source plus a terminal summary.
///
/// Events arrive in completion order, which is non-deterministic across runs;
/// within one source's batch the adapter's native order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SearchEvent {
    /// One source finished; carries its full batch
    SourceResults {
        source: String,
        results: Vec<SearchResult>,
        elapsed_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One source failed or timed out; contributes zero results
    SourceFailed {
        source: String,
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Terminal summary, always the last event of a stream
    Done {
        sources_searched: usize,
        sources_failed: usize,
        total_results: usize,
        elapsed_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        invalid_bang: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SearchEvent {
    /// SSE event name for this frame (`event:` field).
    pub fn event_name(&self) -> &'static str {
        match self {
            SearchEvent::SourceResults { .. } => "result",
            SearchEvent::SourceFailed { .. } => "result",
            SearchEvent::Done { .. } => "done",
        }
    }
}
