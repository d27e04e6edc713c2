//! HTTP request handlers
//!
//! Search with content negotiation (JSON envelope, SSE stream, or plain
//! text), bang listing/autocomplete, engine listing/detail, suggestions,
//! and the service endpoints every rummage module exposes.

use crate::coordinator::{self, SearchOptions};
use crate::error::{Error, Result};
use crate::query;
use crate::state::AppState;
use crate::suggest;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rummage_common::events::SearchEnvelope;
use rummage_common::types::source::SourceDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    page: Option<i64>,
    /// Comma-separated engine override, bypassing bang routing
    engines: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BangListEntry {
    bang: String,
    source: String,
    source_display: String,
}

const DEFAULT_SUGGEST_LIMIT: usize = 10;

// ============================================================================
// Search
// ============================================================================

/// GET /search - run one aggregated search
///
/// Content negotiation on `Accept`: `text/event-stream` streams per-source
/// frames, `text/plain` returns a flattened listing, anything else gets the
/// buffered JSON envelope.
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let raw = params.q.as_deref().map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(Error::InvalidInput("missing query parameter: q".to_string()));
    }
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(Error::InvalidInput(format!("invalid page: {}", page)));
    }

    let engines = params.engines.map(|list| {
        list.split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
    });

    let ctx = state.snapshot();
    let parsed = query::parse(raw, &ctx.bang_table);
    let options = SearchOptions {
        page: page as u32,
        engines,
    };

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if accept.contains("text/event-stream") {
        let rx = coordinator::search_streaming(&ctx, &parsed, &options)?;
        return Ok(super::sse::search_stream(rx).into_response());
    }

    let envelope = coordinator::search_buffered(&ctx, raw, &parsed, &options).await?;

    if accept.contains("text/plain") {
        return Ok(plain_listing(&envelope).into_response());
    }
    Ok(Json(envelope).into_response())
}

/// Flattened listing for `Accept: text/plain`
fn plain_listing(envelope: &SearchEnvelope) -> String {
    let mut out = String::new();
    for result in &envelope.results {
        out.push_str(&format!("[{}] {}", result.source, result.title));
        if let Some(duration) = &result.duration {
            out.push_str(&format!(" ({})", duration));
        }
        out.push('\n');
        out.push_str(&result.url);
        out.push_str("\n\n");
    }
    out.push_str(&format!(
        "{} results from {} sources in {}ms\n",
        envelope.results.len(),
        envelope.sources.len(),
        envelope.elapsed_ms
    ));
    out
}

// ============================================================================
// Bangs & Suggestions
// ============================================================================

/// GET /bangs - the full bang table
pub async fn list_bangs(State(state): State<AppState>) -> Json<Vec<BangListEntry>> {
    let ctx = state.snapshot();
    let entries = ctx
        .bang_table
        .entries()
        .iter()
        .map(|entry| BangListEntry {
            bang: format!("!{}", entry.alias),
            source: entry.source.clone(),
            source_display: entry.source_display.clone(),
        })
        .collect();
    Json(entries)
}

/// GET /bangs/suggest - ranked bang completion
///
/// An empty prefix yields an empty list, never the whole table.
pub async fn suggest_bangs(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<Vec<suggest::Suggestion>> {
    let ctx = state.snapshot();
    let input = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(DEFAULT_SUGGEST_LIMIT);
    Json(suggest::rank_bangs(&input, ctx.registry.descriptors(), limit))
}

/// GET /suggest - ranked performer and free-text suggestions
pub async fn suggest_terms(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<Vec<suggest::Suggestion>> {
    let ctx = state.snapshot();
    let input = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(DEFAULT_SUGGEST_LIMIT);
    let candidates = ctx
        .performers
        .iter()
        .map(String::as_str)
        .chain(ctx.terms.iter().map(String::as_str));
    Json(suggest::rank_terms(&input, candidates, limit))
}

// ============================================================================
// Engines
// ============================================================================

/// GET /engines - every enabled source descriptor
pub async fn list_engines(State(state): State<AppState>) -> Json<Vec<SourceDescriptor>> {
    let ctx = state.snapshot();
    Json(ctx.registry.descriptors().cloned().collect())
}

/// GET /engines/:name - one source descriptor
pub async fn engine_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SourceDescriptor>> {
    let ctx = state.snapshot();
    match ctx.registry.get(&name) {
        Some(adapter) => Ok(Json(adapter.descriptor().clone())),
        None => Err(Error::NotFound(format!("unknown engine: {}", name))),
    }
}

// ============================================================================
// Service endpoints
// ============================================================================

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "rummage-search",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /status
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let ctx = state.snapshot();
    Json(json!({
        "service": "rummage-search",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "sources": ctx.registry.len(),
        "bangs": ctx.bang_table.len(),
        "anonymized": ctx.transport.is_anonymized(),
    }))
}

/// POST /config/reload - rebuild the registry snapshot from the config store
pub async fn reload_config(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    state.reload()?;
    let ctx = state.snapshot();
    info!(sources = ctx.registry.len(), "configuration reloaded via API");
    Ok(Json(json!({
        "status": "reloaded",
        "sources": ctx.registry.len(),
    })))
}
