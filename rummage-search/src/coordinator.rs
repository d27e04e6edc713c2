//! Aggregation coordinator
//!
//! Dispatches one short-lived task per selected source, each bound by an
//! independent per-source timeout nested inside the overall request
//! deadline. Tasks share no mutable state; they report through an mpsc sink
//! owned by the coordinator. A source that errors or times out contributes
//! zero results and a failure marker, never aborting its siblings.
//!
//! Streaming events arrive in source-completion order. That order is
//! non-deterministic across runs and is the documented contract; callers
//! needing a deterministic order buffer and sort client-side.

use crate::adapters::AdapterRef;
use crate::error::{Error, Result};
use crate::state::SearchContext;
use rummage_common::events::{SearchEnvelope, SearchEvent, SourceFailure};
use rummage_common::types::query::ParsedQuery;
use rummage_common::types::result::{normalize_url, SearchResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

/// Per-request dispatch options from the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub page: u32,
    /// Explicit engine override from the request, bypassing bang routing
    pub engines: Option<Vec<String>>,
}

/// Resolve the effective source set: engines override, else bang targets
/// intersected with the enabled registry, else every enabled source.
pub fn select_adapters(
    ctx: &SearchContext,
    parsed: &ParsedQuery,
    options: &SearchOptions,
) -> Result<Vec<AdapterRef>> {
    if let Some(engines) = &options.engines {
        let mut selected = Vec::with_capacity(engines.len());
        for name in engines {
            match ctx.registry.get(name) {
                Some(adapter) => selected.push(adapter.clone()),
                None => {
                    return Err(Error::InvalidInput(format!("unknown engine: {}", name)));
                }
            }
        }
        if selected.is_empty() {
            return Err(Error::InvalidInput("engines override is empty".to_string()));
        }
        return Ok(selected);
    }

    if !parsed.targets.is_empty() {
        let selected: Vec<AdapterRef> = parsed
            .targets
            .iter()
            .filter_map(|name| ctx.registry.get(name).cloned())
            .collect();
        if selected.is_empty() {
            return Err(Error::Config(
                "no enabled source matches the requested targets".to_string(),
            ));
        }
        return Ok(selected);
    }

    if ctx.registry.is_empty() {
        return Err(Error::Config("no enabled sources".to_string()));
    }
    Ok(ctx.registry.adapters().to_vec())
}

/// The query text sent outbound: plain words, exact phrases, and performer
/// names. Exclusions are applied to the returned batches instead; the
/// vendors have no common negation syntax.
pub fn effective_query(parsed: &ParsedQuery) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !parsed.cleaned.is_empty() {
        parts.push(&parsed.cleaned);
    }
    for phrase in &parsed.phrases {
        parts.push(phrase);
    }
    for performer in &parsed.performers {
        parts.push(performer);
    }
    parts.join(" ")
}

fn apply_exclusions(results: Vec<SearchResult>, exclusions: &[String]) -> Vec<SearchResult> {
    if exclusions.is_empty() {
        return results;
    }
    results
        .into_iter()
        .filter(|r| {
            let title = r.title.to_lowercase();
            !exclusions
                .iter()
                .any(|word| title.contains(word) || r.tags.iter().any(|t| t == word))
        })
        .collect()
}

/// Spawn one worker per adapter; workers report exactly one event each.
fn spawn_workers(
    ctx: &SearchContext,
    adapters: &[AdapterRef],
    query: &str,
    page: u32,
    exclusions: Arc<Vec<String>>,
) -> mpsc::Receiver<SearchEvent> {
    let (tx, rx) = mpsc::channel(adapters.len().max(1));
    let per_source = Duration::from_millis(ctx.config.search.source_timeout_ms);
    let client = ctx.transport.client().clone();

    for adapter in adapters {
        let adapter = adapter.clone();
        let client = client.clone();
        let query = query.to_string();
        let tx = tx.clone();
        let exclusions = exclusions.clone();

        tokio::spawn(async move {
            let source = adapter.name().to_string();
            let started = Instant::now();
            let outcome = timeout(per_source, adapter.search(&client, &query, page)).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let event = match outcome {
                Ok(Ok(results)) => {
                    let results = apply_exclusions(results, &exclusions);
                    debug!(%source, count = results.len(), elapsed_ms, "source complete");
                    SearchEvent::SourceResults {
                        source,
                        results,
                        elapsed_ms,
                        timestamp: chrono::Utc::now(),
                    }
                }
                Ok(Err(e)) => {
                    warn!(%source, error = %e, "source failed");
                    SearchEvent::SourceFailed {
                        source,
                        reason: e.to_string(),
                        timestamp: chrono::Utc::now(),
                    }
                }
                Err(_) => {
                    warn!(%source, timeout_ms = per_source.as_millis() as u64, "source timed out");
                    SearchEvent::SourceFailed {
                        source,
                        reason: "timed out".to_string(),
                        timestamp: chrono::Utc::now(),
                    }
                }
            };
            // Receiver gone means the request was abandoned; nothing to do
            let _ = tx.send(event).await;
        });
    }

    rx
}

/// Run a buffered search: wait for every source (or the overall deadline)
/// and return one merged envelope.
pub async fn search_buffered(
    ctx: &SearchContext,
    raw_query: &str,
    parsed: &ParsedQuery,
    options: &SearchOptions,
) -> Result<SearchEnvelope> {
    let request_id = Uuid::new_v4();
    let adapters = select_adapters(ctx, parsed, options)?;
    let sources: Vec<String> = adapters.iter().map(|a| a.name().to_string()).collect();
    let query = effective_query(parsed);
    debug!(%request_id, sources = ?sources, %query, "dispatching buffered search");

    let started = Instant::now();
    let deadline = started + Duration::from_millis(ctx.config.search.request_deadline_ms);
    let exclusions = Arc::new(parsed.exclusions.clone());
    let mut rx = spawn_workers(ctx, &adapters, &query, options.page, exclusions);

    let mut pending: HashSet<String> = sources.iter().cloned().collect();
    let mut results: Vec<SearchResult> = Vec::new();
    let mut failed: Vec<SourceFailure> = Vec::new();

    while !pending.is_empty() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, rx.recv()).await {
            Ok(Some(SearchEvent::SourceResults {
                source,
                results: batch,
                ..
            })) => {
                pending.remove(&source);
                results.extend(batch);
            }
            Ok(Some(SearchEvent::SourceFailed { source, reason, .. })) => {
                pending.remove(&source);
                failed.push(SourceFailure { source, reason });
            }
            // Workers never emit Done
            Ok(Some(SearchEvent::Done { .. })) => {}
            Ok(None) => break,
            Err(_) => {
                // Overall deadline: finalize with whatever arrived
                for source in pending.drain() {
                    failed.push(SourceFailure {
                        source,
                        reason: "request deadline exceeded".to_string(),
                    });
                }
                break;
            }
        }
    }

    if ctx.config.search.dedup {
        results = dedup_by_url(results);
    }

    Ok(SearchEnvelope {
        query: raw_query.to_string(),
        cleaned_query: parsed.cleaned.clone(),
        sources,
        results,
        failed,
        elapsed_ms: started.elapsed().as_millis() as u64,
        bang_used: parsed.has_bang,
        invalid_bang: parsed.invalid_bang.clone(),
    })
}

/// Run a streaming search: the returned receiver yields one event per
/// completed source in completion order, then a terminal `Done` summary.
pub fn search_streaming(
    ctx: &SearchContext,
    parsed: &ParsedQuery,
    options: &SearchOptions,
) -> Result<mpsc::Receiver<SearchEvent>> {
    let request_id = Uuid::new_v4();
    let adapters = select_adapters(ctx, parsed, options)?;
    let sources: Vec<String> = adapters.iter().map(|a| a.name().to_string()).collect();
    let query = effective_query(parsed);
    debug!(%request_id, sources = ?sources, %query, "dispatching streaming search");

    let started = Instant::now();
    let deadline = started + Duration::from_millis(ctx.config.search.request_deadline_ms);
    let exclusions = Arc::new(parsed.exclusions.clone());
    let mut worker_rx = spawn_workers(ctx, &adapters, &query, options.page, exclusions);

    let dedup = ctx.config.search.dedup;
    let invalid_bang = parsed.invalid_bang.clone();
    let (tx, rx) = mpsc::channel(sources.len() + 1);

    tokio::spawn(async move {
        let mut pending: HashSet<String> = sources.iter().cloned().collect();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut total_results = 0usize;
        let mut sources_failed = 0usize;

        while !pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let event = match timeout(remaining, worker_rx.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(_) => {
                    for source in pending.drain() {
                        sources_failed += 1;
                        let expired = SearchEvent::SourceFailed {
                            source,
                            reason: "request deadline exceeded".to_string(),
                            timestamp: chrono::Utc::now(),
                        };
                        if tx.send(expired).await.is_err() {
                            return;
                        }
                    }
                    break;
                }
            };

            let event = match event {
                SearchEvent::SourceResults {
                    source,
                    results,
                    elapsed_ms,
                    timestamp,
                } => {
                    pending.remove(&source);
                    let results = if dedup {
                        results
                            .into_iter()
                            .filter(|r| seen_urls.insert(normalize_url(&r.url)))
                            .collect()
                    } else {
                        results
                    };
                    total_results += results.len();
                    SearchEvent::SourceResults {
                        source,
                        results,
                        elapsed_ms,
                        timestamp,
                    }
                }
                SearchEvent::SourceFailed {
                    source,
                    reason,
                    timestamp,
                } => {
                    pending.remove(&source);
                    sources_failed += 1;
                    SearchEvent::SourceFailed {
                        source,
                        reason,
                        timestamp,
                    }
                }
                done @ SearchEvent::Done { .. } => done,
            };

            if tx.send(event).await.is_err() {
                // Client went away; workers finish into a closed channel
                return;
            }
        }

        let _ = tx
            .send(SearchEvent::Done {
                sources_searched: sources.len(),
                sources_failed,
                total_results,
                elapsed_ms: started.elapsed().as_millis() as u64,
                invalid_bang,
                timestamp: chrono::Utc::now(),
            })
            .await;
    });

    Ok(rx)
}

fn dedup_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(normalize_url(&r.url)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{AdapterRef, Registry, SourceAdapter, SourceError};
    use crate::query::BangTable;
    use crate::transport::Transport;
    use async_trait::async_trait;
    use rummage_common::config::AppConfig;
    use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};

    struct MockAdapter {
        descriptor: SourceDescriptor,
        delay: Duration,
        fail: bool,
        urls: Vec<String>,
    }

    impl MockAdapter {
        fn new(name: &str, delay_ms: u64, fail: bool, urls: &[&str]) -> AdapterRef {
            Arc::new(Self {
                descriptor: SourceDescriptor {
                    name: name.into(),
                    display_name: name.to_uppercase(),
                    base_url: format!("https://{}.test", name),
                    tier: 1,
                    capabilities: Capabilities::default(),
                    method: ExtractionMethod::Api,
                    aliases: vec![name.into()],
                },
                delay: Duration::from_millis(delay_ms),
                fail,
                urls: urls.iter().map(ToString::to_string).collect(),
            })
        }
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn descriptor(&self) -> &SourceDescriptor {
            &self.descriptor
        }

        async fn search(
            &self,
            _client: &reqwest::Client,
            query: &str,
            _page: u32,
        ) -> std::result::Result<Vec<SearchResult>, SourceError> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(SourceError::Network("connection refused".into()));
            }
            Ok(self
                .urls
                .iter()
                .filter_map(|url| {
                    SearchResult::new(
                        &format!("{} for {}", self.descriptor.name, query),
                        url,
                        &self.descriptor.name,
                        &self.descriptor.display_name,
                    )
                })
                .collect())
        }
    }

    fn context(adapters: Vec<AdapterRef>, source_timeout_ms: u64, dedup: bool) -> SearchContext {
        let mut config = AppConfig::default();
        config.search.source_timeout_ms = source_timeout_ms;
        config.search.request_deadline_ms = source_timeout_ms.max(1) * 10;
        config.search.dedup = dedup;
        let registry = Registry::from_adapters(adapters);
        let bang_table = BangTable::from_descriptors(registry.descriptors());
        SearchContext {
            config,
            registry,
            bang_table,
            transport: Transport::build(&Default::default()).unwrap(),
            performers: Vec::new(),
            terms: Vec::new(),
        }
    }

    fn parsed(cleaned: &str) -> ParsedQuery {
        ParsedQuery {
            cleaned: cleaned.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_bulkhead_one_slow_source() {
        let ctx = context(
            vec![
                MockAdapter::new("fast1", 5, false, &["https://fast1.test/a"]),
                MockAdapter::new("fast2", 5, false, &["https://fast2.test/b"]),
                MockAdapter::new("slow", 5000, false, &["https://slow.test/c"]),
            ],
            100,
            false,
        );

        let started = Instant::now();
        let envelope = search_buffered(&ctx, "cats", &parsed("cats"), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(envelope.results.len(), 2);
        assert_eq!(envelope.failed.len(), 1);
        assert_eq!(envelope.failed[0].source, "slow");
        assert_eq!(envelope.failed[0].reason, "timed out");
        // Returned well inside the overall deadline (1s here)
        assert!(started.elapsed() < Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_failing_source_never_fails_aggregate() {
        let ctx = context(
            vec![
                MockAdapter::new("ok", 5, false, &["https://ok.test/a"]),
                MockAdapter::new("broken", 5, true, &[]),
            ],
            100,
            false,
        );

        let envelope = search_buffered(&ctx, "q", &parsed("q"), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(envelope.results.len(), 1);
        assert_eq!(envelope.failed.len(), 1);
        assert!(envelope.failed[0].reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_returns_envelope() {
        let ctx = context(
            vec![
                MockAdapter::new("a", 5, true, &[]),
                MockAdapter::new("b", 5, true, &[]),
            ],
            100,
            false,
        );
        let envelope = search_buffered(&ctx, "q", &parsed("q"), &SearchOptions::default())
            .await
            .unwrap();
        assert!(envelope.results.is_empty());
        assert_eq!(envelope.failed.len(), 2);
    }

    #[tokio::test]
    async fn test_dedup_only_in_meta_mode() {
        let adapters = || {
            vec![
                MockAdapter::new("a", 5, false, &["https://shared.test/same"]),
                MockAdapter::new("b", 10, false, &["https://shared.test/same"]),
            ]
        };

        let ctx = context(adapters(), 100, false);
        let envelope = search_buffered(&ctx, "q", &parsed("q"), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(envelope.results.len(), 2);

        let ctx = context(adapters(), 100, true);
        let envelope = search_buffered(&ctx, "q", &parsed("q"), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(envelope.results.len(), 1);
    }

    #[tokio::test]
    async fn test_targets_select_subset() {
        let ctx = context(
            vec![
                MockAdapter::new("a", 5, false, &["https://a.test/1"]),
                MockAdapter::new("b", 5, false, &["https://b.test/1"]),
            ],
            100,
            false,
        );
        let mut query = parsed("q");
        query.targets = vec!["b".to_string()];
        let envelope = search_buffered(&ctx, "q", &query, &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(envelope.sources, vec!["b"]);
        assert_eq!(envelope.results.len(), 1);
        assert_eq!(envelope.results[0].source, "b");
    }

    #[tokio::test]
    async fn test_unknown_engine_override_is_invalid_input() {
        let ctx = context(vec![MockAdapter::new("a", 5, false, &[])], 100, false);
        let options = SearchOptions {
            page: 1,
            engines: Some(vec!["nope".to_string()]),
        };
        let err = search_buffered(&ctx, "q", &parsed("q"), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_targets_disabled_is_config_error() {
        let ctx = context(vec![MockAdapter::new("a", 5, false, &[])], 100, false);
        let mut query = parsed("q");
        query.targets = vec!["disabled-source".to_string()];
        let err = search_buffered(&ctx, "q", &query, &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_streaming_completion_order_and_done() {
        let ctx = context(
            vec![
                MockAdapter::new("slowish", 80, false, &["https://slowish.test/1"]),
                MockAdapter::new("quick", 5, false, &["https://quick.test/1"]),
            ],
            500,
            false,
        );

        let mut rx = search_streaming(&ctx, &parsed("q"), &SearchOptions::default()).unwrap();

        let first = rx.recv().await.unwrap();
        match first {
            SearchEvent::SourceResults { ref source, .. } => assert_eq!(source, "quick"),
            other => panic!("unexpected first event: {:?}", other),
        }

        let second = rx.recv().await.unwrap();
        match second {
            SearchEvent::SourceResults { ref source, .. } => assert_eq!(source, "slowish"),
            other => panic!("unexpected second event: {:?}", other),
        }

        let last = rx.recv().await.unwrap();
        match last {
            SearchEvent::Done {
                sources_searched,
                sources_failed,
                total_results,
                ..
            } => {
                assert_eq!(sources_searched, 2);
                assert_eq!(sources_failed, 0);
                assert_eq!(total_results, 2);
            }
            other => panic!("unexpected terminal event: {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_exclusions_filter_batches() {
        let ctx = context(
            vec![MockAdapter::new("a", 5, false, &["https://a.test/dogs"])],
            100,
            false,
        );
        let mut query = parsed("q");
        query.exclusions = vec!["a for q".to_string()];
        // Title is "a for q", so the exclusion drops the only result
        let envelope = search_buffered(&ctx, "q", &query, &SearchOptions::default())
            .await
            .unwrap();
        assert!(envelope.results.is_empty());
        assert!(envelope.failed.is_empty());
    }

    #[test]
    fn test_effective_query_composition() {
        let query = ParsedQuery {
            cleaned: "cats".into(),
            phrases: vec!["big cat".into()],
            performers: vec!["jane".into()],
            exclusions: vec!["dog".into()],
            ..Default::default()
        };
        assert_eq!(effective_query(&query), "cats big cat jane");
    }
}
