//! API integration tests
//!
//! Drives the full axum router with tower's oneshot, using mock adapters so
//! no network traffic leaves the test.

use async_trait::async_trait;
use axum::body::Body;
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use rummage_common::config::AppConfig;
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};
use rummage_search::adapters::{AdapterRef, Registry, SourceAdapter, SourceError};
use rummage_search::api::server::build_router;
use rummage_search::query::BangTable;
use rummage_search::state::{AppState, SearchContext};
use rummage_search::transport::Transport;
use std::sync::Arc;
use tower::ServiceExt;

struct MockAdapter {
    descriptor: SourceDescriptor,
    fail: bool,
}

impl MockAdapter {
    fn new(name: &str, aliases: &[&str], fail: bool) -> AdapterRef {
        Arc::new(Self {
            descriptor: SourceDescriptor {
                name: name.into(),
                display_name: name.to_uppercase(),
                base_url: format!("https://{}.test", name),
                tier: 1,
                capabilities: Capabilities {
                    duration: true,
                    ..Default::default()
                },
                method: ExtractionMethod::Api,
                aliases: aliases.iter().map(ToString::to_string).collect(),
            },
            fail,
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
        page: u32,
    ) -> Result<Vec<SearchResult>, SourceError> {
        if self.fail {
            return Err(SourceError::Http(503));
        }
        let url = format!(
            "https://{}.test/v/{}-{}",
            self.descriptor.name,
            query.replace(' ', "-"),
            page
        );
        Ok(SearchResult::new(
            &format!("{}: {}", self.descriptor.display_name, query),
            &url,
            &self.descriptor.name,
            &self.descriptor.display_name,
        )
        .into_iter()
        .collect())
    }
}

fn test_state() -> AppState {
    let mut config = AppConfig::default();
    config.search.source_timeout_ms = 500;
    config.search.request_deadline_ms = 2000;

    let registry = Registry::from_adapters(vec![
        MockAdapter::new("alpha", &["alpha", "al"], false),
        MockAdapter::new("beta", &["beta", "bt"], false),
        MockAdapter::new("broken", &["broken", "br"], true),
    ]);
    let bang_table = BangTable::from_descriptors(registry.descriptors());
    let context = SearchContext {
        config,
        registry,
        bang_table,
        transport: Transport::build(&Default::default()).unwrap(),
        performers: vec!["jane doe".into(), "joan dark".into()],
        terms: vec!["cats".into(), "catamaran".into()],
    };
    AppState::with_context(Arc::new(context))
}

async fn get(path: &str, accept: Option<&str>) -> (StatusCode, Vec<u8>) {
    let app = build_router(test_state());
    let mut builder = Request::builder().uri(path);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ok");
}

#[tokio::test]
async fn test_search_requires_query() {
    let (status, body) = get("/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("q"));

    let (status, _) = get("/search?q=%20%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_bad_page() {
    let (status, _) = get("/search?q=cats&page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_buffered_json_envelope() {
    let (status, body) = get("/search?q=cats", None).await;
    assert_eq!(status, StatusCode::OK);
    let envelope = json(&body);
    assert_eq!(envelope["query"], "cats");
    assert_eq!(envelope["cleaned_query"], "cats");
    // All three sources dispatched; the broken one lands in `failed`
    assert_eq!(envelope["sources"].as_array().unwrap().len(), 3);
    assert_eq!(envelope["results"].as_array().unwrap().len(), 2);
    assert_eq!(envelope["failed"].as_array().unwrap().len(), 1);
    assert_eq!(envelope["failed"][0]["source"], "broken");
    assert_eq!(envelope["bang_used"], false);
}

#[tokio::test]
async fn test_search_bang_routing() {
    let (status, body) = get("/search?q=!al+cats", None).await;
    assert_eq!(status, StatusCode::OK);
    let envelope = json(&body);
    assert_eq!(envelope["sources"].as_array().unwrap().len(), 1);
    assert_eq!(envelope["sources"][0], "alpha");
    assert_eq!(envelope["bang_used"], true);
    assert_eq!(envelope["cleaned_query"], "cats");
}

#[tokio::test]
async fn test_search_invalid_bang_is_metadata_not_failure() {
    let (status, body) = get("/search?q=!nope+cats", None).await;
    assert_eq!(status, StatusCode::OK);
    let envelope = json(&body);
    assert_eq!(envelope["invalid_bang"], "!nope");
    // Unknown bang falls back to all enabled sources
    assert_eq!(envelope["sources"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_search_engines_override() {
    let (status, body) = get("/search?q=cats&engines=beta", None).await;
    assert_eq!(status, StatusCode::OK);
    let envelope = json(&body);
    assert_eq!(envelope["sources"].as_array().unwrap().len(), 1);
    assert_eq!(envelope["sources"][0], "beta");

    let (status, _) = get("/search?q=cats&engines=nonsense", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_plain_text_listing() {
    let (status, body) = get("/search?q=cats&engines=alpha", Some("text/plain")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("[alpha] ALPHA: cats"));
    assert!(text.contains("1 results from 1 sources"));
}

#[tokio::test]
async fn test_search_sse_stream() {
    let (status, body) = get("/search?q=cats", Some("text/event-stream")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("event: result"));
    assert!(text.contains("event: done"));
    // Terminal summary counts the failing source
    assert!(text.contains("\"sources_failed\":1"));
}

#[tokio::test]
async fn test_bang_listing_and_suggest() {
    let (status, body) = get("/bangs", None).await;
    assert_eq!(status, StatusCode::OK);
    let bangs = json(&body);
    let listed: Vec<&str> = bangs
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["bang"].as_str().unwrap())
        .collect();
    assert!(listed.contains(&"!al"));
    assert!(listed.contains(&"!beta"));

    // Empty prefix yields an empty list, never the whole table
    let (status, body) = get("/bangs/suggest?q=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json(&body).as_array().unwrap().is_empty());

    let (status, body) = get("/bangs/suggest?q=al", None).await;
    assert_eq!(status, StatusCode::OK);
    let ranked = json(&body);
    assert_eq!(ranked[0]["value"], "alpha");
    assert_eq!(ranked[0]["short"], "al");
}

#[tokio::test]
async fn test_term_suggest_minimum_length() {
    let (status, body) = get("/suggest?q=c", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json(&body).as_array().unwrap().is_empty());

    let (status, body) = get("/suggest?q=cat", None).await;
    assert_eq!(status, StatusCode::OK);
    let ranked = json(&body);
    // Shorter exact-prefix candidate first
    assert_eq!(ranked[0]["value"], "cats");
    assert_eq!(ranked[1]["value"], "catamaran");
}

#[tokio::test]
async fn test_engine_listing_and_detail() {
    let (status, body) = get("/engines", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().unwrap().len(), 3);

    let (status, body) = get("/engines/alpha", None).await;
    assert_eq!(status, StatusCode::OK);
    let descriptor = json(&body);
    assert_eq!(descriptor["name"], "alpha");
    assert_eq!(descriptor["tier"], 1);

    let (status, _) = get("/engines/nonsense", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
