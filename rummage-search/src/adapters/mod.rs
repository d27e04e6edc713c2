//! Source adapters: one fetch+parse unit per external content source
//!
//! Every adapter maps its vendor's response shape into the common
//! [`SearchResult`] schema behind one trait. Extraction strategy varies by
//! tier: tier 1 maps a vendor JSON API directly, tier 2 carves a JSON object
//! out of an HTML document, tier 3+ scrapes the DOM through the generic
//! extraction fallback. An adapter performs exactly one outbound HTTP call
//! per search, through the client handed to it by the coordinator.

pub mod json_embed;

mod eporner;
mod pornhub;
mod redtube;
mod spankbang;
mod xhamster;
mod xvideos;

pub use eporner::Eporner;
pub use pornhub::Pornhub;
pub use redtube::Redtube;
pub use spankbang::Spankbang;
pub use xhamster::Xhamster;
pub use xvideos::Xvideos;

use async_trait::async_trait;
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Feature, SourceDescriptor};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Unrecoverable per-source fetch failures.
///
/// A malformed individual item is never an error; adapters skip those
/// silently and the skip is only visible as a reduced result count.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {0}")]
    Http(u16),

    #[error("undecodable payload: {0}")]
    Decode(String),

    #[error("timed out")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Http(status.as_u16())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// One external content source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Static identity and capability declaration.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Run one search. Exactly one outbound HTTP call, via `client`.
    ///
    /// The caller wraps this future in its per-source timeout; the reqwest
    /// call suspends cooperatively so cancellation takes effect promptly.
    async fn search(
        &self,
        client: &reqwest::Client,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, SourceError>;

    fn supports(&self, feature: Feature) -> bool {
        self.descriptor().supports(feature)
    }

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

pub type AdapterRef = Arc<dyn SourceAdapter>;

/// All compiled-in adapters, tier order.
pub fn all_adapters() -> Vec<AdapterRef> {
    vec![
        Arc::new(Pornhub::new()),
        Arc::new(Redtube::new()),
        Arc::new(Eporner::new()),
        Arc::new(Xhamster::new()),
        Arc::new(Xvideos::new()),
        Arc::new(Spankbang::new()),
    ]
}

/// Immutable adapter registry, built once at startup/config reload.
#[derive(Clone)]
pub struct Registry {
    adapters: Vec<AdapterRef>,
}

impl Registry {
    /// Build from the enabled-source list; empty means every adapter.
    ///
    /// An enabled name that matches no adapter, or a selection that leaves
    /// the registry empty, is a fatal configuration error.
    pub fn build(enabled: &[String]) -> Result<Self, rummage_common::Error> {
        let adapters = all_adapters();

        if enabled.is_empty() {
            return Ok(Self { adapters });
        }

        let known: HashSet<&str> = adapters.iter().map(|a| a.name()).collect();
        for name in enabled {
            if !known.contains(name.as_str()) {
                return Err(rummage_common::Error::Config(format!(
                    "unknown source in enabled_sources: {}",
                    name
                )));
            }
        }

        let selected: Vec<AdapterRef> = adapters
            .into_iter()
            .filter(|a| enabled.iter().any(|n| n == a.name()))
            .collect();
        if selected.is_empty() {
            return Err(rummage_common::Error::Config(
                "no enabled sources".to_string(),
            ));
        }
        Ok(Self { adapters: selected })
    }

    /// Build directly from adapter instances (tests, custom wiring).
    pub fn from_adapters(adapters: Vec<AdapterRef>) -> Self {
        Self { adapters }
    }

    pub fn get(&self, name: &str) -> Option<&AdapterRef> {
        self.adapters.iter().find(|a| a.name() == name)
    }

    pub fn adapters(&self) -> &[AdapterRef] {
        &self.adapters
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.adapters.iter().map(|a| a.descriptor())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
