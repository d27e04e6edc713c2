//! Shared application state
//!
//! Everything a request reads (adapter registry, bang table, suggestion
//! tables, transport selection) lives in one immutable [`SearchContext`]
//! snapshot. Handlers grab an `Arc` at entry and never observe a mid-request
//! mutation; config reload swaps in a freshly built snapshot.

use crate::adapters::Registry;
use crate::error::{Error, Result};
use crate::query::BangTable;
use crate::suggest::DEFAULT_TERMS;
use crate::transport::Transport;
use rummage_common::config::AppConfig;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::info;

/// One immutable snapshot of everything a request needs.
pub struct SearchContext {
    pub config: AppConfig,
    pub registry: Registry,
    pub bang_table: BangTable,
    pub transport: Transport,
    /// Performer names for `@` suggestions, admin-supplied
    pub performers: Vec<String>,
    /// Free-text suggestion terms: defaults merged with custom terms at load
    pub terms: Vec<String>,
}

impl SearchContext {
    /// Build a snapshot from configuration. Fatal on registry or transport
    /// misconfiguration; never called mid-request.
    pub fn build(config: AppConfig) -> Result<Self> {
        let registry = Registry::build(&config.search.enabled_sources)?;
        let bang_table = BangTable::from_descriptors(registry.descriptors());
        if bang_table.is_empty() {
            return Err(Error::Config("bang table is empty".to_string()));
        }
        let transport = Transport::build(&config.transport)?;

        let mut terms: Vec<String> = DEFAULT_TERMS.iter().map(ToString::to_string).collect();
        for term in &config.suggest.custom_terms {
            let term = term.trim().to_lowercase();
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        }
        let performers = config.suggest.performers.clone();

        info!(
            sources = registry.len(),
            bangs = bang_table.len(),
            anonymized = transport.is_anonymized(),
            "search context built"
        );

        Ok(Self {
            config,
            registry,
            bang_table,
            transport,
            performers,
            terms,
        })
    }
}

/// Cloneable handle shared with every handler.
#[derive(Clone)]
pub struct AppState {
    context: Arc<RwLock<Arc<SearchContext>>>,
    config_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(context: SearchContext, config_path: Option<PathBuf>) -> Self {
        Self {
            context: Arc::new(RwLock::new(Arc::new(context))),
            config_path,
        }
    }

    /// Wrap an already-built context (tests, custom wiring).
    pub fn with_context(context: Arc<SearchContext>) -> Self {
        Self {
            context: Arc::new(RwLock::new(context)),
            config_path: None,
        }
    }

    /// The current snapshot. Cheap; taken once per request.
    pub fn snapshot(&self) -> Arc<SearchContext> {
        self.context
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Rebuild the snapshot from the config store and swap it in.
    ///
    /// A failed rebuild leaves the old snapshot serving; reload is all or
    /// nothing.
    pub fn reload(&self) -> Result<()> {
        let config = AppConfig::load_or_default(self.config_path.as_deref())?;
        let fresh = SearchContext::build(config)?;
        let mut guard = self
            .context
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(fresh);
        info!("configuration reloaded");
        Ok(())
    }
}
