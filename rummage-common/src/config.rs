//! Configuration loading and config file resolution
//!
//! Resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. `rummage.toml` in the working directory (fallback)
//!
//! Missing file means compiled defaults; a present but malformed file is a
//! fatal configuration error, never a silent fallback.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default per-source search timeout (milliseconds)
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 8_000;
/// Default overall request deadline (milliseconds)
pub const DEFAULT_REQUEST_DEADLINE_MS: u64 = 20_000;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_source_timeout_ms() -> u64 {
    DEFAULT_SOURCE_TIMEOUT_MS
}

fn default_request_deadline_ms() -> u64 {
    DEFAULT_REQUEST_DEADLINE_MS
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Search dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Independent timeout for each source task
    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,
    /// Overall request deadline; per-source timeouts nest inside it
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,
    /// Enabled source names. Empty means every registered source.
    #[serde(default)]
    pub enabled_sources: Vec<String>,
    /// Cross-source URL deduplication (meta-search mode)
    #[serde(default)]
    pub dedup: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            source_timeout_ms: default_source_timeout_ms(),
            request_deadline_ms: default_request_deadline_ms(),
            enabled_sources: Vec::new(),
            dedup: false,
        }
    }
}

/// Outbound transport settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportConfig {
    /// SOCKS5 proxy for the anonymized route, e.g. `socks5h://127.0.0.1:9050`
    #[serde(default)]
    pub socks_proxy: Option<String>,
    /// Route all outbound source traffic through the anonymized client
    #[serde(default)]
    pub anonymize: bool,
}

/// Static suggestion tables merged at load, never mutated by requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Admin-supplied free-text suggestion terms
    #[serde(default)]
    pub custom_terms: Vec<String>,
    /// Known performer names for `@` filters and suggestions
    #[serde(default)]
    pub performers: Vec<String>,
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("malformed {}: {}", path.display(), e)))?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the resolved path, or compiled defaults when no file exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.search.source_timeout_ms == 0 {
            return Err(Error::Config("source_timeout_ms must be > 0".into()));
        }
        if self.search.request_deadline_ms < self.search.source_timeout_ms {
            return Err(Error::Config(
                "request_deadline_ms must be >= source_timeout_ms".into(),
            ));
        }
        if self.transport.anonymize && self.transport.socks_proxy.is_none() {
            return Err(Error::Config(
                "transport.anonymize requires transport.socks_proxy".into(),
            ));
        }
        Ok(())
    }
}

/// Resolve the config file path following the priority order above.
/// Returns `None` when no candidate exists (compiled defaults apply).
pub fn resolve_config_path(cli_arg: Option<&str>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: command-line argument
    if let Some(path) = cli_arg {
        return Some(PathBuf::from(path));
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: rummage.toml in the working directory
    let cwd_config = PathBuf::from("rummage.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}
