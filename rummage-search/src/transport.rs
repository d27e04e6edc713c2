//! Outbound transport provider
//!
//! Adapters never build their own HTTP client; the coordinator hands them one
//! from here. Two routes exist: a direct client, and an optional anonymized
//! client going through a SOCKS5 proxy (e.g. a local onion-router endpoint).
//! Which one a request uses is a config decision, not an adapter decision.

use crate::error::{Error, Result};
use rummage_common::config::TransportConfig;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
/// Client-level timeout; a hard upper bound behind the per-source timeout
const CLIENT_TIMEOUT_SECS: u64 = 30;

/// Direct + optionally anonymized reqwest clients, built once at startup
/// or config reload.
#[derive(Debug, Clone)]
pub struct Transport {
    direct: reqwest::Client,
    anonymized: Option<reqwest::Client>,
    prefer_anonymized: bool,
}

impl Transport {
    pub fn build(config: &TransportConfig) -> Result<Self> {
        let direct = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let anonymized = match &config.socks_proxy {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("invalid socks_proxy: {}", e)))?;
                let client = reqwest::Client::builder()
                    .user_agent(USER_AGENT)
                    .timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS))
                    .proxy(proxy)
                    .build()
                    .map_err(|e| {
                        Error::Config(format!("failed to build anonymized client: {}", e))
                    })?;
                info!("Anonymized transport configured via {}", proxy_url);
                Some(client)
            }
            None => None,
        };

        Ok(Self {
            direct,
            anonymized,
            prefer_anonymized: config.anonymize,
        })
    }

    /// The client adapters should use for outbound source traffic.
    pub fn client(&self) -> &reqwest::Client {
        match (&self.anonymized, self.prefer_anonymized) {
            (Some(client), true) => client,
            _ => &self.direct,
        }
    }

    /// Whether anonymized routing is currently active.
    pub fn is_anonymized(&self) -> bool {
        self.prefer_anonymized && self.anonymized.is_some()
    }
}
