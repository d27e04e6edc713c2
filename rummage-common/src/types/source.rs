//! Source descriptors and capability flags

use serde::{Deserialize, Serialize};

/// Optional result fields a source may guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Preview,
    Download,
    Duration,
    Views,
    Rating,
    Quality,
    UploadDate,
}

/// How an adapter obtains its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Tier 1: vendor JSON/HTTP API mapped directly
    Api,
    /// Tier 2: JSON object embedded in an HTML document
    EmbeddedJson,
    /// Tier 3+: DOM scraping via the generic extraction fallback
    Dom,
}

/// Capability flags declared by an adapter.
///
/// A flag may only be true if the adapter can reliably populate that field;
/// a false negative is acceptable, a false positive is a misconfiguration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub download: bool,
    #[serde(default)]
    pub duration: bool,
    #[serde(default)]
    pub views: bool,
    #[serde(default)]
    pub rating: bool,
    #[serde(default)]
    pub quality: bool,
    #[serde(default)]
    pub upload_date: bool,
}

/// Static identity and capability declaration for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Internal registry key, e.g. `"pornhub"`
    pub name: String,
    /// Human-facing name, e.g. `"Pornhub"`
    pub display_name: String,
    pub base_url: String,
    /// Priority/ordering hint; tier 1 = vendor API, 2 = embedded JSON, 3+ = DOM
    pub tier: u8,
    pub capabilities: Capabilities,
    pub method: ExtractionMethod,
    /// Bang aliases routing to this source. Never empty; the shortest entry
    /// is the canonical short code exposed in suggestion payloads.
    pub aliases: Vec<String>,
}

impl SourceDescriptor {
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Preview => self.capabilities.preview,
            Feature::Download => self.capabilities.download,
            Feature::Duration => self.capabilities.duration,
            Feature::Views => self.capabilities.views,
            Feature::Rating => self.capabilities.rating,
            Feature::Quality => self.capabilities.quality,
            Feature::UploadDate => self.capabilities.upload_date,
        }
    }

    /// Canonical short code: the shortest alias, ties broken by table order.
    pub fn canonical_alias(&self) -> &str {
        self.aliases
            .iter()
            .min_by_key(|a| a.len())
            .map(String::as_str)
            .unwrap_or(&self.name)
    }
}
