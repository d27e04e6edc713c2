//! Normalized search result schema
//!
//! Every source adapter maps its vendor-specific payload into [`SearchResult`].
//! Optional fields stay `None` when a source cannot reliably populate them;
//! the corresponding capability flag on the source descriptor must agree.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One normalized result item from any source.
///
/// Invariant: `title` and `url` are non-empty. Candidates that cannot satisfy
/// this are discarded by the adapter before a `SearchResult` is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Stable identifier: hash of normalized URL + source name.
    /// Deterministic across repeated identical searches.
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Display duration, canonical `H:MM:SS` or `M:SS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    /// Display view count, e.g. `"1.2M"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views_count: Option<u64>,
    /// Rating as a percentage (0.0 - 100.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Quality label, e.g. `"1080p"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Deduplicated, lowercased tags (2-49 chars each)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    /// Internal source name (registry key)
    pub source: String,
    /// Human-facing source name
    pub source_display: String,
}

impl SearchResult {
    /// Build a result, enforcing the non-empty title/url invariant.
    ///
    /// Returns `None` for candidates that must be discarded.
    pub fn new(title: &str, url: &str, source: &str, source_display: &str) -> Option<Self> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            id: result_id(url, source),
            title: title.to_string(),
            url: url.to_string(),
            thumbnail: String::new(),
            preview_url: None,
            download_url: None,
            duration: None,
            duration_seconds: None,
            views: None,
            views_count: None,
            rating: None,
            quality: None,
            tags: Vec::new(),
            performer: None,
            source: source.to_string(),
            source_display: source_display.to_string(),
        })
    }
}

/// Normalize a URL for identity purposes: trim whitespace, drop the fragment,
/// lowercase the scheme and host. Path and query are left untouched because
/// several vendors treat them case-sensitively.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = match url.split_once('#') {
        Some((before, _fragment)) => before,
        None => url,
    };

    // Lowercase everything up to the end of the authority component.
    let authority_end = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(i) => scheme_end + 3 + i,
                None => url.len(),
            }
        }
        None => 0,
    };

    let (head, tail) = url.split_at(authority_end);
    format!("{}{}", head.to_ascii_lowercase(), tail)
}

/// Stable result identifier: SHA-256 of normalized URL + source name,
/// truncated to 16 hex characters.
pub fn result_id(url: &str, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_url(url).as_bytes());
    hasher.update(b"\x00");
    hasher.update(source.as_bytes());
    let digest = hasher.finalize();
    let mut id = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        id.push_str(&format!("{:02x}", byte));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_lowercases_host_only() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM/Watch?V=AbC"),
            "https://example.com/Watch?V=AbC"
        );
    }

    #[test]
    fn test_normalize_url_drops_fragment() {
        assert_eq!(
            normalize_url("https://example.com/video#t=12"),
            "https://example.com/video"
        );
    }

    #[test]
    fn test_result_id_deterministic() {
        let a = result_id("https://example.com/v/1", "pornhub");
        let b = result_id("https://EXAMPLE.com/v/1#frag", "pornhub");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_result_id_varies_by_source() {
        let a = result_id("https://example.com/v/1", "pornhub");
        let b = result_id("https://example.com/v/1", "redtube");
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_discards_empty_title_or_url() {
        assert!(SearchResult::new("", "https://x.test/1", "s", "S").is_none());
        assert!(SearchResult::new("Title", "  ", "s", "S").is_none());
        assert!(SearchResult::new("Title", "https://x.test/1", "s", "S").is_some());
    }
}
