//! xHamster adapter (tier 2, JSON embedded in HTML)
//!
//! The search page ships its state as `window.initials = {...}` inside a
//! script tag. The object is carved out by brace counting (robust against
//! the malformed tail of the document) and navigated defensively: the
//! vendor renames nesting levels often enough that every lookup is optional
//! and a malformed item is just skipped.

use super::json_embed::embedded_json_value;
use super::{SourceAdapter, SourceError};
use async_trait::async_trait;
use rummage_common::format::{format_duration, format_views, parse_duration_text};
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};
use serde_json::Value;
use tracing::debug;

const MARKER: &str = "window.initials";

/// Known nesting paths to the thumb list, newest layout first.
const ITEM_PATHS: &[&[&str]] = &[
    &["searchResult", "videoThumbProps"],
    &["videoListProps", "videoThumbProps"],
    &["trendingVideoListProps", "videoThumbProps"],
];

pub struct Xhamster {
    descriptor: SourceDescriptor,
}

impl Xhamster {
    pub fn new() -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: "xhamster".into(),
                display_name: "xHamster".into(),
                base_url: "https://xhamster.com".into(),
                tier: 2,
                capabilities: Capabilities {
                    duration: true,
                    views: true,
                    ..Default::default()
                },
                method: ExtractionMethod::EmbeddedJson,
                aliases: vec!["xhamster".into(), "xh".into(), "xham".into()],
            },
        }
    }

    fn items<'a>(initials: &'a Value) -> Option<&'a Vec<Value>> {
        for path in ITEM_PATHS {
            let mut cursor = initials;
            let mut found = true;
            for key in *path {
                match cursor.get(key) {
                    Some(next) => cursor = next,
                    None => {
                        found = false;
                        break;
                    }
                }
            }
            if found {
                if let Some(array) = cursor.as_array() {
                    return Some(array);
                }
            }
        }
        None
    }

    fn map_item(&self, item: &Value) -> Option<SearchResult> {
        let title = item.get("title").and_then(Value::as_str).unwrap_or("");
        let url = item.get("pageURL").and_then(Value::as_str).unwrap_or("");
        let mut result = SearchResult::new(
            title,
            url,
            &self.descriptor.name,
            &self.descriptor.display_name,
        )?;

        if let Some(thumb) = item.get("imageURL").and_then(Value::as_str) {
            result.thumbnail = thumb.to_string();
        }
        result.preview_url = item
            .get("previewVideoURL")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        // Duration arrives as seconds or as display text depending on layout
        let seconds = match item.get("duration") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => parse_duration_text(s),
            _ => None,
        };
        if let Some(seconds) = seconds {
            result.duration = Some(format_duration(seconds));
            result.duration_seconds = Some(seconds);
        }

        if let Some(count) = item.get("views").and_then(Value::as_u64) {
            result.views = Some(format_views(count));
            result.views_count = Some(count);
        }
        Some(result)
    }

    fn parse_page(&self, html: &str) -> Result<Vec<SearchResult>, SourceError> {
        let initials = embedded_json_value(html, MARKER)
            .ok_or_else(|| SourceError::Decode("window.initials not found".to_string()))?;
        let items = match Self::items(&initials) {
            Some(items) => items,
            None => return Ok(Vec::new()),
        };
        Ok(items.iter().filter_map(|i| self.map_item(i)).collect())
    }
}

impl Default for Xhamster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for Xhamster {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn search(
        &self,
        client: &reqwest::Client,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, SourceError> {
        let url = format!(
            "{}/search/{}",
            self.descriptor.base_url,
            urlencode(query)
        );
        let response = client
            .get(&url)
            .query(&[("page", page.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let results = self.parse_page(&html)?;
        debug!(source = "xhamster", count = results.len(), "search complete");
        Ok(results)
    }
}

/// Minimal path-segment encoding for the search term
fn urlencode(query: &str) -> String {
    query
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("+")
}
