//! SpankBang adapter (tier 3, DOM scraping via the generic extraction fallback)

use super::{SourceAdapter, SourceError};
use crate::extract::Extractor;
use async_trait::async_trait;
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

const CONTAINER_SELECTORS: &[&str] = &["div.video-item", "div.js-video-item"];

pub struct Spankbang {
    descriptor: SourceDescriptor,
    extractor: Extractor,
    containers: Vec<Selector>,
}

impl Spankbang {
    pub fn new() -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: "spankbang".into(),
                display_name: "SpankBang".into(),
                base_url: "https://spankbang.com".into(),
                tier: 3,
                capabilities: Capabilities {
                    duration: true,
                    quality: true,
                    ..Default::default()
                },
                method: ExtractionMethod::Dom,
                aliases: vec!["spankbang".into(), "sb".into()],
            },
            extractor: Extractor::new(),
            containers: CONTAINER_SELECTORS
                .iter()
                .map(|s| Selector::parse(s).expect("static selector"))
                .collect(),
        }
    }

    fn parse_page(&self, html: &str) -> Result<Vec<SearchResult>, SourceError> {
        let base = Url::parse(&self.descriptor.base_url)
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let quality_sel = Selector::parse("span.l, span.hd").expect("static selector");
        let doc = Html::parse_document(html);
        for selector in &self.containers {
            let results: Vec<SearchResult> = doc
                .select(selector)
                .filter_map(|node| {
                    let mut result =
                        self.extractor.extract_item(node, &base, &self.descriptor)?;
                    // Quality badge is SpankBang-specific; fill it bespoke
                    if let Some(el) = node.select(&quality_sel).next() {
                        let label: String = el.text().collect::<String>().trim().to_string();
                        if !label.is_empty() {
                            result.quality = Some(label);
                        }
                    }
                    Some(result)
                })
                .collect();
            if !results.is_empty() {
                return Ok(results);
            }
        }
        Ok(Vec::new())
    }
}

impl Default for Spankbang {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for Spankbang {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn search(
        &self,
        client: &reqwest::Client,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, SourceError> {
        let term = query
            .trim()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("+");
        let url = format!("{}/s/{}/{}/", self.descriptor.base_url, term, page);
        let response = client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let results = self.parse_page(&html)?;
        debug!(source = "spankbang", count = results.len(), "search complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="video-item">
          <a href="/abc123/video/kittens" title="Kittens"><img data-src="/thumbs/1.jpg"></a>
          <span class="l">1080p</span>
          <span class="duration">5:00</span>
        </div>"#;

    #[test]
    fn test_parse_page_with_quality_badge() {
        let adapter = Spankbang::new();
        let results = adapter.parse_page(PAGE).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].quality.as_deref(), Some("1080p"));
        assert_eq!(results[0].duration_seconds, Some(300));
        assert_eq!(results[0].url, "https://spankbang.com/abc123/video/kittens");
    }
}
