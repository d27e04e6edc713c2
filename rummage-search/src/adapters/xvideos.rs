//! XVideos adapter (tier 3, DOM scraping via the generic extraction fallback)

use super::{SourceAdapter, SourceError};
use crate::extract::Extractor;
use async_trait::async_trait;
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Item-container candidates, current layout first
const CONTAINER_SELECTORS: &[&str] = &["div.thumb-block", "div.mozaique div.frame-block"];

pub struct Xvideos {
    descriptor: SourceDescriptor,
    extractor: Extractor,
    containers: Vec<Selector>,
}

impl Xvideos {
    pub fn new() -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: "xvideos".into(),
                display_name: "XVideos".into(),
                base_url: "https://www.xvideos.com".into(),
                tier: 3,
                capabilities: Capabilities {
                    duration: true,
                    ..Default::default()
                },
                method: ExtractionMethod::Dom,
                aliases: vec!["xvideos".into(), "xv".into(), "xvid".into()],
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
        let doc = Html::parse_document(html);
        for selector in &self.containers {
            let results: Vec<SearchResult> = doc
                .select(selector)
                .filter_map(|node| self.extractor.extract_item(node, &base, &self.descriptor))
                .collect();
            if !results.is_empty() {
                return Ok(results);
            }
        }
        Ok(Vec::new())
    }
}

impl Default for Xvideos {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for Xvideos {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn search(
        &self,
        client: &reqwest::Client,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, SourceError> {
        // XVideos pages are zero-based
        let p = page.saturating_sub(1).to_string();
        let response = client
            .get(&self.descriptor.base_url)
            .query(&[("k", query), ("p", &p)])
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

        // Parse strictly after the last await; the DOM is not Send
        let results = self.parse_page(&html)?;
        debug!(source = "xvideos", count = results.len(), "search complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><div class="mozaique">
          <div class="thumb-block">
            <a href="/video1/big_cats" title="Big cats"><img data-src="//img.xvcdn.com/1.jpg"></a>
            <span class="duration">12 min</span>
          </div>
          <div class="thumb-block">
            <a href="/video2/more_cats"><img alt="More cats" src="/2.jpg"></a>
          </div>
          <div class="thumb-block"><span>no link here</span></div>
        </div></body></html>"#;

    #[test]
    fn test_parse_page_extracts_items() {
        let adapter = Xvideos::new();
        let results = adapter.parse_page(PAGE).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Big cats");
        assert_eq!(results[0].url, "https://www.xvideos.com/video1/big_cats");
        assert_eq!(results[0].thumbnail, "https://img.xvcdn.com/1.jpg");
        assert_eq!(results[1].title, "More cats");
    }

    #[test]
    fn test_empty_page_yields_no_results() {
        let adapter = Xvideos::new();
        assert!(adapter.parse_page("<html></html>").unwrap().is_empty());
    }
}
