//! Pornhub adapter (tier 1, webmasters JSON API)

use super::{SourceAdapter, SourceError};
use async_trait::async_trait;
use rummage_common::format::{format_duration, format_views, normalize_rating, parse_duration_text};
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};
use serde::Deserialize;
use tracing::debug;

const SEARCH_URL: &str = "https://www.pornhub.com/webmasters/search";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    videos: Vec<ApiVideo>,
}

#[derive(Debug, Deserialize)]
struct ApiVideo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    default_thumb: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    views: Option<u64>,
    /// Percent as a string, e.g. `"94.02"`
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    tags: Vec<ApiTag>,
    #[serde(default)]
    pornstars: Vec<ApiPornstar>,
}

#[derive(Debug, Deserialize)]
struct ApiTag {
    #[serde(default)]
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiPornstar {
    #[serde(default)]
    pornstar_name: String,
}

pub struct Pornhub {
    descriptor: SourceDescriptor,
}

impl Pornhub {
    pub fn new() -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: "pornhub".into(),
                display_name: "Pornhub".into(),
                base_url: "https://www.pornhub.com".into(),
                tier: 1,
                capabilities: Capabilities {
                    duration: true,
                    views: true,
                    rating: true,
                    ..Default::default()
                },
                method: ExtractionMethod::Api,
                aliases: vec!["pornhub".into(), "ph".into(), "phub".into()],
            },
        }
    }

    fn map_video(&self, video: ApiVideo) -> Option<SearchResult> {
        let mut result = SearchResult::new(
            &video.title,
            &video.url,
            &self.descriptor.name,
            &self.descriptor.display_name,
        )?;
        result.thumbnail = video.default_thumb;
        if let Some(seconds) = parse_duration_text(&video.duration) {
            result.duration = Some(format_duration(seconds));
            result.duration_seconds = Some(seconds);
        }
        if let Some(count) = video.views {
            result.views = Some(format_views(count));
            result.views_count = Some(count);
        }
        result.rating = video
            .rating
            .and_then(|r| r.parse::<f64>().ok())
            .map(normalize_rating);
        result.tags = {
            let mut tags: Vec<String> = Vec::new();
            for tag in video.tags {
                let tag = tag.tag_name.trim().to_lowercase();
                if !tag.is_empty() && !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
            tags
        };
        result.performer = video
            .pornstars
            .into_iter()
            .map(|p| p.pornstar_name)
            .find(|name| !name.trim().is_empty());
        Some(result)
    }
}

impl Default for Pornhub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for Pornhub {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn search(
        &self,
        client: &reqwest::Client,
        query: &str,
        page: u32,
    ) -> Result<Vec<SearchResult>, SourceError> {
        let response = client
            .get(SEARCH_URL)
            .query(&[
                ("search", query),
                ("page", &page.to_string()),
                ("thumbsize", "medium"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }

        let payload: ApiResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        let results: Vec<SearchResult> = payload
            .videos
            .into_iter()
            .filter_map(|v| self.map_video(v))
            .collect();
        debug!(source = "pornhub", count = results.len(), "search complete");
        Ok(results)
    }
}
