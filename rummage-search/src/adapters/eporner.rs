//! Eporner adapter (tier 1, API v2)

use super::{SourceAdapter, SourceError};
use async_trait::async_trait;
use rummage_common::format::{format_duration, format_views, normalize_rating};
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};
use serde::Deserialize;
use tracing::debug;

const SEARCH_URL: &str = "https://www.eporner.com/api/v2/video/search/";
const PER_PAGE: u32 = 30;

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
    /// Comma-separated keyword list
    #[serde(default)]
    keywords: String,
    #[serde(default)]
    views: Option<u64>,
    /// Star-scale rating as a string, e.g. `"4.57"`
    #[serde(default)]
    rate: Option<String>,
    #[serde(default)]
    length_sec: Option<u64>,
    #[serde(default)]
    default_thumb: Option<ApiThumb>,
}

#[derive(Debug, Deserialize)]
struct ApiThumb {
    #[serde(default)]
    src: String,
}

pub struct Eporner {
    descriptor: SourceDescriptor,
}

impl Eporner {
    pub fn new() -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: "eporner".into(),
                display_name: "Eporner".into(),
                base_url: "https://www.eporner.com".into(),
                tier: 1,
                capabilities: Capabilities {
                    duration: true,
                    views: true,
                    rating: true,
                    ..Default::default()
                },
                method: ExtractionMethod::Api,
                aliases: vec!["eporner".into(), "ep".into()],
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
        result.thumbnail = video.default_thumb.map(|t| t.src).unwrap_or_default();
        if let Some(seconds) = video.length_sec {
            result.duration = Some(format_duration(seconds));
            result.duration_seconds = Some(seconds);
        }
        if let Some(count) = video.views {
            result.views = Some(format_views(count));
            result.views_count = Some(count);
        }
        result.rating = video
            .rate
            .and_then(|r| r.parse::<f64>().ok())
            .map(normalize_rating);
        let mut tags: Vec<String> = Vec::new();
        for keyword in video.keywords.split(',') {
            let tag = keyword.trim().to_lowercase();
            if tag.len() >= 2 && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        result.tags = tags;
        Some(result)
    }
}

impl Default for Eporner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for Eporner {
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
                ("query", query),
                ("page", &page.to_string()),
                ("per_page", &PER_PAGE.to_string()),
                ("thumbsize", "medium"),
                ("format", "json"),
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
        debug!(source = "eporner", count = results.len(), "search complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_video_keywords_split() {
        let adapter = Eporner::new();
        let video = ApiVideo {
            title: "T".into(),
            url: "https://www.eporner.com/video-x/t/".into(),
            keywords: "teen, Amateur, teen, x".into(),
            views: Some(2_400_000),
            rate: Some("4.57".into()),
            length_sec: Some(3723),
            default_thumb: Some(ApiThumb { src: "https://static.eporner.com/t.jpg".into() }),
        };
        let result = adapter.map_video(video).unwrap();
        assert_eq!(result.tags, vec!["teen", "amateur"]);
        assert_eq!(result.views.as_deref(), Some("2.4M"));
        assert_eq!(result.duration.as_deref(), Some("1:02:03"));
        assert!((result.rating.unwrap() - 91.4).abs() < 0.01);
    }
}
