//! RedTube adapter (tier 1, vendor JSON API)

use super::{SourceAdapter, SourceError};
use async_trait::async_trait;
use rummage_common::format::{format_duration, format_views, normalize_rating, parse_duration_text};
use rummage_common::types::result::SearchResult;
use rummage_common::types::source::{Capabilities, ExtractionMethod, SourceDescriptor};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const SEARCH_URL: &str = "https://api.redtube.com/";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    videos: Vec<ApiVideoWrapper>,
}

#[derive(Debug, Deserialize)]
struct ApiVideoWrapper {
    video: ApiVideo,
}

/// The API serves views and rating as numbers or strings depending on the
/// endpoint version; both fields go through lenient coercion.
#[derive(Debug, Deserialize)]
struct ApiVideo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    thumb: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    views: Option<Value>,
    #[serde(default)]
    rating: Option<Value>,
    #[serde(default)]
    tags: Vec<ApiTag>,
    #[serde(default)]
    stars: Vec<ApiStar>,
}

#[derive(Debug, Deserialize)]
struct ApiTag {
    #[serde(default)]
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiStar {
    #[serde(default)]
    star_name: String,
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.replace(',', "").parse().ok(),
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub struct Redtube {
    descriptor: SourceDescriptor,
}

impl Redtube {
    pub fn new() -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: "redtube".into(),
                display_name: "RedTube".into(),
                base_url: "https://www.redtube.com".into(),
                tier: 1,
                capabilities: Capabilities {
                    duration: true,
                    views: true,
                    rating: true,
                    ..Default::default()
                },
                method: ExtractionMethod::Api,
                aliases: vec!["redtube".into(), "rt".into()],
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
        result.thumbnail = video.thumb;
        if let Some(seconds) = parse_duration_text(&video.duration) {
            result.duration = Some(format_duration(seconds));
            result.duration_seconds = Some(seconds);
        }
        if let Some(count) = video.views.as_ref().and_then(value_to_u64) {
            result.views = Some(format_views(count));
            result.views_count = Some(count);
        }
        result.rating = video
            .rating
            .as_ref()
            .and_then(value_to_f64)
            .map(normalize_rating);
        let mut tags: Vec<String> = Vec::new();
        for tag in video.tags {
            let tag = tag.tag_name.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        result.tags = tags;
        result.performer = video
            .stars
            .into_iter()
            .map(|s| s.star_name)
            .find(|name| !name.trim().is_empty());
        Some(result)
    }
}

impl Default for Redtube {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for Redtube {
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
                ("data", "redtube.Videos.searchVideos"),
                ("output", "json"),
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
            .filter_map(|w| self.map_video(w.video))
            .collect();
        debug!(source = "redtube", count = results.len(), "search complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_views_coercion() {
        assert_eq!(value_to_u64(&Value::from(42u64)), Some(42));
        assert_eq!(value_to_u64(&Value::from("12,345")), Some(12345));
        assert_eq!(value_to_u64(&Value::Bool(true)), None);
    }

    #[test]
    fn test_map_video_star_rating_scaled() {
        let adapter = Redtube::new();
        let video = ApiVideo {
            title: "T".into(),
            url: "https://www.redtube.com/1".into(),
            thumb: String::new(),
            duration: "10:00".into(),
            views: Some(Value::from("1000")),
            rating: Some(Value::from("4.5")),
            tags: vec![],
            stars: vec![ApiStar { star_name: "Jane".into() }],
        };
        let result = adapter.map_video(video).unwrap();
        assert_eq!(result.rating, Some(90.0));
        assert_eq!(result.views_count, Some(1000));
        assert_eq!(result.duration_seconds, Some(600));
    }

    #[test]
    fn test_decode_response_shape() {
        let json = r#"{"videos":[{"video":{
            "title":"A","url":"https://www.redtube.com/1","thumb":"t.jpg",
            "duration":"7:29","views":449,"rating":"4.0","tags":[{"tag_name":"x1"}],
            "stars":[]}}]}"#;
        let payload: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.videos.len(), 1);
        let result = Redtube::new().map_video(
            serde_json::from_str::<ApiResponse>(json)
                .unwrap()
                .videos
                .remove(0)
                .video,
        );
        assert!(result.is_some());
    }
}
