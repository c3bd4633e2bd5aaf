//! `YouTube` Data API v3 adapter.
//!
//! Requires an API key; without one every fetch fails with
//! [`AdapterError::MissingApiKey`]. YouTube does not expose share counts, so
//! `shares` is always 0.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clipstats_core::{Platform, PlatformStats};
use reqwest::Client;
use serde::Deserialize;

use crate::adapter::PlatformAdapter;
use crate::error::AdapterError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

pub struct YouTubeAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    statistics: Option<VideoStatistics>,
    snippet: Option<VideoSnippet>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: Option<String>,
    channel_title: Option<String>,
    published_at: Option<DateTime<Utc>>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

impl YouTubeAdapter {
    /// Creates the production adapter.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: Option<String>, timeout_secs: u64) -> Result<Self, AdapterError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates an adapter pointed at a custom base URL (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        api_key: Option<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Counters arrive as decimal strings; absent fields count as zero.
fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0)
}

#[async_trait]
impl PlatformAdapter for YouTubeAdapter {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn fetch(&self, video_id: &str) -> Result<Option<PlatformStats>, AdapterError> {
        let Some(api_key) = &self.api_key else {
            return Err(AdapterError::MissingApiKey {
                platform: Platform::Youtube,
            });
        };

        let url = format!("{}/youtube/v3/videos", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "statistics,snippet"),
                ("id", video_id),
                ("key", api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed: VideosResponse =
            serde_json::from_str(&body).map_err(|e| AdapterError::Deserialize {
                context: format!("youtube videos(id={video_id})"),
                source: e,
            })?;

        let Some(item) = parsed.items.into_iter().next() else {
            return Err(AdapterError::VideoNotFound {
                platform: Platform::Youtube,
                video_id: video_id.to_string(),
            });
        };

        let stats = item.statistics.unwrap_or_default();
        let snippet = item.snippet;

        Ok(Some(PlatformStats {
            views: parse_count(stats.view_count.as_deref()),
            likes: parse_count(stats.like_count.as_deref()),
            comments: parse_count(stats.comment_count.as_deref()),
            shares: 0,
            thumbnail_url: snippet.as_ref().and_then(|s| {
                s.thumbnails
                    .as_ref()
                    .and_then(|t| t.medium.as_ref().or(t.default.as_ref()))
                    .map(|t| t.url.clone())
            }),
            title: snippet.as_ref().and_then(|s| s.title.clone()),
            author: snippet.as_ref().and_then(|s| s.channel_title.clone()),
            published_at: snippet.as_ref().and_then(|s| s.published_at),
        }))
    }
}
