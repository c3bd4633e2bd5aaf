//! TikTok adapter via the public tikwm.com mirror API.
//!
//! Accepts either a full TikTok URL or a bare video id; bare ids are wrapped
//! in a canonical URL before the request. A response without a `data` object
//! is the mirror's "no such video" shape and yields all-zero counters.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use clipstats_core::{Platform, PlatformStats};
use reqwest::Client;
use serde::Deserialize;

use crate::adapter::PlatformAdapter;
use crate::error::AdapterError;

const DEFAULT_BASE_URL: &str = "https://www.tikwm.com";

pub struct TikTokAdapter {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct TikwmResponse {
    data: Option<TikwmData>,
}

#[derive(Deserialize)]
struct TikwmData {
    #[serde(default)]
    play_count: u64,
    #[serde(default)]
    digg_count: u64,
    #[serde(default)]
    comment_count: u64,
    #[serde(default)]
    share_count: u64,
    cover: Option<String>,
    title: Option<String>,
    author: Option<TikwmAuthor>,
    create_time: Option<i64>,
}

#[derive(Deserialize)]
struct TikwmAuthor {
    nickname: Option<String>,
}

impl TikTokAdapter {
    /// # Errors
    ///
    /// Returns [`AdapterError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, AdapterError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`AdapterError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Bare ids become a canonical video URL; full URLs pass through untouched.
fn canonical_url(video_id: &str) -> String {
    if video_id.contains("tiktok.com") {
        video_id.to_string()
    } else {
        format!("https://www.tiktok.com/@tiktok/video/{video_id}")
    }
}

#[async_trait]
impl PlatformAdapter for TikTokAdapter {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    async fn fetch(&self, video_id: &str) -> Result<Option<PlatformStats>, AdapterError> {
        let url = format!("{}/api/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("url", canonical_url(video_id))])
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
        let parsed: TikwmResponse =
            serde_json::from_str(&body).map_err(|e| AdapterError::Deserialize {
                context: format!("tikwm(id={video_id})"),
                source: e,
            })?;

        let Some(data) = parsed.data else {
            tracing::warn!(video_id, "tikwm returned no data — treating as zero counters");
            return Ok(Some(PlatformStats::zero()));
        };

        Ok(Some(PlatformStats {
            views: data.play_count,
            likes: data.digg_count,
            comments: data.comment_count,
            shares: data.share_count,
            thumbnail_url: data.cover,
            title: data.title,
            author: data.author.and_then(|a| a.nickname),
            published_at: data
                .create_time
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }))
    }
}
