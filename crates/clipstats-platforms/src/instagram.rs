//! Instagram Reels adapter via the Boostfluence stats endpoint.
//!
//! The endpoint sometimes answers with a compute challenge
//! (`error: "COMPUTE_REQUIRED"` plus a `challenge` object); the protocol is
//! satisfied by echoing the challenge values back in `X-Compute` and
//! `X-Timestamp` headers on a single retry. If the upstream ever starts
//! requiring a real computation this adapter will silently stop returning
//! counters — failures here are soft (all-zero stats), so batch refreshes
//! keep going either way.
//!
//! Instagram does not expose share counts; `shares` is always 0.

use std::time::Duration;

use async_trait::async_trait;
use clipstats_core::{Platform, PlatformStats};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::adapter::PlatformAdapter;
use crate::error::AdapterError;

const DEFAULT_BASE_URL: &str = "https://api.boostfluence.com";
const STATS_PATH: &str = "/api/instagram/media-stats";

const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub struct InstagramAdapter {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct BoostfluenceResponse {
    error: Option<String>,
    challenge: Option<ComputeChallenge>,
    view_count: Option<u64>,
    like_count: Option<u64>,
    comment_count: Option<u64>,
    thumbnail_url: Option<String>,
    caption: Option<String>,
    username: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputeChallenge {
    timestamp: i64,
    expected_compute: String,
}

impl InstagramAdapter {
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
            .user_agent(BROWSER_UA)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_stats(
        &self,
        url: &str,
        reel_url: &str,
        challenge: Option<&ComputeChallenge>,
    ) -> Result<BoostfluenceResponse, AdapterError> {
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::ORIGIN, "https://www.instagram.com")
            .header(reqwest::header::REFERER, "https://www.instagram.com/")
            .json(&json!({ "url": reel_url, "type": "reels" }));

        if let Some(challenge) = challenge {
            request = request
                .header("X-Compute", &challenge.expected_compute)
                .header("X-Timestamp", challenge.timestamp.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AdapterError::Deserialize {
            context: format!("boostfluence({reel_url})"),
            source: e,
        })
    }
}

fn reel_url(video_id: &str) -> String {
    if video_id.contains("instagram.com") {
        video_id.to_string()
    } else {
        format!("https://www.instagram.com/reel/{video_id}/")
    }
}

fn to_stats(parsed: BoostfluenceResponse) -> PlatformStats {
    PlatformStats {
        views: parsed.view_count.unwrap_or(0),
        likes: parsed.like_count.unwrap_or(0),
        comments: parsed.comment_count.unwrap_or(0),
        shares: 0,
        thumbnail_url: parsed.thumbnail_url,
        title: parsed.caption,
        author: parsed.username,
        published_at: None,
    }
}

#[async_trait]
impl PlatformAdapter for InstagramAdapter {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn fetch(&self, video_id: &str) -> Result<Option<PlatformStats>, AdapterError> {
        let url = format!("{}{}", self.base_url, STATS_PATH);
        let reel = reel_url(video_id);

        let first = self.post_stats(&url, &reel, None).await?;

        let needs_challenge =
            first.error.as_deref() == Some("COMPUTE_REQUIRED") && first.challenge.is_some();
        let parsed = if needs_challenge {
            self.post_stats(&url, &reel, first.challenge.as_ref()).await?
        } else {
            first
        };

        if let Some(error) = parsed.error.as_deref() {
            tracing::warn!(
                video_id,
                error,
                "instagram stats endpoint returned an error — treating as zero counters"
            );
            return Ok(Some(PlatformStats::zero()));
        }

        Ok(Some(to_stats(parsed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_id_becomes_reel_url() {
        assert_eq!(
            reel_url("CxAbC123"),
            "https://www.instagram.com/reel/CxAbC123/"
        );
    }

    #[test]
    fn challenge_deserializes_from_camel_case() {
        let json = r#"{
            "error": "COMPUTE_REQUIRED",
            "challenge": {"timestamp": 1751371200, "expectedCompute": "a1b2c3"}
        }"#;
        let parsed: BoostfluenceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("COMPUTE_REQUIRED"));
        let challenge = parsed.challenge.unwrap();
        assert_eq!(challenge.timestamp, 1751371200);
        assert_eq!(challenge.expected_compute, "a1b2c3");
    }

    #[test]
    fn counters_map_with_missing_fields_as_zero() {
        let parsed: BoostfluenceResponse =
            serde_json::from_str(r#"{"view_count": 500, "like_count": 40}"#).unwrap();
        let stats = to_stats(parsed);
        assert_eq!(stats.views, 500);
        assert_eq!(stats.likes, 40);
        assert_eq!(stats.comments, 0);
        assert_eq!(stats.shares, 0);
    }
}
