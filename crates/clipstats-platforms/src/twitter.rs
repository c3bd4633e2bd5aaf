//! Twitter/X adapter via the public syndication CDN.
//!
//! The tweet id is extracted from a status URL (twitter.com, x.com, or any
//! nitter mirror); a bare numeric id is also accepted. An input that yields
//! no id is not an error — `fetch` returns `Ok(None)` and the caller decides
//! what "no document" means.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use clipstats_core::{Platform, PlatformStats};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::adapter::PlatformAdapter;
use crate::error::AdapterError;

const DEFAULT_BASE_URL: &str = "https://cdn.syndication.twimg.com";

const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub struct TwitterAdapter {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct TweetResult {
    #[serde(default)]
    impression_count: u64,
    #[serde(default)]
    favorite_count: u64,
    #[serde(default)]
    conversation_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    quote_count: u64,
    user: Option<TweetUser>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize)]
struct TweetUser {
    name: Option<String>,
}

fn status_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:twitter\.com|x\.com|nitter\.[^/]+)/[^/]+/status/(\d+)")
            .expect("status regex is valid")
    })
}

/// Extract the numeric tweet id from a status URL, or pass a bare id through.
fn extract_tweet_id(input: &str) -> Option<String> {
    if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
        return Some(input.to_string());
    }
    status_regex()
        .captures(input)
        .map(|caps| caps[1].to_string())
}

impl TwitterAdapter {
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
}

#[async_trait]
impl PlatformAdapter for TwitterAdapter {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch(&self, video_id: &str) -> Result<Option<PlatformStats>, AdapterError> {
        let Some(tweet_id) = extract_tweet_id(video_id) else {
            tracing::warn!(input = video_id, "no tweet id found in input");
            return Ok(None);
        };

        let url = format!("{}/tweet-result", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("id", tweet_id.as_str()), ("token", "x")])
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
        let tweet: TweetResult =
            serde_json::from_str(&body).map_err(|e| AdapterError::Deserialize {
                context: format!("tweet-result(id={tweet_id})"),
                source: e,
            })?;

        Ok(Some(PlatformStats {
            views: tweet.impression_count,
            likes: tweet.favorite_count,
            comments: tweet.conversation_count,
            shares: tweet.retweet_count + tweet.quote_count,
            thumbnail_url: None,
            title: None,
            author: tweet.user.and_then(|u| u.name),
            published_at: tweet.created_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_twitter_url() {
        assert_eq!(
            extract_tweet_id("https://twitter.com/user/status/1234567890"),
            Some("1234567890".to_string())
        );
    }

    #[test]
    fn extracts_id_from_x_and_nitter_urls() {
        assert_eq!(
            extract_tweet_id("https://x.com/someone/status/42"),
            Some("42".to_string())
        );
        assert_eq!(
            extract_tweet_id("https://nitter.net/someone/status/777?ref=x"),
            Some("777".to_string())
        );
    }

    #[test]
    fn bare_numeric_id_passes_through() {
        assert_eq!(extract_tweet_id("555"), Some("555".to_string()));
    }

    #[test]
    fn non_status_input_yields_none() {
        assert_eq!(extract_tweet_id("https://twitter.com/user"), None);
        assert_eq!(extract_tweet_id("not a url"), None);
        assert_eq!(extract_tweet_id(""), None);
    }

    #[test]
    fn shares_sum_retweets_and_quotes() {
        let json = r#"{
            "impression_count": 9000,
            "favorite_count": 300,
            "conversation_count": 25,
            "retweet_count": 40,
            "quote_count": 10
        }"#;
        let tweet: TweetResult = serde_json::from_str(json).unwrap();
        assert_eq!(tweet.retweet_count + tweet.quote_count, 50);
        assert_eq!(tweet.impression_count, 9000);
    }
}
