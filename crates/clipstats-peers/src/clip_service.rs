//! HTTP client for clip-service.

use std::time::Duration;

use chrono::NaiveDate;
use clipstats_core::StatsHistoryEntry;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;

use crate::error::PeerError;
use crate::types::{CampaignAggregate, Clip, ClipAggregate};
use crate::{INTERNAL_SERVICE_HEADER, SERVICE_NAME};

/// Client for clip-service's internal endpoints.
///
/// Use [`ClipServiceClient::new`] with the configured base URL for production
/// or point it at a wiremock server in tests.
pub struct ClipServiceClient {
    client: Client,
    base_url: String,
}

impl ClipServiceClient {
    /// # Errors
    ///
    /// Returns [`PeerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, PeerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            INTERNAL_SERVICE_HEADER,
            HeaderValue::from_static(SERVICE_NAME),
        );
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one clip by id.
    ///
    /// # Errors
    ///
    /// - [`PeerError::NotFound`] when the clip does not exist.
    /// - [`PeerError::UnexpectedStatus`] / [`PeerError::Http`] on other failures.
    /// - [`PeerError::Deserialize`] if the body does not match [`Clip`].
    pub async fn get_clip(&self, clip_id: &str) -> Result<Clip, PeerError> {
        let url = format!("{}/clips/{clip_id}", self.base_url);
        self.get_json(&url, &[]).await
    }

    /// List clips whose cached stats are due for a refresh.
    ///
    /// # Errors
    ///
    /// Returns [`PeerError`] on HTTP or deserialization failure.
    pub async fn needs_refresh(&self) -> Result<Vec<Clip>, PeerError> {
        let url = format!("{}/clips/needs-refresh", self.base_url);
        self.get_json(&url, &[]).await
    }

    /// Fetch a clip's engagement history, newest-first.
    ///
    /// # Errors
    ///
    /// Returns [`PeerError`] on HTTP or deserialization failure.
    pub async fn stats_history(&self, clip_id: &str) -> Result<Vec<StatsHistoryEntry>, PeerError> {
        let url = format!("{}/clips/{clip_id}/stats-history", self.base_url);
        self.get_json(&url, &[]).await
    }

    /// Fetch per-clip aggregates for one calendar week's ranking run.
    ///
    /// # Errors
    ///
    /// Returns [`PeerError`] on HTTP or deserialization failure.
    pub async fn approved_for_rankings(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<Vec<ClipAggregate>, PeerError> {
        let url = format!("{}/clips/approved-for-rankings", self.base_url);
        self.get_json(
            &url,
            &[
                ("weekStart", week_start.to_string()),
                ("weekEnd", week_end.to_string()),
            ],
        )
        .await
    }

    /// Fetch per-campaign aggregates for one calendar week's ranking run.
    ///
    /// # Errors
    ///
    /// Returns [`PeerError`] on HTTP or deserialization failure.
    pub async fn campaign_stats_for_rankings(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<Vec<CampaignAggregate>, PeerError> {
        let url = format!("{}/clips/campaign-stats-for-rankings", self.base_url);
        self.get_json(
            &url,
            &[
                ("weekStart", week_start.to_string()),
                ("weekEnd", week_end.to_string()),
            ],
        )
        .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, PeerError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(PeerError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(PeerError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PeerError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
