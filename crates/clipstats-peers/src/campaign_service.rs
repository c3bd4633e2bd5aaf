//! HTTP client for campaign-service.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;

use crate::error::PeerError;
use crate::types::Campaign;
use crate::{INTERNAL_SERVICE_HEADER, SERVICE_NAME};

pub struct CampaignServiceClient {
    client: Client,
    base_url: String,
}

impl CampaignServiceClient {
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

    /// Fetch one campaign by id.
    ///
    /// # Errors
    ///
    /// - [`PeerError::NotFound`] when the campaign does not exist.
    /// - [`PeerError::UnexpectedStatus`] / [`PeerError::Http`] on other failures.
    /// - [`PeerError::Deserialize`] if the body does not match [`Campaign`].
    pub async fn get_campaign(&self, campaign_id: &str) -> Result<Campaign, PeerError> {
        let url = format!("{}/campaigns/{campaign_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(PeerError::NotFound { url });
        }
        if !status.is_success() {
            return Err(PeerError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PeerError::Deserialize {
            context: url,
            source: e,
        })
    }
}
