use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use clipstats_core::{AppConfig, Platform, PlatformStats};

use crate::error::AdapterError;
use crate::{InstagramAdapter, TikTokAdapter, TwitterAdapter, YouTubeAdapter};

/// One platform's fetch-and-normalize contract.
///
/// `Ok(None)` means the input identifies no document on the platform (e.g. a
/// Twitter URL with no extractable tweet id). Hard failures — transport,
/// unexpected status, missing configuration — are returned as errors so the
/// caller can decide whether to retry.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    async fn fetch(&self, video_id: &str) -> Result<Option<PlatformStats>, AdapterError>;
}

/// Maps each [`Platform`] to its adapter implementation.
///
/// Built once at bootstrap; the collector looks adapters up per clip.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<Platform, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the production registry with all four adapters.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Http`] if an underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, AdapterError> {
        let timeout = config.platform_request_timeout_secs;
        let mut registry = Self::new();
        registry.insert(Arc::new(YouTubeAdapter::new(
            config.youtube_api_key.clone(),
            timeout,
        )?));
        registry.insert(Arc::new(TikTokAdapter::new(timeout)?));
        registry.insert(Arc::new(InstagramAdapter::new(timeout)?));
        registry.insert(Arc::new(TwitterAdapter::new(timeout)?));
        Ok(registry)
    }

    pub fn insert(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters.insert(adapter.platform(), adapter);
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn PlatformAdapter>> {
        self.adapters.get(&platform).map(Arc::clone)
    }
}
