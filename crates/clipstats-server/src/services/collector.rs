//! Stats collection: fetch via the platform adapters, cache, publish.
//!
//! The collector is the sole writer of the stats cache. Cache writes and
//! event publishes are best-effort (logged, swallowed); only the upstream
//! fetch decides whether a refresh succeeded.

use std::sync::Arc;
use std::time::Duration;

use clipstats_cache::StatsCache;
use clipstats_core::{Platform, PlatformStats};
use clipstats_events::{EventSink, StatsUpdated, STATS_UPDATED};
use clipstats_platforms::{AdapterError, AdapterRegistry};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("no adapter registered for platform {0}")]
    UnsupportedPlatform(Platform),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("{platform} returned no document for {video_id}")]
    NoStats { platform: Platform, video_id: String },
}

/// One clip to refresh: the submission id plus its platform coordinates.
#[derive(Debug, Clone)]
pub struct ClipRef {
    pub submission_id: String,
    pub platform: Platform,
    pub video_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub fail_count: usize,
}

pub struct StatsCollector {
    registry: Arc<AdapterRegistry>,
    cache: Arc<dyn StatsCache>,
    publisher: Arc<dyn EventSink>,
    /// Pause inserted after every clip in a batch. The platform APIs are
    /// free-tier public endpoints; pacing keeps each worker near 10 rps,
    /// under all four platforms' soft limits.
    inter_request_delay: Duration,
}

impl StatsCollector {
    #[must_use]
    pub fn new(
        registry: Arc<AdapterRegistry>,
        cache: Arc<dyn StatsCache>,
        publisher: Arc<dyn EventSink>,
        inter_request_delay: Duration,
    ) -> Self {
        Self {
            registry,
            cache,
            publisher,
            inter_request_delay,
        }
    }

    /// Fetch fresh counters, write the cache, and publish `stats.updated`.
    ///
    /// # Errors
    ///
    /// Adapter failures propagate — callers (the event handler, the HTTP
    /// refresh route) decide whether to retry. Cache and publish failures do
    /// not fail the refresh.
    pub async fn refresh_clip_stats(
        &self,
        submission_id: &str,
        platform: Platform,
        video_id: &str,
    ) -> Result<PlatformStats, CollectorError> {
        let adapter = self
            .registry
            .get(platform)
            .ok_or(CollectorError::UnsupportedPlatform(platform))?;

        let stats =
            adapter
                .fetch(video_id)
                .await?
                .ok_or_else(|| CollectorError::NoStats {
                    platform,
                    video_id: video_id.to_string(),
                })?;

        if let Err(e) = self.cache.set(platform, video_id, &stats).await {
            tracing::warn!(
                submission_id,
                %platform,
                video_id,
                error = %e,
                "stats cache write failed"
            );
        }

        let payload = StatsUpdated {
            clip_id: submission_id.to_string(),
            views: stats.views,
            likes: stats.likes,
            comments: stats.comments,
            shares: stats.shares,
            engagement: stats.engagement(),
        };
        match serde_json::to_value(&payload) {
            Ok(data) => {
                if let Err(e) = self.publisher.publish(STATS_UPDATED, data).await {
                    tracing::warn!(submission_id, error = %e, "failed to publish stats.updated");
                }
            }
            Err(e) => {
                tracing::warn!(submission_id, error = %e, "failed to serialize stats.updated");
            }
        }

        tracing::debug!(
            submission_id,
            %platform,
            video_id,
            views = stats.views,
            "clip stats refreshed"
        );
        Ok(stats)
    }

    /// Cache-first read. A hit returns the cached tuple without touching the
    /// platform; a miss (or a cache read error) falls through to
    /// [`Self::refresh_clip_stats`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh_clip_stats`] on the miss path.
    pub async fn get_or_fetch_stats(
        &self,
        submission_id: &str,
        platform: Platform,
        video_id: &str,
    ) -> Result<PlatformStats, CollectorError> {
        match self.cache.get(platform, video_id).await {
            Ok(Some(stats)) => return Ok(stats),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(%platform, video_id, error = %e, "stats cache read failed");
            }
        }
        self.refresh_clip_stats(submission_id, platform, video_id)
            .await
    }

    /// Refresh a batch sequentially with the fixed inter-request pause.
    ///
    /// The pause applies after every clip regardless of outcome, and
    /// per-clip failures are counted, never fatal.
    pub async fn batch_refresh_stats(&self, clips: &[ClipRef]) -> BatchOutcome {
        let mut success_count = 0;
        let mut fail_count = 0;

        for clip in clips {
            match self
                .refresh_clip_stats(&clip.submission_id, clip.platform, &clip.video_id)
                .await
            {
                Ok(_) => success_count += 1,
                Err(e) => {
                    fail_count += 1;
                    tracing::warn!(
                        submission_id = %clip.submission_id,
                        platform = %clip.platform,
                        error = %e,
                        "batch refresh failed for clip"
                    );
                }
            }
            tokio::time::sleep(self.inter_request_delay).await;
        }

        BatchOutcome {
            success_count,
            fail_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clipstats_cache::CacheError;
    use clipstats_events::EventError;
    use clipstats_platforms::PlatformAdapter;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct StubAdapter {
        platform: Platform,
        stats: Option<PlatformStats>,
        fail: bool,
        calls: AtomicU32,
    }

    impl StubAdapter {
        fn returning(platform: Platform, stats: PlatformStats) -> Self {
            Self {
                platform,
                stats: Some(stats),
                fail: false,
                calls: AtomicU32::new(0),
            }
        }

        fn failing(platform: Platform) -> Self {
            Self {
                platform,
                stats: None,
                fail: true,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PlatformAdapter for StubAdapter {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn fetch(&self, video_id: &str) -> Result<Option<PlatformStats>, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AdapterError::UnexpectedStatus {
                    status: 503,
                    url: format!("stub://{video_id}"),
                });
            }
            Ok(self.stats.clone())
        }
    }

    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, PlatformStats>>,
    }

    #[async_trait]
    impl StatsCache for MemoryCache {
        async fn get(
            &self,
            platform: Platform,
            video_id: &str,
        ) -> Result<Option<PlatformStats>, CacheError> {
            let key = clipstats_cache::stats_key(platform, video_id);
            Ok(self.entries.lock().unwrap().get(&key).cloned())
        }

        async fn set(
            &self,
            platform: Platform,
            video_id: &str,
            stats: &PlatformStats,
        ) -> Result<(), CacheError> {
            let key = clipstats_cache::stats_key(platform, video_id);
            self.entries.lock().unwrap().insert(key, stats.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        published: Mutex<Vec<(String, serde_json::Value)>>,
    }

    #[async_trait]
    impl EventSink for CapturingSink {
        async fn publish(
            &self,
            routing_key: &str,
            data: serde_json::Value,
        ) -> Result<(), EventError> {
            self.published
                .lock()
                .unwrap()
                .push((routing_key.to_string(), data));
            Ok(())
        }
    }

    fn sample_stats() -> PlatformStats {
        PlatformStats {
            views: 1000,
            likes: 80,
            comments: 20,
            shares: 5,
            ..PlatformStats::zero()
        }
    }

    struct Harness {
        collector: StatsCollector,
        cache: Arc<MemoryCache>,
        sink: Arc<CapturingSink>,
        adapter: Arc<StubAdapter>,
    }

    fn harness(adapter: StubAdapter) -> Harness {
        let adapter = Arc::new(adapter);
        let cache = Arc::new(MemoryCache::default());
        let sink = Arc::new(CapturingSink::default());
        let mut registry = AdapterRegistry::new();
        registry.insert(Arc::clone(&adapter) as Arc<dyn PlatformAdapter>);
        let collector = StatsCollector::new(
            Arc::new(registry),
            Arc::clone(&cache) as Arc<dyn StatsCache>,
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Duration::from_millis(100),
        );
        Harness {
            collector,
            cache,
            sink,
            adapter,
        }
    }

    #[tokio::test]
    async fn warm_cache_short_circuits_the_platform() {
        let h = harness(StubAdapter::returning(Platform::Youtube, sample_stats()));

        let cached = PlatformStats {
            views: 100,
            likes: 10,
            comments: 2,
            shares: 0,
            ..PlatformStats::zero()
        };
        h.cache.set(Platform::Youtube, "abc", &cached).await.unwrap();

        let stats = h
            .collector
            .get_or_fetch_stats("s1", Platform::Youtube, "abc")
            .await
            .unwrap();

        assert_eq!(stats, cached);
        assert_eq!(h.adapter.calls.load(Ordering::SeqCst), 0);
        assert!(h.sink.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fresh_fetch_writes_cache_and_publishes() {
        let h = harness(StubAdapter::returning(Platform::Tiktok, sample_stats()));

        let stats = h
            .collector
            .refresh_clip_stats("s1", Platform::Tiktok, "xyz")
            .await
            .unwrap();

        assert_eq!(stats, sample_stats());

        let cached = h.cache.get(Platform::Tiktok, "xyz").await.unwrap();
        assert_eq!(cached, Some(sample_stats()));

        let published = h.sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (key, data) = &published[0];
        assert_eq!(key, "stats.updated");
        assert_eq!(data["clipId"], "s1");
        assert_eq!(data["views"], 1000);
        assert!((data["engagement"].as_f64().unwrap() - 0.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn cache_miss_falls_through_to_refresh() {
        let h = harness(StubAdapter::returning(Platform::Tiktok, sample_stats()));

        let stats = h
            .collector
            .get_or_fetch_stats("s1", Platform::Tiktok, "xyz")
            .await
            .unwrap();

        assert_eq!(stats, sample_stats());
        assert_eq!(h.adapter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.sink.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn adapter_failure_propagates_from_refresh() {
        let h = harness(StubAdapter::failing(Platform::Youtube));

        let err = h
            .collector
            .refresh_clip_stats("s1", Platform::Youtube, "abc")
            .await
            .unwrap_err();

        assert!(matches!(err, CollectorError::Adapter(_)), "{err}");
        assert!(h.sink.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unregistered_platform_is_an_error() {
        let h = harness(StubAdapter::returning(Platform::Youtube, sample_stats()));

        let err = h
            .collector
            .refresh_clip_stats("s1", Platform::Twitter, "123")
            .await
            .unwrap_err();

        assert!(
            matches!(err, CollectorError::UnsupportedPlatform(Platform::Twitter)),
            "{err}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn batch_survives_failures_and_paces_requests() {
        let good = Arc::new(StubAdapter::returning(Platform::Tiktok, sample_stats()));
        let bad = Arc::new(StubAdapter::failing(Platform::Youtube));
        let cache = Arc::new(MemoryCache::default());
        let sink = Arc::new(CapturingSink::default());
        let mut registry = AdapterRegistry::new();
        registry.insert(Arc::clone(&good) as Arc<dyn PlatformAdapter>);
        registry.insert(Arc::clone(&bad) as Arc<dyn PlatformAdapter>);
        let collector = StatsCollector::new(
            Arc::new(registry),
            cache as Arc<dyn StatsCache>,
            sink as Arc<dyn EventSink>,
            Duration::from_millis(100),
        );

        let clips = vec![
            ClipRef {
                submission_id: "s1".to_string(),
                platform: Platform::Tiktok,
                video_id: "a".to_string(),
            },
            ClipRef {
                submission_id: "s2".to_string(),
                platform: Platform::Youtube,
                video_id: "b".to_string(),
            },
            ClipRef {
                submission_id: "s3".to_string(),
                platform: Platform::Tiktok,
                video_id: "c".to_string(),
            },
        ];

        let start = tokio::time::Instant::now();
        let outcome = collector.batch_refresh_stats(&clips).await;
        let elapsed = start.elapsed();

        assert_eq!(
            outcome,
            BatchOutcome {
                success_count: 2,
                fail_count: 1
            }
        );
        // The 100 ms pause applies after every clip, failures included.
        assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
    }
}
