//! Detection pipeline orchestration.
//!
//! Wraps the pure engine with the I/O it needs in production: clip metadata
//! and history come from clip-service, and significant findings are
//! published as `stats.bot_detected`.

use clipstats_core::Platform;
use clipstats_events::{BotDetected, EventSink, STATS_BOT_DETECTED};
use clipstats_peers::ClipServiceClient;

use crate::result::{BotDetectionResult, Severity};
use crate::rules::detect;

/// Run bot detection for one clip.
///
/// Fetch failures are soft: the run is logged and skipped (`None`). A
/// completed run always returns the engine result; the `stats.bot_detected`
/// event is published only when at least one flag is medium severity or
/// above, and publish failures are logged, never propagated.
pub async fn run_bot_detection(
    clip_service: &ClipServiceClient,
    publisher: &dyn EventSink,
    clip_id: &str,
) -> Option<BotDetectionResult> {
    let clip = match clip_service.get_clip(clip_id).await {
        Ok(clip) => clip,
        Err(e) => {
            tracing::warn!(clip_id, error = %e, "bot detection skipped — clip fetch failed");
            return None;
        }
    };

    let history = match clip_service.stats_history(clip_id).await {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(clip_id, error = %e, "bot detection skipped — history fetch failed");
            return None;
        }
    };

    let platform = clip.platform.parse::<Platform>().ok();
    if platform.is_none() {
        tracing::warn!(
            clip_id,
            platform = %clip.platform,
            "unrecognized platform — using default thresholds"
        );
    }

    let result = detect(platform, &history);

    let significant: Vec<_> = result
        .flags
        .iter()
        .filter(|f| f.severity >= Severity::Medium)
        .collect();

    if let Some(first) = significant.first() {
        let evidence = significant
            .iter()
            .map(|f| format!("{}: {}", f.kind, f.description))
            .collect::<Vec<_>>()
            .join("; ");

        let payload = BotDetected {
            clip_id: clip.id.clone(),
            campaign_id: clip.campaign_id.clone(),
            user_id: clip.user_id.clone(),
            flag_type: first.kind.as_str().to_string(),
            confidence: f64::from(result.confidence_score) / 100.0,
            evidence,
        };

        match serde_json::to_value(&payload) {
            Ok(data) => {
                if let Err(e) = publisher.publish(STATS_BOT_DETECTED, data).await {
                    tracing::error!(clip_id, error = %e, "failed to publish stats.bot_detected");
                }
            }
            Err(e) => {
                tracing::error!(clip_id, error = %e, "failed to serialize stats.bot_detected");
            }
        }

        tracing::info!(
            clip_id,
            flags = result.flags.len(),
            confidence = result.confidence_score,
            "bot detection flagged clip"
        );
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clipstats_events::EventError;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Captures published events in memory.
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

    fn clip_body(platform: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "s1",
            "campaignId": "c1",
            "userId": "u1",
            "platform": platform,
            "platformVideoId": "v1"
        })
    }

    #[tokio::test]
    async fn publishes_bot_detected_for_significant_flags() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clips/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(clip_body("TIKTOK")))
            .mount(&server)
            .await;

        // 1100% views growth on TikTok: VIEWS_SPIKE high, confidence 90.
        let history = serde_json::json!([
            { "views": 12000, "likes": 20, "comments": 0, "shares": 0,
              "recordedAt": "2026-07-01T12:00:00Z" },
            { "views": 1000, "likes": 15, "comments": 0, "shares": 0,
              "recordedAt": "2026-07-01T11:00:00Z" }
        ]);
        Mock::given(method("GET"))
            .and(path("/clips/s1/stats-history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&history))
            .mount(&server)
            .await;

        let clip_service = ClipServiceClient::new(&server.uri(), 5).unwrap();
        let sink = CapturingSink::default();

        let result = run_bot_detection(&clip_service, &sink, "s1")
            .await
            .expect("detection should run");

        assert!(result.has_anomalies);
        assert_eq!(result.confidence_score, 90);

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let (key, data) = &published[0];
        assert_eq!(key, "stats.bot_detected");
        assert_eq!(data["clipId"], "s1");
        assert_eq!(data["campaignId"], "c1");
        assert_eq!(data["userId"], "u1");
        assert_eq!(data["flagType"], "VIEWS_SPIKE");
        assert!((data["confidence"].as_f64().unwrap() - 0.90).abs() < 1e-9);
        assert!(data["evidence"]
            .as_str()
            .unwrap()
            .starts_with("VIEWS_SPIKE: "));
    }

    #[tokio::test]
    async fn quiet_history_publishes_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clips/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(clip_body("YOUTUBE")))
            .mount(&server)
            .await;

        let history = serde_json::json!([
            { "views": 105, "likes": 3, "comments": 0, "shares": 0,
              "recordedAt": "2026-07-01T12:00:00Z" },
            { "views": 100, "likes": 3, "comments": 0, "shares": 0,
              "recordedAt": "2026-07-01T11:00:00Z" }
        ]);
        Mock::given(method("GET"))
            .and(path("/clips/s1/stats-history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&history))
            .mount(&server)
            .await;

        let clip_service = ClipServiceClient::new(&server.uri(), 5).unwrap();
        let sink = CapturingSink::default();

        let result = run_bot_detection(&clip_service, &sink, "s1").await.unwrap();

        assert!(!result.has_anomalies);
        assert_eq!(result.confidence_score, 0);
        assert!(sink.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clip_fetch_failure_returns_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clips/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let clip_service = ClipServiceClient::new(&server.uri(), 5).unwrap();
        let sink = CapturingSink::default();

        let result = run_bot_detection(&clip_service, &sink, "missing").await;

        assert!(result.is_none());
        assert!(sink.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_history_is_a_clean_run() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clips/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(clip_body("TIKTOK")))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/clips/s1/stats-history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "views": 10, "likes": 0, "comments": 0, "shares": 0,
                  "recordedAt": "2026-07-01T12:00:00Z" }
            ])))
            .mount(&server)
            .await;

        let clip_service = ClipServiceClient::new(&server.uri(), 5).unwrap();
        let sink = CapturingSink::default();

        let result = run_bot_detection(&clip_service, &sink, "s1").await.unwrap();

        assert!(!result.has_anomalies);
        assert!(result.flags.is_empty());
        assert_eq!(result.confidence_score, 0);
    }
}
