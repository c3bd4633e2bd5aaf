use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized engagement counters for one video, as returned by a platform
/// adapter. Counters are non-negative by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl PlatformStats {
    /// All-zero counters with no metadata — the soft-failure value adapters
    /// return when the upstream has no document for the video.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Engagement ratio `(likes + comments) / views`; `0.0` when views is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn engagement(&self) -> f64 {
        if self.views == 0 {
            0.0
        } else {
            (self.likes + self.comments) as f64 / self.views as f64
        }
    }
}

/// One point of a clip's engagement history, as served by clip-service.
/// Histories are ordered newest-first: index 0 is the most recent snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsHistoryEntry {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_is_zero_when_views_is_zero() {
        let stats = PlatformStats {
            likes: 10,
            comments: 5,
            ..PlatformStats::zero()
        };
        assert_eq!(stats.engagement(), 0.0);
    }

    #[test]
    fn engagement_combines_likes_and_comments() {
        let stats = PlatformStats {
            views: 1000,
            likes: 80,
            comments: 20,
            ..PlatformStats::zero()
        };
        let eng = stats.engagement();
        assert!((eng - 0.1).abs() < f64::EPSILON, "expected 0.1, got {eng}");
    }

    #[test]
    fn serializes_counters_in_camel_case() {
        let stats = PlatformStats {
            views: 1,
            likes: 2,
            comments: 3,
            shares: 4,
            thumbnail_url: Some("https://example.com/t.jpg".to_string()),
            ..PlatformStats::zero()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["views"], 1);
        assert_eq!(json["shares"], 4);
        assert_eq!(json["thumbnailUrl"], "https://example.com/t.jpg");
        assert!(json.get("title").is_none());
    }

    #[test]
    fn history_entry_deserializes_from_clip_service_shape() {
        let json = serde_json::json!({
            "views": 100,
            "likes": 10,
            "comments": 2,
            "shares": 1,
            "recordedAt": "2026-07-01T12:00:00Z"
        });
        let entry: StatsHistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.views, 100);
        assert_eq!(entry.recorded_at.to_rfc3339(), "2026-07-01T12:00:00+00:00");
    }
}
