use serde::{Deserialize, Serialize};

/// The anomaly families the engine can flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagKind {
    ViewsSpike,
    LikesSpike,
    CommentsSpike,
    EngagementRatio,
    VelocityAnomaly,
    TimePattern,
    RatioAnomaly,
    ZeroVariance,
    SuddenStop,
}

impl FlagKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FlagKind::ViewsSpike => "VIEWS_SPIKE",
            FlagKind::LikesSpike => "LIKES_SPIKE",
            FlagKind::CommentsSpike => "COMMENTS_SPIKE",
            FlagKind::EngagementRatio => "ENGAGEMENT_RATIO",
            FlagKind::VelocityAnomaly => "VELOCITY_ANOMALY",
            FlagKind::TimePattern => "TIME_PATTERN",
            FlagKind::RatioAnomaly => "RATIO_ANOMALY",
            FlagKind::ZeroVariance => "ZERO_VARIANCE",
            FlagKind::SuddenStop => "SUDDEN_STOP",
        }
    }
}

impl std::fmt::Display for FlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One anomaly finding. `confidence` is an integer in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotFlag {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub severity: Severity,
    pub description: String,
    pub confidence: u8,
}

/// Outcome of one detection run over a clip's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDetectionResult {
    pub has_anomalies: bool,
    pub flags: Vec<BotFlag>,
    /// Mean of flag confidences, rounded; 0 when no flags fired.
    pub confidence_score: u8,
}

impl BotDetectionResult {
    /// The no-anomaly result, also returned for histories too short to judge.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            has_anomalies: false,
            flags: Vec::new(),
            confidence_score: 0,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_flags(flags: Vec<BotFlag>) -> Self {
        if flags.is_empty() {
            return Self::empty();
        }
        let sum: u32 = flags.iter().map(|f| u32::from(f.confidence)).sum();
        let confidence_score = (f64::from(sum) / flags.len() as f64).round() as u8;
        Self {
            has_anomalies: true,
            flags,
            confidence_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(kind: FlagKind, confidence: u8) -> BotFlag {
        BotFlag {
            kind,
            severity: Severity::High,
            description: String::new(),
            confidence,
        }
    }

    #[test]
    fn empty_result_has_zero_score() {
        let result = BotDetectionResult::from_flags(vec![]);
        assert!(!result.has_anomalies);
        assert!(result.flags.is_empty());
        assert_eq!(result.confidence_score, 0);
    }

    #[test]
    fn score_is_mean_of_confidences() {
        let result = BotDetectionResult::from_flags(vec![
            flag(FlagKind::ViewsSpike, 90),
            flag(FlagKind::LikesSpike, 70),
        ]);
        assert!(result.has_anomalies);
        assert_eq!(result.confidence_score, 80);
    }

    #[test]
    fn score_rounds_to_nearest() {
        let result = BotDetectionResult::from_flags(vec![
            flag(FlagKind::ViewsSpike, 90),
            flag(FlagKind::LikesSpike, 85),
        ]);
        // 87.5 rounds up
        assert_eq!(result.confidence_score, 88);
    }

    #[test]
    fn severity_orders_low_to_high() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn flag_kind_serializes_to_screaming_snake_case() {
        let json = serde_json::to_string(&FlagKind::ViewsSpike).unwrap();
        assert_eq!(json, "\"VIEWS_SPIKE\"");
        assert_eq!(FlagKind::ZeroVariance.as_str(), "ZERO_VARIANCE");
    }
}
