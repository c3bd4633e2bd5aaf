//! The nine detection rules.
//!
//! All rules read a newest-first history: `history[0]` is the latest
//! snapshot, and `history[i] - history[i + 1]` is growth over one period.
//! Each rule emits at most one flag; rules are gated by minimum history
//! length before they run.

use std::collections::HashMap;

use chrono::Timelike;
use clipstats_core::{Platform, StatsHistoryEntry};

use crate::growth::{growth_rate, mean, std_dev};
use crate::result::{BotDetectionResult, BotFlag, FlagKind, Severity};
use crate::thresholds::{thresholds_for, PlatformThresholds};

/// Run every applicable rule over the history.
///
/// Histories shorter than two entries cannot be judged and produce the empty
/// result. An unrecognized platform (`None`) is evaluated against the
/// default (YouTube) thresholds.
#[must_use]
pub fn detect(platform: Option<Platform>, history: &[StatsHistoryEntry]) -> BotDetectionResult {
    if history.len() < 2 {
        return BotDetectionResult::empty();
    }

    let t = thresholds_for(platform);
    let mut flags = Vec::new();

    flags.extend(views_spike(t, history));
    flags.extend(likes_spike(t, history));
    flags.extend(comments_spike(t, history));
    flags.extend(engagement_ratio(t, history));

    if history.len() >= 5 {
        flags.extend(zero_variance(history));
        flags.extend(velocity_anomaly(history));
        flags.extend(ratio_anomaly(history));
    }

    if history.len() >= 12 {
        flags.extend(sudden_stop(history));
    }

    if history.len() >= 24 {
        flags.extend(time_pattern(history));
    }

    BotDetectionResult::from_flags(flags)
}

fn fmt_growth(growth: f64) -> String {
    if growth.is_infinite() {
        "from a zero baseline".to_string()
    } else {
        format!("{growth:.0}%")
    }
}

fn views_spike(t: &PlatformThresholds, history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let latest = &history[0];
    let previous = &history[1];
    let growth = growth_rate(previous.views, latest.views);
    let delta = latest.views.saturating_sub(previous.views);

    if growth > t.views_spike.high && delta > 2 * t.min_views {
        Some(BotFlag {
            kind: FlagKind::ViewsSpike,
            severity: Severity::High,
            description: format!(
                "views grew {} in one period (+{delta})",
                fmt_growth(growth)
            ),
            confidence: 90,
        })
    } else if growth > t.views_spike.medium && delta > t.min_views {
        Some(BotFlag {
            kind: FlagKind::ViewsSpike,
            severity: Severity::Medium,
            description: format!(
                "views grew {} in one period (+{delta})",
                fmt_growth(growth)
            ),
            confidence: 70,
        })
    } else {
        None
    }
}

fn likes_spike(t: &PlatformThresholds, history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let latest = &history[0];
    let previous = &history[1];
    let growth = growth_rate(previous.likes, latest.likes);
    let delta = latest.likes.saturating_sub(previous.likes);

    if growth > t.likes_spike.high && delta > 100 {
        Some(BotFlag {
            kind: FlagKind::LikesSpike,
            severity: Severity::High,
            description: format!(
                "likes grew {} in one period (+{delta})",
                fmt_growth(growth)
            ),
            confidence: 85,
        })
    } else if growth > t.likes_spike.medium && delta > 50 {
        Some(BotFlag {
            kind: FlagKind::LikesSpike,
            severity: Severity::Medium,
            description: format!(
                "likes grew {} in one period (+{delta})",
                fmt_growth(growth)
            ),
            confidence: 65,
        })
    } else {
        None
    }
}

fn comments_spike(t: &PlatformThresholds, history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let latest = &history[0];
    let previous = &history[1];
    let growth = growth_rate(previous.comments, latest.comments);
    let delta = latest.comments.saturating_sub(previous.comments);

    (growth > t.comments_spike.high && delta > 50).then(|| BotFlag {
        kind: FlagKind::CommentsSpike,
        severity: Severity::High,
        description: format!(
            "comments grew {} in one period (+{delta})",
            fmt_growth(growth)
        ),
        confidence: 88,
    })
}

fn engagement_ratio(t: &PlatformThresholds, history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let latest = &history[0];
    if latest.views == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = (latest.likes + latest.comments) as f64 / latest.views as f64;

    if ratio > t.engagement_ratio.high && latest.views > t.min_views {
        Some(BotFlag {
            kind: FlagKind::EngagementRatio,
            severity: Severity::High,
            description: format!(
                "engagement ratio {ratio:.2} across {} views",
                latest.views
            ),
            confidence: 92,
        })
    } else if ratio > t.engagement_ratio.medium {
        Some(BotFlag {
            kind: FlagKind::EngagementRatio,
            severity: Severity::Medium,
            description: format!(
                "engagement ratio {ratio:.2} across {} views",
                latest.views
            ),
            confidence: 75,
        })
    } else {
        None
    }
}

/// Near-constant percentage growth is a scripted-traffic signature: organic
/// curves wobble, schedulers do not. The volume gate (mean per-period view
/// gain > 20) keeps dormant clips from qualifying on noise.
fn zero_variance(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let growths: Vec<f64> = history
        .windows(2)
        .map(|pair| growth_rate(pair[1].views, pair[0].views))
        .filter(|g| g.is_finite())
        .collect();
    if growths.len() < 5 {
        return None;
    }

    let growth_mean = mean(&growths);
    if growth_mean.abs() < f64::EPSILON {
        return None;
    }
    let cv = std_dev(&growths) / growth_mean.abs();

    #[allow(clippy::cast_precision_loss)]
    let mean_delta = history
        .windows(2)
        .map(|pair| pair[0].views as f64 - pair[1].views as f64)
        .sum::<f64>()
        / (history.len() - 1) as f64;

    (cv < 0.1 && mean_delta > 20.0).then(|| BotFlag {
        kind: FlagKind::ZeroVariance,
        severity: Severity::High,
        description: format!(
            "view growth is near-constant ({:.1}% per period, cv {cv:.3})",
            growth_mean
        ),
        confidence: 95,
    })
}

fn velocity_anomaly(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    #[allow(clippy::cast_precision_loss)]
    let velocities: Vec<f64> = history
        .windows(2)
        .map(|pair| pair[0].views as f64 - pair[1].views as f64)
        .collect();
    let accelerations: Vec<f64> = velocities
        .windows(2)
        .map(|pair| pair[0] - pair[1])
        .collect();
    if accelerations.is_empty() {
        return None;
    }

    let max_abs = accelerations.iter().map(|a| a.abs()).fold(0.0, f64::max);
    let avg = mean(&accelerations);

    (max_abs > 5.0 * avg && max_abs > 1000.0).then(|| BotFlag {
        kind: FlagKind::VelocityAnomaly,
        severity: Severity::High,
        description: format!(
            "view acceleration peaked at {max_abs:.0} against a {avg:.0} average"
        ),
        confidence: 85,
    })
}

fn ratio_anomaly(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let latest = &history[0];
    if latest.views < 100 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let likes_ratio = latest.likes as f64 / latest.views as f64;
    #[allow(clippy::cast_precision_loss)]
    let comments_ratio = latest.comments as f64 / latest.views as f64;

    if likes_ratio > 0.15 && latest.views > 1000 {
        Some(BotFlag {
            kind: FlagKind::RatioAnomaly,
            severity: Severity::High,
            description: format!(
                "likes/views ratio {likes_ratio:.2} at {} views",
                latest.views
            ),
            confidence: 90,
        })
    } else if comments_ratio > 0.05 && latest.views > 1000 {
        Some(BotFlag {
            kind: FlagKind::RatioAnomaly,
            severity: Severity::Medium,
            description: format!(
                "comments/views ratio {comments_ratio:.2} at {} views",
                latest.views
            ),
            confidence: 75,
        })
    } else {
        None
    }
}

/// Average per-step view delta over a six-sample window (five deltas).
#[allow(clippy::cast_precision_loss)]
fn window_avg_growth(window: &[StatsHistoryEntry]) -> f64 {
    let deltas: Vec<f64> = window
        .windows(2)
        .map(|pair| pair[0].views as f64 - pair[1].views as f64)
        .collect();
    mean(&deltas)
}

/// Bot campaigns stop abruptly when the buyer's budget runs out; organic
/// interest decays gradually.
fn sudden_stop(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let recent_avg = window_avg_growth(&history[0..6]);
    let previous_avg = window_avg_growth(&history[6..12]);

    (previous_avg > 500.0 && recent_avg < 0.1 * previous_avg).then(|| BotFlag {
        kind: FlagKind::SuddenStop,
        severity: Severity::Medium,
        description: format!(
            "average growth fell from {previous_avg:.0} to {recent_avg:.0} views per period"
        ),
        confidence: 70,
    })
}

/// Growth concentrated in one hour of the day points at scheduled delivery.
fn time_pattern(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    let mut buckets: HashMap<u32, f64> = HashMap::new();
    for pair in history.windows(2) {
        #[allow(clippy::cast_precision_loss)]
        let delta = pair[0].views as f64 - pair[1].views as f64;
        *buckets.entry(pair[0].recorded_at.hour()).or_insert(0.0) += delta;
    }

    let (&max_hour, &max_bucket) = buckets
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    let values: Vec<f64> = buckets.values().copied().collect();
    let avg_bucket = mean(&values);

    (max_bucket > 8.0 * avg_bucket && max_bucket > 5000.0).then(|| BotFlag {
        kind: FlagKind::TimePattern,
        severity: Severity::Medium,
        description: format!(
            "hour {max_hour:02} accounts for {max_bucket:.0} view growth against a {avg_bucket:.0} hourly average"
        ),
        confidence: 70,
    })
}
