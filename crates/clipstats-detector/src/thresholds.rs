use clipstats_core::Platform;

/// A high/medium threshold pair. Spike pairs are growth-rate percentages;
/// the engagement pair is a plain ratio.
#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub high: f64,
    pub medium: f64,
}

/// Per-platform detection thresholds. `min_views` is the absolute activation
/// floor — spikes below it are organic-scale noise.
#[derive(Debug, Clone, Copy)]
pub struct PlatformThresholds {
    pub views_spike: Tier,
    pub likes_spike: Tier,
    pub comments_spike: Tier,
    pub engagement_ratio: Tier,
    pub min_views: u64,
}

const TIKTOK: PlatformThresholds = PlatformThresholds {
    views_spike: Tier {
        high: 800.0,
        medium: 300.0,
    },
    likes_spike: Tier {
        high: 400.0,
        medium: 200.0,
    },
    comments_spike: Tier {
        high: 500.0,
        medium: 250.0,
    },
    engagement_ratio: Tier {
        high: 0.40,
        medium: 0.25,
    },
    min_views: 500,
};

const INSTAGRAM: PlatformThresholds = PlatformThresholds {
    views_spike: Tier {
        high: 600.0,
        medium: 250.0,
    },
    likes_spike: Tier {
        high: 350.0,
        medium: 180.0,
    },
    comments_spike: Tier {
        high: 450.0,
        medium: 220.0,
    },
    engagement_ratio: Tier {
        high: 0.35,
        medium: 0.20,
    },
    min_views: 300,
};

const YOUTUBE: PlatformThresholds = PlatformThresholds {
    views_spike: Tier {
        high: 700.0,
        medium: 280.0,
    },
    likes_spike: Tier {
        high: 380.0,
        medium: 190.0,
    },
    comments_spike: Tier {
        high: 480.0,
        medium: 240.0,
    },
    engagement_ratio: Tier {
        high: 0.38,
        medium: 0.22,
    },
    min_views: 400,
};

/// Thresholds for a platform. `None` (a platform string the service does not
/// recognize) falls back to the YouTube row; Twitter shares it.
#[must_use]
pub fn thresholds_for(platform: Option<Platform>) -> &'static PlatformThresholds {
    match platform {
        Some(Platform::Tiktok) => &TIKTOK,
        Some(Platform::Instagram) => &INSTAGRAM,
        Some(Platform::Youtube) | Some(Platform::Twitter) | None => &YOUTUBE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiktok_has_the_highest_spike_bar() {
        let t = thresholds_for(Some(Platform::Tiktok));
        assert_eq!(t.views_spike.high, 800.0);
        assert_eq!(t.min_views, 500);
    }

    #[test]
    fn twitter_shares_youtube_thresholds() {
        let twitter = thresholds_for(Some(Platform::Twitter));
        let youtube = thresholds_for(Some(Platform::Youtube));
        assert_eq!(twitter.views_spike.high, youtube.views_spike.high);
        assert_eq!(twitter.min_views, youtube.min_views);
    }

    #[test]
    fn unknown_platform_falls_back_to_youtube() {
        let fallback = thresholds_for(None);
        assert_eq!(fallback.views_spike.high, 700.0);
        assert_eq!(fallback.engagement_ratio.high, 0.38);
    }
}
