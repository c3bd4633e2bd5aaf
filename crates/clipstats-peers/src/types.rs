use serde::Deserialize;

/// A clip (submission) as served by clip-service.
///
/// `platform` is kept as the raw wire string: the collector parses it
/// strictly (unknown platform is an error there), while the bot detector
/// parses it leniently and falls back to default thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    pub campaign_id: String,
    pub user_id: String,
    pub platform: String,
    pub platform_video_id: Option<String>,
}

/// Per-clip weekly aggregate used as ranking input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipAggregate {
    pub submission_id: String,
    pub platform: String,
    pub views: i64,
    pub likes: i64,
    pub engagement: f64,
}

/// Per-campaign weekly aggregate used as ranking input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAggregate {
    pub campaign_id: String,
    pub total_views: i64,
    pub total_likes: i64,
    pub avg_engagement: f64,
    pub clips_count: i32,
}

/// Campaign metadata as served by campaign-service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub status: String,
}
