use serde::{Deserialize, Serialize};

/// Payload of `stats.updated`, published after every successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsUpdated {
    pub clip_id: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub engagement: f64,
}

/// Payload of `stats.bot_detected`, published when a detection run produces
/// at least one medium- or high-severity flag. `confidence` is on a 0–1
/// scale (the engine's 0–100 score divided by 100).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDetected {
    pub clip_id: String,
    pub campaign_id: String,
    pub user_id: String,
    pub flag_type: String,
    pub confidence: f64,
    pub evidence: String,
}
