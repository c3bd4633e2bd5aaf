pub mod campaign_cache;
pub mod collector;
pub mod rankings;

pub use campaign_cache::CampaignCacheService;
pub use collector::{BatchOutcome, ClipRef, CollectorError, StatsCollector};
pub use rankings::RankingsEngine;
