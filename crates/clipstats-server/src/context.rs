//! Composition root state.
//!
//! All shared clients live here and are passed down explicitly — no
//! module-level singletons outside `main`.

use std::sync::Arc;

use clipstats_cache::StatsCache;
use clipstats_peers::ClipServiceClient;
use sqlx::PgPool;

use crate::services::{CampaignCacheService, RankingsEngine, StatsCollector};

#[derive(Clone)]
pub struct AppContext {
    pub pool: PgPool,
    pub cache: Arc<dyn StatsCache>,
    pub clip_service: Arc<ClipServiceClient>,
    pub collector: Arc<StatsCollector>,
    pub rankings: Arc<RankingsEngine>,
    pub campaign_cache: Arc<CampaignCacheService>,
}
