//! Weekly ranking calculations.
//!
//! Both runs pull pre-aggregated week slices from clip-service, sort them,
//! assign dense 1-based ranks, and upsert the rows. The sort and rank
//! assignment are pure so the ordering contract is unit-testable without a
//! database.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc};
use clipstats_db::{WeeklyCampaignRankingRow, WeeklyClipRankingRow};
use clipstats_peers::{CampaignAggregate, ClipAggregate, ClipServiceClient, PeerError};
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingsError {
    #[error(transparent)]
    Peer(#[from] PeerError),

    #[error(transparent)]
    Db(#[from] clipstats_db::DbError),
}

/// Monday and Sunday of the target ISO week. `week_start` overrides the
/// default (the Monday of `today`'s week).
#[must_use]
pub fn week_bounds(today: NaiveDate, week_start: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    let start = week_start.unwrap_or_else(|| {
        today - Days::new(u64::from(today.weekday().num_days_from_monday()))
    });
    (start, start + Days::new(6))
}

/// Sort clip aggregates by views, ties broken by engagement, and assign
/// dense 1-based ranks. The sort is stable, so equal rows keep input order.
#[must_use]
pub fn rank_clips(mut aggregates: Vec<ClipAggregate>) -> Vec<(ClipAggregate, i32)> {
    aggregates.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then_with(|| b.engagement.total_cmp(&a.engagement))
    });
    aggregates
        .into_iter()
        .enumerate()
        .map(|(i, agg)| (agg, i32::try_from(i + 1).unwrap_or(i32::MAX)))
        .collect()
}

/// Campaign analogue of [`rank_clips`]: total views, then average engagement.
#[must_use]
pub fn rank_campaigns(mut aggregates: Vec<CampaignAggregate>) -> Vec<(CampaignAggregate, i32)> {
    aggregates.sort_by(|a, b| {
        b.total_views
            .cmp(&a.total_views)
            .then_with(|| b.avg_engagement.total_cmp(&a.avg_engagement))
    });
    aggregates
        .into_iter()
        .enumerate()
        .map(|(i, agg)| (agg, i32::try_from(i + 1).unwrap_or(i32::MAX)))
        .collect()
}

pub struct RankingsEngine {
    pool: PgPool,
    clip_service: Arc<ClipServiceClient>,
}

impl RankingsEngine {
    #[must_use]
    pub fn new(pool: PgPool, clip_service: Arc<ClipServiceClient>) -> Self {
        Self { pool, clip_service }
    }

    /// Recompute one week's clip rankings from scratch. Returns the number
    /// of rows upserted; an empty aggregate set is a silent no-op.
    ///
    /// # Errors
    ///
    /// Peer fetch failures and database failures abort the run.
    pub async fn calculate_weekly_clip_rankings(
        &self,
        week_start: Option<NaiveDate>,
    ) -> Result<usize, RankingsError> {
        let (week_start, week_end) = week_bounds(Utc::now().date_naive(), week_start);

        let aggregates = self
            .clip_service
            .approved_for_rankings(week_start, week_end)
            .await?;
        if aggregates.is_empty() {
            tracing::info!(%week_start, "no approved clips for week — skipping clip rankings");
            return Ok(0);
        }

        let ranked = rank_clips(aggregates);
        let count = ranked.len();

        for (agg, rank) in ranked {
            let row = WeeklyClipRankingRow {
                week_start,
                submission_id: agg.submission_id,
                week_end,
                platform: agg.platform,
                views: agg.views,
                likes: agg.likes,
                engagement: agg.engagement,
                rank,
            };
            clipstats_db::upsert_weekly_clip_ranking(&self.pool, &row).await?;
        }

        tracing::info!(%week_start, rows = count, "weekly clip rankings calculated");
        Ok(count)
    }

    /// Recompute one week's campaign rankings from scratch.
    ///
    /// # Errors
    ///
    /// Peer fetch failures and database failures abort the run.
    pub async fn calculate_weekly_campaign_rankings(
        &self,
        week_start: Option<NaiveDate>,
    ) -> Result<usize, RankingsError> {
        let (week_start, week_end) = week_bounds(Utc::now().date_naive(), week_start);

        let aggregates = self
            .clip_service
            .campaign_stats_for_rankings(week_start, week_end)
            .await?;
        if aggregates.is_empty() {
            tracing::info!(%week_start, "no campaign stats for week — skipping campaign rankings");
            return Ok(0);
        }

        let ranked = rank_campaigns(aggregates);
        let count = ranked.len();

        for (agg, rank) in ranked {
            let row = WeeklyCampaignRankingRow {
                week_start,
                campaign_id: agg.campaign_id,
                week_end,
                total_views: agg.total_views,
                total_likes: agg.total_likes,
                avg_engagement: agg.avg_engagement,
                clips_count: agg.clips_count,
                rank,
            };
            clipstats_db::upsert_weekly_campaign_ranking(&self.pool, &row).await?;
        }

        tracing::info!(%week_start, rows = count, "weekly campaign rankings calculated");
        Ok(count)
    }
}
