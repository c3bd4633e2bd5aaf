//! Campaign metadata mirror.
//!
//! Rows are written by the `campaign.created` / `campaign.status_changed`
//! handlers and refreshed by a pull from campaign-service when a read finds
//! them stale. A failed pull serves the stale row rather than nothing.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clipstats_db::CampaignCacheRow;
use clipstats_peers::CampaignServiceClient;
use sqlx::PgPool;
use thiserror::Error;

/// Rows older than this are re-pulled on read.
const STALENESS_MINUTES: i64 = 5;

#[derive(Debug, Error)]
pub enum CampaignCacheError {
    #[error(transparent)]
    Db(#[from] clipstats_db::DbError),

    #[error(transparent)]
    Peer(#[from] clipstats_peers::PeerError),
}

fn is_fresh(synced_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - synced_at < Duration::minutes(STALENESS_MINUTES)
}

pub struct CampaignCacheService {
    pool: PgPool,
    campaign_service: Arc<CampaignServiceClient>,
}

impl CampaignCacheService {
    #[must_use]
    pub fn new(pool: PgPool, campaign_service: Arc<CampaignServiceClient>) -> Self {
        Self {
            pool,
            campaign_service,
        }
    }

    /// Handle `campaign.created`: new campaigns enter as ACTIVE.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignCacheError::Db`] on upsert failure.
    pub async fn apply_created(
        &self,
        campaign_id: &str,
        title: &str,
    ) -> Result<(), CampaignCacheError> {
        clipstats_db::upsert_campaign_cache(&self.pool, campaign_id, Some(title), "ACTIVE")
            .await?;
        Ok(())
    }

    /// Handle `campaign.status_changed`: the event carries no title, so the
    /// stored one is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignCacheError::Db`] on upsert failure.
    pub async fn apply_status_changed(
        &self,
        campaign_id: &str,
        new_status: &str,
    ) -> Result<(), CampaignCacheError> {
        clipstats_db::upsert_campaign_cache(&self.pool, campaign_id, None, new_status).await?;
        Ok(())
    }

    /// Read a campaign, pulling from campaign-service when the mirror is
    /// stale or missing. A pull failure falls back to the stale row when one
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignCacheError`] when the row is absent and the pull
    /// fails, or on database failure.
    pub async fn get_campaign(
        &self,
        campaign_id: &str,
    ) -> Result<Option<CampaignCacheRow>, CampaignCacheError> {
        let cached = clipstats_db::get_campaign_cache(&self.pool, campaign_id).await?;

        if let Some(row) = &cached {
            if is_fresh(row.synced_at, Utc::now()) {
                return Ok(cached);
            }
        }

        match self.campaign_service.get_campaign(campaign_id).await {
            Ok(campaign) => {
                clipstats_db::upsert_campaign_cache(
                    &self.pool,
                    &campaign.id,
                    Some(&campaign.title),
                    &campaign.status,
                )
                .await?;
                Ok(clipstats_db::get_campaign_cache(&self.pool, campaign_id).await?)
            }
            Err(e) => {
                if cached.is_some() {
                    tracing::warn!(
                        campaign_id,
                        error = %e,
                        "campaign pull failed — serving stale cache row"
                    );
                    Ok(cached)
                } else {
                    Err(e.into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_is_fresh_within_five_minutes() {
        let now = Utc::now();
        assert!(is_fresh(now - Duration::minutes(4), now));
        assert!(is_fresh(now - Duration::seconds(299), now));
    }

    #[test]
    fn row_is_stale_at_five_minutes() {
        let now = Utc::now();
        assert!(!is_fresh(now - Duration::minutes(5), now));
        assert!(!is_fresh(now - Duration::hours(2), now));
    }
}
