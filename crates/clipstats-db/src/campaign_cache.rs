//! Local mirror of campaign metadata.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignCacheRow {
    pub id: String,
    pub title: String,
    pub status: String,
    pub synced_at: DateTime<Utc>,
}

/// Upsert a campaign row. `title` is `None` for status-change events, which
/// carry no title; the stored title is kept in that case.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn upsert_campaign_cache(
    pool: &PgPool,
    id: &str,
    title: Option<&str>,
    status: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO campaign_cache (id, title, status, synced_at) \
         VALUES ($1, COALESCE($2, ''), $3, NOW()) \
         ON CONFLICT (id) DO UPDATE SET \
           title = COALESCE($2, campaign_cache.title), \
           status = EXCLUDED.status, \
           synced_at = NOW()",
    )
    .bind(id)
    .bind(title)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch a cached campaign row, if present.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn get_campaign_cache(
    pool: &PgPool,
    id: &str,
) -> Result<Option<CampaignCacheRow>, DbError> {
    let row = sqlx::query_as::<_, CampaignCacheRow>(
        "SELECT id, title, status, synced_at FROM campaign_cache WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
