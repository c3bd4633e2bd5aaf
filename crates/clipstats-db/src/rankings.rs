//! Weekly ranking tables.
//!
//! Rows are upserted by the daily ranking run keyed on
//! `(week_start, submission_id)` / `(week_start, campaign_id)` and never
//! deleted — the tables are the platform's historical leaderboard record.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WeeklyClipRankingRow {
    pub week_start: NaiveDate,
    pub submission_id: String,
    pub week_end: NaiveDate,
    pub platform: String,
    pub views: i64,
    pub likes: i64,
    pub engagement: f64,
    pub rank: i32,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WeeklyCampaignRankingRow {
    pub week_start: NaiveDate,
    pub campaign_id: String,
    pub week_end: NaiveDate,
    pub total_views: i64,
    pub total_likes: i64,
    pub avg_engagement: f64,
    pub clips_count: i32,
    pub rank: i32,
}

/// Upsert one clip ranking row. On conflict the measured columns and rank
/// are replaced; the identity columns stay.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn upsert_weekly_clip_ranking(
    pool: &PgPool,
    row: &WeeklyClipRankingRow,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO weekly_clip_ranking \
           (week_start, submission_id, week_end, platform, views, likes, engagement, rank) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (week_start, submission_id) DO UPDATE SET \
           views = EXCLUDED.views, \
           likes = EXCLUDED.likes, \
           engagement = EXCLUDED.engagement, \
           rank = EXCLUDED.rank, \
           updated_at = NOW()",
    )
    .bind(row.week_start)
    .bind(&row.submission_id)
    .bind(row.week_end)
    .bind(&row.platform)
    .bind(row.views)
    .bind(row.likes)
    .bind(row.engagement)
    .bind(row.rank)
    .execute(pool)
    .await?;
    Ok(())
}

/// Upsert one campaign ranking row.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn upsert_weekly_campaign_ranking(
    pool: &PgPool,
    row: &WeeklyCampaignRankingRow,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO weekly_campaign_ranking \
           (week_start, campaign_id, week_end, total_views, total_likes, avg_engagement, \
            clips_count, rank) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (week_start, campaign_id) DO UPDATE SET \
           total_views = EXCLUDED.total_views, \
           total_likes = EXCLUDED.total_likes, \
           avg_engagement = EXCLUDED.avg_engagement, \
           clips_count = EXCLUDED.clips_count, \
           rank = EXCLUDED.rank, \
           updated_at = NOW()",
    )
    .bind(row.week_start)
    .bind(&row.campaign_id)
    .bind(row.week_end)
    .bind(row.total_views)
    .bind(row.total_likes)
    .bind(row.avg_engagement)
    .bind(row.clips_count)
    .bind(row.rank)
    .execute(pool)
    .await?;
    Ok(())
}

/// List one week's clip rankings in rank order, optionally filtered by
/// platform.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_weekly_clip_rankings(
    pool: &PgPool,
    week_start: NaiveDate,
    platform: Option<&str>,
    limit: i64,
) -> Result<Vec<WeeklyClipRankingRow>, DbError> {
    let rows = match platform {
        Some(platform) => {
            sqlx::query_as::<_, WeeklyClipRankingRow>(
                "SELECT week_start, submission_id, week_end, platform, views, likes, \
                        engagement, rank \
                 FROM weekly_clip_ranking \
                 WHERE week_start = $1 AND platform = $2 \
                 ORDER BY rank ASC LIMIT $3",
            )
            .bind(week_start)
            .bind(platform)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, WeeklyClipRankingRow>(
                "SELECT week_start, submission_id, week_end, platform, views, likes, \
                        engagement, rank \
                 FROM weekly_clip_ranking \
                 WHERE week_start = $1 \
                 ORDER BY rank ASC LIMIT $2",
            )
            .bind(week_start)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

/// List one week's campaign rankings in rank order.
///
/// # Errors
///
/// Returns `DbError` on database query failure.
pub async fn list_weekly_campaign_rankings(
    pool: &PgPool,
    week_start: NaiveDate,
    limit: i64,
) -> Result<Vec<WeeklyCampaignRankingRow>, DbError> {
    let rows = sqlx::query_as::<_, WeeklyCampaignRankingRow>(
        "SELECT week_start, campaign_id, week_end, total_views, total_likes, \
                avg_engagement, clips_count, rank \
         FROM weekly_campaign_ranking \
         WHERE week_start = $1 \
         ORDER BY rank ASC LIMIT $2",
    )
    .bind(week_start)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
