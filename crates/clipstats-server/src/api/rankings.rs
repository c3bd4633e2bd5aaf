//! Weekly ranking read routes and the staff recalculation trigger.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use clipstats_core::Platform;
use serde::{Deserialize, Serialize};

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::{Claims, RequestId};
use crate::services::rankings::week_bounds;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WeeklyClipsQuery {
    week_start: Option<NaiveDate>,
    limit: Option<i64>,
    platform: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClipRankingData {
    week_start: NaiveDate,
    week_end: NaiveDate,
    submission_id: String,
    platform: String,
    views: i64,
    likes: i64,
    engagement: f64,
    rank: i32,
}

pub(super) async fn weekly_clips(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<WeeklyClipsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let platform = match &query.platform {
        Some(raw) => Some(raw.parse::<Platform>().map_err(|_| {
            ApiError::new(
                request_id.0.clone(),
                "validation_error",
                format!("unknown platform: {raw}"),
            )
        })?),
        None => None,
    };

    let (week_start, _) = week_bounds(Utc::now().date_naive(), query.week_start);
    let limit = normalize_limit(query.limit);

    let rows = clipstats_db::list_weekly_clip_rankings(
        &state.ctx.pool,
        week_start,
        platform.map(Platform::as_str),
        limit,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "weekly clip rankings query failed");
        ApiError::new(request_id.0.clone(), "internal_error", "rankings query failed")
    })?;

    let data: Vec<ClipRankingData> = rows
        .into_iter()
        .map(|row| ClipRankingData {
            week_start: row.week_start,
            week_end: row.week_end,
            submission_id: row.submission_id,
            platform: row.platform,
            views: row.views,
            likes: row.likes,
            engagement: row.engagement,
            rank: row.rank,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(request_id.0),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WeeklyCampaignsQuery {
    week_start: Option<NaiveDate>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignRankingData {
    week_start: NaiveDate,
    week_end: NaiveDate,
    campaign_id: String,
    total_views: i64,
    total_likes: i64,
    avg_engagement: f64,
    clips_count: i32,
    rank: i32,
}

pub(super) async fn weekly_campaigns(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<WeeklyCampaignsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (week_start, _) = week_bounds(Utc::now().date_naive(), query.week_start);
    let limit = normalize_limit(query.limit);

    let rows = clipstats_db::list_weekly_campaign_rankings(&state.ctx.pool, week_start, limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "weekly campaign rankings query failed");
            ApiError::new(request_id.0.clone(), "internal_error", "rankings query failed")
        })?;

    let data: Vec<CampaignRankingData> = rows
        .into_iter()
        .map(|row| CampaignRankingData {
            week_start: row.week_start,
            week_end: row.week_end,
            campaign_id: row.campaign_id,
            total_views: row.total_views,
            total_likes: row.total_likes,
            avg_engagement: row.avg_engagement,
            clips_count: row.clips_count,
            rank: row.rank,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(request_id.0),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CalculateRequest {
    week_start: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateData {
    clip_rows: usize,
    campaign_rows: usize,
}

pub(super) async fn calculate(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(claims): Extension<Claims>,
    body: Option<Json<CalculateRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    if !claims.is_staff() {
        return Err(ApiError::new(
            request_id.0,
            "forbidden",
            "staff role required",
        ));
    }

    let week_start = body.map(|Json(b)| b.week_start).unwrap_or_default();

    let (clips, campaigns) = tokio::join!(
        state.ctx.rankings.calculate_weekly_clip_rankings(week_start),
        state
            .ctx
            .rankings
            .calculate_weekly_campaign_rankings(week_start),
    );

    let clip_rows = clips.map_err(|e| {
        tracing::error!(error = %e, "clip ranking calculation failed");
        ApiError::new(
            request_id.0.clone(),
            "internal_error",
            "clip ranking calculation failed",
        )
    })?;
    let campaign_rows = campaigns.map_err(|e| {
        tracing::error!(error = %e, "campaign ranking calculation failed");
        ApiError::new(
            request_id.0.clone(),
            "internal_error",
            "campaign ranking calculation failed",
        )
    })?;

    Ok(Json(ApiResponse {
        data: CalculateData {
            clip_rows,
            campaign_rows,
        },
        meta: ResponseMeta::new(request_id.0),
    }))
}
