//! Clip-stats read and refresh routes.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use clipstats_core::{Platform, PlatformStats};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::{Claims, RequestId};
use crate::services::{ClipRef, CollectorError};

/// Upper bound on one batch-refresh request; larger lists must be split.
const MAX_BATCH_CLIPS: usize = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsData {
    clip_id: String,
    views: u64,
    likes: u64,
    comments: u64,
    shares: u64,
    engagement: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    campaign: Option<CampaignData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignData {
    id: String,
    title: String,
    status: String,
}

impl StatsData {
    fn new(clip_id: String, stats: &PlatformStats) -> Self {
        Self {
            clip_id,
            views: stats.views,
            likes: stats.likes,
            comments: stats.comments,
            shares: stats.shares,
            engagement: stats.engagement(),
            campaign: None,
        }
    }
}

fn map_collector_error(request_id: String, clip_id: &str, error: &CollectorError) -> ApiError {
    match error {
        CollectorError::NoStats { .. } => ApiError::new(
            request_id,
            "not_found",
            format!("no platform document for clip {clip_id}"),
        ),
        other => {
            tracing::error!(clip_id, error = %other, "stats refresh failed");
            ApiError::new(request_id, "internal_error", "stats refresh failed")
        }
    }
}

struct ResolvedClip {
    submission_id: String,
    campaign_id: String,
    platform: Platform,
    video_id: String,
}

/// Resolve a clip to its platform coordinates, translating peer errors to
/// API errors.
async fn resolve_clip(
    state: &AppState,
    request_id: &str,
    clip_id: &str,
) -> Result<ResolvedClip, ApiError> {
    let clip = state.ctx.clip_service.get_clip(clip_id).await.map_err(|e| {
        if matches!(e, clipstats_peers::PeerError::NotFound { .. }) {
            ApiError::new(request_id.to_string(), "not_found", "clip not found")
        } else {
            tracing::error!(clip_id, error = %e, "clip lookup failed");
            ApiError::new(request_id.to_string(), "internal_error", "clip lookup failed")
        }
    })?;

    let Some(video_id) = clip.platform_video_id.clone() else {
        return Err(ApiError::new(
            request_id.to_string(),
            "not_found",
            "clip has no platform video id",
        ));
    };

    let platform = clip.platform.parse::<Platform>().map_err(|_| {
        tracing::error!(clip_id, platform = %clip.platform, "clip carries unknown platform");
        ApiError::new(
            request_id.to_string(),
            "internal_error",
            "clip platform is not supported",
        )
    })?;

    Ok(ResolvedClip {
        submission_id: clip.id,
        campaign_id: clip.campaign_id,
        platform,
        video_id,
    })
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(clip_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let clip = resolve_clip(&state, &request_id.0, &clip_id).await?;

    let stats = state
        .ctx
        .collector
        .get_or_fetch_stats(&clip.submission_id, clip.platform, &clip.video_id)
        .await
        .map_err(|e| map_collector_error(request_id.0.clone(), &clip_id, &e))?;

    // Best-effort campaign enrichment; a campaign-service outage must not
    // hide the counters.
    let campaign = match state.ctx.campaign_cache.get_campaign(&clip.campaign_id).await {
        Ok(row) => row.map(|row| CampaignData {
            id: row.id,
            title: row.title,
            status: row.status,
        }),
        Err(e) => {
            tracing::warn!(clip_id, error = %e, "campaign enrichment failed");
            None
        }
    };

    let mut data = StatsData::new(clip.submission_id, &stats);
    data.campaign = campaign;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(request_id.0),
    }))
}

pub(super) async fn refresh_stats(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(clip_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let clip = resolve_clip(&state, &request_id.0, &clip_id).await?;

    let stats = state
        .ctx
        .collector
        .refresh_clip_stats(&clip.submission_id, clip.platform, &clip.video_id)
        .await
        .map_err(|e| map_collector_error(request_id.0.clone(), &clip_id, &e))?;

    Ok(Json(ApiResponse {
        data: StatsData::new(clip.submission_id, &stats),
        meta: ResponseMeta::new(request_id.0),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BatchRefreshRequest {
    clips: Vec<BatchClip>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchClip {
    submission_id: String,
    platform: String,
    video_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRefreshData {
    success_count: usize,
    fail_count: usize,
}

pub(super) async fn batch_refresh(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<BatchRefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !claims.is_staff() {
        return Err(ApiError::new(
            request_id.0,
            "forbidden",
            "staff role required",
        ));
    }

    if request.clips.len() > MAX_BATCH_CLIPS {
        return Err(ApiError::new(
            request_id.0,
            "validation_error",
            format!("batch size exceeds {MAX_BATCH_CLIPS} clips"),
        ));
    }

    let mut refs = Vec::with_capacity(request.clips.len());
    for clip in &request.clips {
        let platform = clip.platform.parse::<Platform>().map_err(|_| {
            ApiError::new(
                request_id.0.clone(),
                "validation_error",
                format!("unknown platform: {}", clip.platform),
            )
        })?;
        refs.push(ClipRef {
            submission_id: clip.submission_id.clone(),
            platform,
            video_id: clip.video_id.clone(),
        });
    }

    let outcome = state.ctx.collector.batch_refresh_stats(&refs).await;

    Ok(Json(ApiResponse {
        data: BatchRefreshData {
            success_count: outcome.success_count,
            fail_count: outcome.fail_count,
        },
        meta: ResponseMeta::new(request_id.0),
    }))
}
