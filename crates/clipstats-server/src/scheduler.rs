//! Background job scheduler.
//!
//! Two recurring jobs: the hourly batch refresh of clips clip-service marks
//! as due, and the nightly ranking recomputation. Job bodies catch and log
//! every error — a failed tick never takes the process down.

use std::sync::Arc;

use clipstats_core::Platform;
use clipstats_peers::{Clip, ClipServiceClient};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::services::{ClipRef, RankingsEngine, StatsCollector};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    collector: Arc<StatsCollector>,
    clip_service: Arc<ClipServiceClient>,
    rankings: Arc<RankingsEngine>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_hourly_refresh_job(&scheduler, collector, clip_service).await?;
    register_daily_rankings_job(&scheduler, rankings).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Top of every hour: refresh every clip on clip-service's needs-refresh
/// list, paced by the collector.
async fn register_hourly_refresh_job(
    scheduler: &JobScheduler,
    collector: Arc<StatsCollector>,
    clip_service: Arc<ClipServiceClient>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let collector = Arc::clone(&collector);
        let clip_service = Arc::clone(&clip_service);

        Box::pin(async move {
            tracing::info!("scheduler: starting hourly stats refresh");
            run_hourly_refresh(&collector, &clip_service).await;
            tracing::info!("scheduler: hourly stats refresh complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn run_hourly_refresh(collector: &StatsCollector, clip_service: &ClipServiceClient) {
    let clips = match clip_service.needs_refresh().await {
        Ok(clips) => clips,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load needs-refresh list");
            return;
        }
    };

    if clips.is_empty() {
        tracing::info!("scheduler: no clips need a refresh");
        return;
    }

    let refs = clip_refs_from(clips);
    let outcome = collector.batch_refresh_stats(&refs).await;
    tracing::info!(
        success = outcome.success_count,
        failed = outcome.fail_count,
        "scheduler: batch refresh finished"
    );
}

/// Clips without a video id or with a platform this service does not track
/// are skipped with a warning rather than failing the whole batch.
fn clip_refs_from(clips: Vec<Clip>) -> Vec<ClipRef> {
    clips
        .into_iter()
        .filter_map(|clip| {
            let Some(video_id) = clip.platform_video_id else {
                tracing::warn!(clip_id = %clip.id, "skipping refresh — no platform video id");
                return None;
            };
            let Ok(platform) = clip.platform.parse::<Platform>() else {
                tracing::warn!(
                    clip_id = %clip.id,
                    platform = %clip.platform,
                    "skipping refresh — unknown platform"
                );
                return None;
            };
            Some(ClipRef {
                submission_id: clip.id,
                platform,
                video_id,
            })
        })
        .collect()
}

/// Midnight UTC: recompute both weekly rankings for the current week.
async fn register_daily_rankings_job(
    scheduler: &JobScheduler,
    rankings: Arc<RankingsEngine>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 0 * * *", move |_uuid, _lock| {
        let rankings = Arc::clone(&rankings);

        Box::pin(async move {
            tracing::info!("scheduler: starting daily ranking calculations");
            let (clips, campaigns) = tokio::join!(
                rankings.calculate_weekly_clip_rankings(None),
                rankings.calculate_weekly_campaign_rankings(None),
            );
            if let Err(e) = clips {
                tracing::error!(error = %e, "scheduler: weekly clip rankings failed");
            }
            if let Err(e) = campaigns {
                tracing::error!(error = %e, "scheduler: weekly campaign rankings failed");
            }
            tracing::info!("scheduler: daily ranking calculations complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
