//! Pipeline stage contract.
//!
//! A logical workflow ("generate media, then post it") is a chain of
//! independently scheduled jobs linked by asset references, not a scheduler
//! dependency graph. The downstream services drive their own stage's
//! completion through the operations here:
//!
//! ```text
//! create media ──complete_media_generation──► post image instagram
//!      │                                      post image whatsapp
//!      └─begin_video_generation─► monitor video ──┐
//!                ▲                                │ still processing:
//!                └── re-poll (awaiting_completion)┘ bump + wait
//!                                 │
//!            complete_video_generation ──► post video instagram
//!                                          post video whatsapp
//! ```
//!
//! Successor jobs are scheduled a day in the past so the very next dispatch
//! cycle picks them up.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::domains::media::{MediaAsset, MediaKind, NewMediaAsset};

use super::job::{Job, JobId, JobStatus, NewJob};
use super::task::TaskKind;

/// The posting successors an asset fans out to.
fn post_kinds(kind: MediaKind) -> [TaskKind; 2] {
    match kind {
        MediaKind::Image => [TaskKind::PostImageInstagram, TaskKind::PostImageWhatsapp],
        MediaKind::Video => [TaskKind::PostVideoInstagram, TaskKind::PostVideoWhatsapp],
    }
}

/// Load a claimed job and check it belongs to the expected stage.
async fn claimed_job_of_kind(job_id: JobId, expected: TaskKind, pool: &PgPool) -> Result<Job> {
    let job = Job::find_by_id(job_id, pool).await?;
    if job.kind() != Some(expected) {
        anyhow::bail!(
            "job {} is not a '{}' job (task '{}')",
            job.id,
            expected,
            job.task_name
        );
    }
    if job.status != JobStatus::InProgress {
        anyhow::bail!(
            "job {} has not been claimed for dispatch (status {:?})",
            job.id,
            job.status
        );
    }
    Ok(job)
}

async fn spawn_post_jobs(asset: &MediaAsset, pool: &PgPool) -> Result<Vec<Job>> {
    let eligible_at = Utc::now() - Duration::days(1);
    let mut successors = Vec::with_capacity(2);
    for kind in post_kinds(asset.kind) {
        let job = Job::create(
            NewJob::builder()
                .task_name(kind.task_name())
                .task_kind(kind)
                .scheduled_date(eligible_at)
                .asset_ref_id(asset.id)
                .build(),
            pool,
        )
        .await?;
        successors.push(job);
    }
    Ok(successors)
}

/// Record a finished image generation: store the asset, complete the
/// create-media job, and enqueue its two posting successors.
pub async fn complete_media_generation(
    job_id: JobId,
    new_asset: NewMediaAsset,
    pool: &PgPool,
) -> Result<(MediaAsset, Vec<Job>)> {
    let job = claimed_job_of_kind(job_id, TaskKind::CreateMedia, pool).await?;

    let asset = MediaAsset::create(new_asset, pool).await?;
    Job::transition(job.id, JobStatus::Completed, None, pool).await?;
    let successors = spawn_post_jobs(&asset, pool).await?;

    info!(
        job_id = job.id,
        asset_id = asset.id,
        successors = successors.len(),
        "media generation completed, post jobs enqueued"
    );
    Ok((asset, successors))
}

/// Record that video generation was handed to the external provider: the
/// create-media job is done, and a monitor job carrying the provider's task
/// id takes over until the provider reports a result.
pub async fn begin_video_generation(
    job_id: JobId,
    external_task_id: &str,
    pool: &PgPool,
) -> Result<Job> {
    let job = claimed_job_of_kind(job_id, TaskKind::CreateMedia, pool).await?;

    Job::transition(job.id, JobStatus::Completed, None, pool).await?;
    let monitor = Job::create(
        NewJob::builder()
            .task_name(TaskKind::MonitorVideo.task_name())
            .task_kind(TaskKind::MonitorVideo)
            .scheduled_date(Utc::now())
            .external_task_id(external_task_id)
            .build(),
        pool,
    )
    .await?;

    info!(
        job_id = job.id,
        monitor_job_id = monitor.id,
        external_task_id,
        "video generation started, monitor job enqueued"
    );
    Ok(monitor)
}

/// The provider has not finished yet: park the monitor job until the next
/// poll time instead of burning a dispatch every cycle.
pub async fn video_still_processing(
    job_id: JobId,
    next_poll_at: DateTime<Utc>,
    pool: &PgPool,
) -> Result<()> {
    let job = claimed_job_of_kind(job_id, TaskKind::MonitorVideo, pool).await?;

    Job::reschedule(job.id, JobStatus::AwaitingCompletion, next_poll_at, None, pool).await?;
    info!(job_id = job.id, next_poll_at = %next_poll_at, "video still processing, monitor parked");
    Ok(())
}

/// The provider finished: store the asset, complete the monitor job, and
/// enqueue the two post-video successors.
pub async fn complete_video_generation(
    job_id: JobId,
    new_asset: NewMediaAsset,
    pool: &PgPool,
) -> Result<(MediaAsset, Vec<Job>)> {
    let job = claimed_job_of_kind(job_id, TaskKind::MonitorVideo, pool).await?;

    let asset = MediaAsset::create(new_asset, pool).await?;
    Job::transition(job.id, JobStatus::Completed, None, pool).await?;
    let successors = spawn_post_jobs(&asset, pool).await?;

    info!(
        job_id = job.id,
        asset_id = asset.id,
        successors = successors.len(),
        "video generation completed, post jobs enqueued"
    );
    Ok((asset, successors))
}

/// Terminal failure reported by a downstream stage.
pub async fn fail_stage(job_id: JobId, reason: &str, pool: &PgPool) -> Result<()> {
    Job::transition(job_id, JobStatus::Failed, Some(reason), pool).await?;
    warn!(job_id, reason, "pipeline stage failed");
    Ok(())
}
