//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Duration, Utc};
use scheduler_core::domains::jobs::{Job, JobId, NewJob, TaskKind};
use scheduler_core::domains::targets::{ScrapeTarget, TargetKind};
use scheduler_core::kernel::{
    DispatchRunner, DispatchRunnerConfig, SchedulerDeps, ServiceEndpoints,
};
use sqlx::PgPool;
use url::Url;

/// Base URLs for the four downstream services, resolvable only in tests.
pub fn stub_endpoints() -> ServiceEndpoints {
    ServiceEndpoints {
        scraping: Url::parse("http://scraping.test:5000").unwrap(),
        media_gen: Url::parse("http://media-gen.test:5001").unwrap(),
        instagram: Url::parse("http://instagram.test:5002").unwrap(),
        whatsapp: Url::parse("http://whatsapp.test:5003").unwrap(),
    }
}

/// A dispatch runner with test-friendly timings over the given deps.
pub fn test_runner(deps: SchedulerDeps, max_attempts: i32) -> DispatchRunner {
    let config = DispatchRunnerConfig {
        poll_interval: StdDuration::from_millis(10),
        max_attempts,
        retry_backoff: StdDuration::from_secs(60),
        worker_id: "test-dispatcher".to_string(),
        ..Default::default()
    };
    DispatchRunner::new(deps, config)
}

/// Create a job of `kind` that is already overdue.
pub async fn create_due_job(pool: &PgPool, kind: TaskKind) -> Result<Job> {
    let job = Job::create(NewJob::for_kind(kind, Utc::now() - Duration::hours(1)), pool).await?;
    Ok(job)
}

/// Create a job of `kind` scheduled well in the future.
pub async fn create_future_job(pool: &PgPool, kind: TaskKind) -> Result<Job> {
    let job = Job::create(NewJob::for_kind(kind, Utc::now() + Duration::hours(6)), pool).await?;
    Ok(job)
}

/// Create a scrape target.
pub async fn create_target(
    pool: &PgPool,
    name: &str,
    kind: TargetKind,
    frequency_hours: i32,
) -> Result<ScrapeTarget> {
    let target =
        ScrapeTarget::create(name, "https://example.com/feed", kind, frequency_hours, pool).await?;
    Ok(target)
}

/// Pull a job's scheduled date into the past so the next cycle sees it.
pub async fn make_due(pool: &PgPool, job_id: JobId) -> Result<()> {
    sqlx::query("UPDATE jobs SET scheduled_date = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Total number of rows in the jobs table.
pub async fn count_jobs(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of jobs of one task kind.
pub async fn count_jobs_of_kind(pool: &PgPool, kind: TaskKind) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs WHERE task_kind = $1")
        .bind(kind)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
