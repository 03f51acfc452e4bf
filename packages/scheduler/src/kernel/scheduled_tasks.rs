//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! One periodic task: weekly planning. Every Sunday at midnight UTC the
//! planner lays out the upcoming week's content and scrape jobs. Planning
//! only inserts rows; the dispatch runner picks them up as they come due.
//!
//! ```text
//! Scheduler (Sunday 00:00 UTC)
//!     │
//!     └─► run_weekly_planning()
//!             ├─► schedule_weekly_content_jobs()   (create media + post slots)
//!             └─► schedule_weekly_scrape_jobs()    (per scrape target)
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::planner::{schedule_weekly_content_jobs, schedule_weekly_scrape_jobs};

/// Start all scheduled tasks
pub async fn start_scheduler(pool: PgPool) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Weekly planning - runs every Sunday at midnight UTC
    let planning_pool = pool.clone();
    let planning_job = Job::new_async("0 0 0 * * SUN", move |_uuid, _lock| {
        let pool = planning_pool.clone();
        Box::pin(async move {
            if let Err(e) = run_weekly_planning(&pool).await {
                tracing::error!("Weekly planning task failed: {}", e);
            }
        })
    })?;

    scheduler.add(planning_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (weekly planning every Sunday at midnight UTC)");
    Ok(scheduler)
}

/// Run the weekly planning task
///
/// Plans content and scrape jobs for the week starting next Monday.
/// Inserts are keyed on (task_name, scheduled_date), so running this more
/// than once for the same week adds nothing.
pub async fn run_weekly_planning(pool: &PgPool) -> Result<()> {
    tracing::info!("Running weekly planning task");

    let today = Utc::now().date_naive();

    let content_jobs = schedule_weekly_content_jobs(today, pool)
        .await
        .context("Failed to schedule weekly content jobs")?;
    let scrape_jobs = schedule_weekly_scrape_jobs(today, pool)
        .await
        .context("Failed to schedule weekly scrape jobs")?;

    tracing::info!(
        "Weekly planning complete: {} content jobs, {} scrape jobs created",
        content_jobs,
        scrape_jobs
    );

    Ok(())
}
