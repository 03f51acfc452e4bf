//! Dispatch runner - the polling loop that drives the job state machine.
//!
//! ```text
//! DispatchRunner
//!     │
//!     ├─► find due jobs (pending / awaiting_completion, scheduled_date <= now)
//!     ├─► claim each (atomic conditional update; losers skip)
//!     ├─► route by task kind and GET the downstream service
//!     └─► reconcile: 200 leaves in_progress, anything else
//!         reschedules with backoff or marks failed
//! ```
//!
//! Claiming happens before any network I/O, so overlapping cycles cannot
//! double-dispatch a job. A 200 is only transport-level success; the
//! downstream service owns the `completed` transition. Store errors never
//! kill the loop, and one job's failure never blocks the rest of a cycle.
//!
//! # Example
//!
//! ```ignore
//! let runner = DispatchRunner::new(deps, DispatchRunnerConfig::default());
//! tokio::spawn(async move { runner.run().await });
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domains::jobs::{Job, JobStatus, StoreError};
use crate::kernel::deps::SchedulerDeps;

/// Configuration for the dispatch runner.
#[derive(Debug, Clone)]
pub struct DispatchRunnerConfig {
    /// How often to scan for due jobs
    pub poll_interval: Duration,
    /// Maximum number of due jobs fetched per cycle
    pub batch_size: i64,
    /// Maximum dispatch calls in flight at once
    pub max_in_flight: usize,
    /// Dispatch attempts before a job is marked failed
    pub max_attempts: i32,
    /// Delay before the first retry; doubles per attempt, capped at an hour
    pub retry_backoff: Duration,
    /// Worker ID for this instance
    pub worker_id: String,
}

impl Default for DispatchRunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            batch_size: 50,
            max_in_flight: 8,
            max_attempts: 1,
            retry_backoff: Duration::from_secs(30),
            worker_id: format!("dispatcher-{}", Uuid::new_v4()),
        }
    }
}

/// What happened to one claimed job in a cycle.
enum DispatchOutcome {
    Delivered,
    Rescheduled,
    Failed,
}

/// Counters for one poll cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Jobs this cycle claimed
    pub claimed: usize,
    /// Due jobs another poller claimed first
    pub skipped: usize,
    /// Dispatched with a 200; downstream owns the rest
    pub delivered: usize,
    /// Failed dispatches pushed back to pending with backoff
    pub rescheduled: usize,
    /// Jobs marked failed
    pub failed: usize,
}

/// Background service that claims due jobs and dispatches them.
pub struct DispatchRunner {
    deps: SchedulerDeps,
    config: DispatchRunnerConfig,
    shutdown: Arc<AtomicBool>,
}

impl DispatchRunner {
    pub fn new(deps: SchedulerDeps, config: DispatchRunnerConfig) -> Self {
        Self {
            deps,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a shutdown handle for graceful shutdown.
    ///
    /// Call `store(true, Ordering::SeqCst)` on the returned Arc to stop the
    /// runner after its current cycle.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Request shutdown of the runner.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Run until shutdown is requested. Cycle errors are logged and the
    /// next cycle proceeds; the loop itself never crashes.
    pub async fn run(self) {
        info!(
            worker_id = %self.config.worker_id,
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            "dispatch runner starting"
        );

        loop {
            if self.is_shutdown_requested() {
                break;
            }

            match self.poll_once().await {
                Ok(stats) if stats.claimed > 0 || stats.skipped > 0 => {
                    info!(
                        claimed = stats.claimed,
                        delivered = stats.delivered,
                        rescheduled = stats.rescheduled,
                        failed = stats.failed,
                        skipped = stats.skipped,
                        "dispatch cycle complete"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    error!(error = %err, "dispatch cycle failed");
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        info!(worker_id = %self.config.worker_id, "dispatch runner stopped");
    }

    /// One claim-and-dispatch pass over the due jobs. Exposed separately
    /// from [`run`](Self::run) so a single cycle can be driven directly.
    pub async fn poll_once(&self) -> Result<CycleStats, StoreError> {
        let now = Utc::now();
        let due = Job::find_due(now, self.config.batch_size, &self.deps.db_pool).await?;
        if due.is_empty() {
            return Ok(CycleStats::default());
        }

        let mut stats = CycleStats::default();

        // Claim first, network later: a job is owned by exactly one cycle
        // before any I/O happens on its behalf.
        let mut claimed = Vec::new();
        for job in due {
            match Job::claim(job.id, &self.deps.db_pool).await? {
                Some(job) => {
                    stats.claimed += 1;
                    claimed.push(job);
                }
                None => {
                    debug!(job_id = job.id, "claim lost to another poller, skipping");
                    stats.skipped += 1;
                }
            }
        }

        let outcomes = stream::iter(claimed)
            .map(|job| self.dispatch_job(job))
            .buffer_unordered(self.config.max_in_flight)
            .collect::<Vec<_>>()
            .await;

        for outcome in outcomes {
            match outcome {
                Ok(DispatchOutcome::Delivered) => stats.delivered += 1,
                Ok(DispatchOutcome::Rescheduled) => stats.rescheduled += 1,
                Ok(DispatchOutcome::Failed) => stats.failed += 1,
                Err(err) => {
                    error!(error = %err, "failed to record dispatch outcome");
                }
            }
        }

        Ok(stats)
    }

    /// Dispatch one claimed job and reconcile the outcome into the store.
    async fn dispatch_job(&self, job: Job) -> Result<DispatchOutcome, StoreError> {
        let Some(kind) = job.kind() else {
            warn!(job_id = job.id, task_name = %job.task_name, "no dispatch route for task");
            let message = format!("no dispatch route for task '{}'", job.task_name);
            Job::transition(job.id, JobStatus::Failed, Some(&message), &self.deps.db_pool).await?;
            return Ok(DispatchOutcome::Failed);
        };

        let url = self.deps.endpoints.dispatch_url(kind, job.id);
        debug!(job_id = job.id, kind = %kind, url = %url, "dispatching");

        match self.deps.dispatch_client.dispatch(&url).await {
            Ok(200) => {
                // Transport said yes; the downstream service marks completed
                // (or reports failure) with its own business context.
                debug!(job_id = job.id, "dispatched");
                Ok(DispatchOutcome::Delivered)
            }
            Ok(status) => {
                let message = format!("downstream returned status {status} for {url}");
                self.fail_or_reschedule(&job, &message).await
            }
            Err(err) => {
                let message = err.to_string();
                self.fail_or_reschedule(&job, &message).await
            }
        }
    }

    /// Retry with backoff while attempts remain, otherwise mark failed.
    async fn fail_or_reschedule(&self, job: &Job, message: &str) -> Result<DispatchOutcome, StoreError> {
        if job.attempts < self.config.max_attempts {
            let delay_secs = backoff_secs(self.config.retry_backoff, job.attempts);
            let next_at = Utc::now() + chrono::Duration::seconds(delay_secs as i64);

            warn!(
                job_id = job.id,
                attempts = job.attempts,
                retry_in_secs = delay_secs,
                error = message,
                "dispatch failed, retrying"
            );
            Job::reschedule(job.id, JobStatus::Pending, next_at, Some(message), &self.deps.db_pool)
                .await?;
            Ok(DispatchOutcome::Rescheduled)
        } else {
            warn!(
                job_id = job.id,
                attempts = job.attempts,
                error = message,
                "dispatch failed, marking job failed"
            );
            Job::transition(job.id, JobStatus::Failed, Some(message), &self.deps.db_pool).await?;
            Ok(DispatchOutcome::Failed)
        }
    }
}

/// Delay before the next attempt: the base doubles with every attempt
/// already made, capped at an hour.
fn backoff_secs(base: Duration, attempts: i32) -> u64 {
    let exponent = (attempts - 1).max(0) as u32;
    2u64.checked_pow(exponent)
        .and_then(|factor| base.as_secs().checked_mul(factor))
        .map_or(3600, |secs| secs.min(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = DispatchRunnerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.max_attempts, 1);
        assert!(config.worker_id.starts_with("dispatcher-"));
    }

    #[test]
    fn backoff_doubles_per_attempt_and_caps_at_an_hour() {
        let base = Duration::from_secs(30);
        let delay = |attempts: i32| backoff_secs(base, attempts);
        assert_eq!(delay(1), 30);
        assert_eq!(delay(2), 60);
        assert_eq!(delay(3), 120);
        assert_eq!(delay(8), 3600);
        assert_eq!(delay(500), 3600);
    }
}
