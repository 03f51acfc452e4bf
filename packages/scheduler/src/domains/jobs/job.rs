//! Job model and store operations.
//!
//! The jobs table is the single source of truth for pipeline state. It is
//! written concurrently by the weekly planner, the dispatch runner, and
//! downstream services inserting successor jobs, so every status change goes
//! through the operations here; nothing else mutates job rows.
//!
//! ```text
//! pending ──claim──► in_progress ──downstream──► completed
//!    ▲                   │   │
//!    │ retry backoff     │   └──────► failed
//!    └───────────────────┘
//! awaiting_completion ──claim──► in_progress   (monitor re-poll loop)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use typed_builder::TypedBuilder;

use super::errors::StoreError;
use super::task::TaskKind;

pub type JobId = i64;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    InProgress,
    /// Waiting on an external async task (video generation); re-polled once
    /// `scheduled_date` comes due again.
    AwaitingCompletion,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether the job can still be claimed by a dispatch cycle.
    pub fn is_claimable(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::AwaitingCompletion)
    }

    /// Whether the job has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

// ============================================================================
// Job Model
// ============================================================================

/// Insert payload for a new job.
///
/// Correlation is typed per kind: scrape jobs carry `config_ref_id`
/// (their ScrapeTarget), post jobs carry `asset_ref_id` (the MediaAsset to
/// publish), monitor jobs carry `external_task_id` (the provider's task id).
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewJob {
    pub task_name: String,
    #[builder(default, setter(strip_option))]
    pub task_kind: Option<TaskKind>,
    pub scheduled_date: DateTime<Utc>,
    #[builder(default, setter(strip_option))]
    pub config_ref_id: Option<i64>,
    #[builder(default, setter(strip_option))]
    pub asset_ref_id: Option<i64>,
    #[builder(default, setter(strip_option))]
    pub external_task_id: Option<String>,
}

impl NewJob {
    /// Job carrying a kind's canonical label and nothing else.
    pub fn for_kind(kind: TaskKind, scheduled_date: DateTime<Utc>) -> Self {
        Self::builder()
            .task_name(kind.task_name())
            .task_kind(kind)
            .scheduled_date(scheduled_date)
            .build()
    }
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub task_name: String,
    pub task_kind: Option<TaskKind>,
    pub status: JobStatus,
    pub scheduled_date: DateTime<Utc>,
    pub config_ref_id: Option<i64>,
    pub asset_ref_id: Option<i64>,
    pub external_task_id: Option<String>,
    pub attempts: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Effective kind: the typed column when present, otherwise resolved
    /// from the legacy task label.
    pub fn kind(&self) -> Option<TaskKind> {
        self.task_kind.or_else(|| TaskKind::parse(&self.task_name))
    }

    /// Whether a dispatch cycle running at `now` would pick this job up.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status.is_claimable() && self.scheduled_date <= now
    }

    /// Insert a new pending job.
    pub async fn create(new_job: NewJob, pool: &PgPool) -> Result<Self, StoreError> {
        let job = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO jobs (task_name, task_kind, status, scheduled_date,
                              config_ref_id, asset_ref_id, external_task_id,
                              created_at, updated_at)
            VALUES ($1, $2, 'pending', $3, $4, $5, $6, NOW(), NOW())
            RETURNING id, task_name, task_kind, status, scheduled_date,
                      config_ref_id, asset_ref_id, external_task_id,
                      attempts, error_message, created_at, updated_at
            "#,
        )
        .bind(&new_job.task_name)
        .bind(new_job.task_kind)
        .bind(new_job.scheduled_date)
        .bind(new_job.config_ref_id)
        .bind(new_job.asset_ref_id)
        .bind(&new_job.external_task_id)
        .fetch_one(pool)
        .await?;

        Ok(job)
    }

    /// Insert a new pending job unless one with the same natural key
    /// (task_name, scheduled_date) already exists. Returns `None` when the
    /// job was already planned, which is what makes re-running the weekly
    /// planner a no-op.
    pub async fn create_if_absent(new_job: NewJob, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let job = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO jobs (task_name, task_kind, status, scheduled_date,
                              config_ref_id, asset_ref_id, external_task_id,
                              created_at, updated_at)
            VALUES ($1, $2, 'pending', $3, $4, $5, $6, NOW(), NOW())
            ON CONFLICT (task_name, scheduled_date) DO NOTHING
            RETURNING id, task_name, task_kind, status, scheduled_date,
                      config_ref_id, asset_ref_id, external_task_id,
                      attempts, error_message, created_at, updated_at
            "#,
        )
        .bind(&new_job.task_name)
        .bind(new_job.task_kind)
        .bind(new_job.scheduled_date)
        .bind(new_job.config_ref_id)
        .bind(new_job.asset_ref_id)
        .bind(&new_job.external_task_id)
        .fetch_optional(pool)
        .await?;

        Ok(job)
    }

    /// Find a job by id.
    pub async fn find_by_id(id: JobId, pool: &PgPool) -> Result<Self, StoreError> {
        let job = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, task_name, task_kind, status, scheduled_date,
                   config_ref_id, asset_ref_id, external_task_id,
                   attempts, error_message, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        job.ok_or(StoreError::NotFound(id))
    }

    /// Jobs eligible for dispatch at `now`, oldest eligibility first.
    pub async fn find_due(now: DateTime<Utc>, limit: i64, pool: &PgPool) -> Result<Vec<Self>, StoreError> {
        let jobs = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, task_name, task_kind, status, scheduled_date,
                   config_ref_id, asset_ref_id, external_task_id,
                   attempts, error_message, created_at, updated_at
            FROM jobs
            WHERE status IN ('pending', 'awaiting_completion')
              AND scheduled_date <= $1
            ORDER BY scheduled_date ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(jobs)
    }

    /// Claim a job for dispatch with a single conditional update.
    ///
    /// Returns the refreshed row on success, `None` when the update matched
    /// zero rows because a concurrent poll cycle claimed the job first. This
    /// compare-and-swap is the only path into `in_progress`, so two
    /// overlapping cycles can never double-dispatch a job.
    pub async fn claim(id: JobId, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let job = sqlx::query_as::<_, Self>(
            r#"
            UPDATE jobs
            SET status = 'in_progress',
                attempts = attempts + 1,
                updated_at = NOW()
            WHERE id = $1
              AND status IN ('pending', 'awaiting_completion')
            RETURNING id, task_name, task_kind, status, scheduled_date,
                      config_ref_id, asset_ref_id, external_task_id,
                      attempts, error_message, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(job)
    }

    /// Move a job to a new status, refreshing `updated_at`.
    ///
    /// An error message, when given, replaces the previous one; otherwise
    /// whatever diagnostic was recorded earlier is kept.
    pub async fn transition(
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
        pool: &PgPool,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2,
                error_message = COALESCE($3, error_message),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error_message)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Move a job to a new status and push its eligibility time forward.
    /// Used for retry backoff and for awaiting-completion re-poll bumps.
    pub async fn reschedule(
        id: JobId,
        status: JobStatus,
        next_at: DateTime<Utc>,
        error_message: Option<&str>,
        pool: &PgPool,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $2,
                scheduled_date = $3,
                error_message = COALESCE($4, error_message),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(next_at)
        .bind(error_message)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
