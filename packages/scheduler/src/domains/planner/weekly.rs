//! Weekly job planning.
//!
//! Run ahead of the week it plans: a Monday-Friday content calendar (a
//! create-media job at 02:00 the day before each post, giving generation an
//! eight-hour lead, and a post job at 10:00), plus per-target scrape jobs
//! stepped by each target's frequency. All times are UTC.
//!
//! Inserts go through the natural-key path, so invoking a planning pass
//! twice in the same week adds nothing.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::domains::jobs::{Job, NewJob, TaskKind};
use crate::domains::targets::ScrapeTarget;

use super::calendar::next_monday;

/// One weekday's content pair: when to generate and when to post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSlot {
    pub create_at: DateTime<Utc>,
    pub post_at: DateTime<Utc>,
}

/// The five content pairs for the week starting at `week_start` (a Monday).
///
/// Posts land Monday through Friday at 10:00; each create slot is 02:00 on
/// the preceding calendar day, so Monday's create job lands on the prior
/// Sunday.
pub fn content_slots(week_start: NaiveDate) -> Vec<ContentSlot> {
    (0..5)
        .filter_map(|offset| {
            let post_date = week_start + Duration::days(offset);
            let post_at = post_date.and_hms_opt(10, 0, 0)?.and_utc();
            let create_at = (post_date - Duration::days(1)).and_hms_opt(2, 0, 0)?.and_utc();
            Some(ContentSlot { create_at, post_at })
        })
        .collect()
}

/// Scrape times for one target: from Monday 00:00, stepping the target's
/// frequency, strictly inside the week (a slot landing exactly on the next
/// Monday is excluded). Non-positive frequencies yield no slots.
pub fn scrape_slots(week_start: NaiveDate, frequency_hours: i32) -> Vec<DateTime<Utc>> {
    if frequency_hours <= 0 {
        return Vec::new();
    }
    let Some(start) = week_start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()) else {
        return Vec::new();
    };
    let week_end = start + Duration::days(7);

    let mut slots = Vec::new();
    let mut next = start;
    while next < week_end {
        slots.push(next);
        next += Duration::hours(i64::from(frequency_hours));
    }
    slots
}

/// Plan the upcoming week's content calendar. Returns how many jobs were
/// actually inserted (re-runs insert zero).
pub async fn schedule_weekly_content_jobs(today: NaiveDate, pool: &PgPool) -> Result<u64> {
    let week_start = next_monday(today);
    let mut created = 0u64;

    for slot in content_slots(week_start) {
        let create_job = NewJob::for_kind(TaskKind::CreateMedia, slot.create_at);
        if Job::create_if_absent(create_job, pool).await?.is_some() {
            created += 1;
        }
        let post_job = NewJob::for_kind(TaskKind::PostImageInstagram, slot.post_at);
        if Job::create_if_absent(post_job, pool).await?.is_some() {
            created += 1;
        }
    }

    info!(week_start = %week_start, created, "content calendar planned");
    Ok(created)
}

/// Plan the upcoming week's scrape jobs for every configured target.
/// Returns how many jobs were actually inserted.
pub async fn schedule_weekly_scrape_jobs(today: NaiveDate, pool: &PgPool) -> Result<u64> {
    let week_start = next_monday(today);
    let targets = ScrapeTarget::find_all(pool).await?;
    let mut created = 0u64;

    for target in &targets {
        if target.frequency_hours <= 0 {
            warn!(
                target_id = target.id,
                frequency_hours = target.frequency_hours,
                "non-positive scrape frequency, skipping target"
            );
            continue;
        }

        let kind = target.kind.scrape_task_kind();
        let task_name = format!("{} target {}", kind.task_name(), target.id);

        for scheduled_date in scrape_slots(week_start, target.frequency_hours) {
            let new_job = NewJob::builder()
                .task_name(task_name.clone())
                .task_kind(kind)
                .scheduled_date(scheduled_date)
                .config_ref_id(target.id)
                .build();
            if Job::create_if_absent(new_job, pool).await?.is_some() {
                created += 1;
            }
        }
    }

    info!(
        week_start = %week_start,
        targets = targets.len(),
        created,
        "scrape schedule planned"
    );
    Ok(created)
}
