//! Planner domain - pre-generates the recurring weekly workload.

pub mod calendar;
pub mod weekly;

pub use calendar::next_monday;
pub use weekly::{schedule_weekly_content_jobs, schedule_weekly_scrape_jobs};
