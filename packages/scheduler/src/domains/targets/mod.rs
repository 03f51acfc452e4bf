//! Targets domain - recurring scrape source configuration.

pub mod scrape_target;

pub use scrape_target::{ScrapeTarget, TargetKind};
