// Business domains
pub mod jobs;
pub mod media;
pub mod planner;
pub mod targets;
