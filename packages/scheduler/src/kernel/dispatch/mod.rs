//! Dispatch - routing table and the polling runner.

pub mod route;
pub mod runner;

pub use route::ServiceEndpoints;
pub use runner::{CycleStats, DispatchRunner, DispatchRunnerConfig};
