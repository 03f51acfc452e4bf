//! Kernel module - scheduler infrastructure and dependencies.

pub mod deps;
pub mod dispatch;
pub mod http_client;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::SchedulerDeps;
pub use dispatch::{DispatchRunner, DispatchRunnerConfig, ServiceEndpoints};
pub use http_client::HttpDispatchClient;
pub use test_dependencies::RecordingDispatchClient;
pub use traits::*;
