//! Jobs domain - the job table, its state machine, and the pipeline contract.

pub mod errors;
pub mod job;
pub mod pipeline;
pub mod task;

pub use errors::StoreError;
pub use job::{Job, JobId, JobStatus, NewJob};
pub use task::TaskKind;
