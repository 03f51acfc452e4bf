//! Job store error types.

use thiserror::Error;

use super::job::JobId;

/// Errors surfaced by job store operations.
///
/// `NotFound` means the row is gone (or never existed); everything else is a
/// database-level failure and carries the underlying sqlx error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
