//! Infrastructure trait seams.

use anyhow::Result;
use async_trait::async_trait;

/// Outbound HTTP as the dispatcher sees it.
///
/// Implementations must bound every call with a timeout; a timed-out call
/// surfaces as an `Err` like any other transport failure, while an HTTP
/// response of any status is an `Ok` carrying the status code.
#[async_trait]
pub trait BaseDispatchClient: Send + Sync {
    /// Issue the dispatch GET for a claimed job and return the status code.
    async fn dispatch(&self, url: &str) -> Result<u16>;
}
