//! Dependency container.

use std::sync::Arc;

use sqlx::PgPool;

use super::dispatch::route::ServiceEndpoints;
use super::test_dependencies::RecordingDispatchClient;
use super::traits::BaseDispatchClient;

/// Long-lived dependencies, built once at startup and handed to
/// constructors. Tests swap the dispatch client for a recording double
/// without touching the environment.
#[derive(Clone)]
pub struct SchedulerDeps {
    pub db_pool: PgPool,
    pub dispatch_client: Arc<dyn BaseDispatchClient>,
    pub endpoints: ServiceEndpoints,
}

impl SchedulerDeps {
    pub fn new(
        db_pool: PgPool,
        dispatch_client: Arc<dyn BaseDispatchClient>,
        endpoints: ServiceEndpoints,
    ) -> Self {
        Self {
            db_pool,
            dispatch_client,
            endpoints,
        }
    }

    /// Deps wired with a fresh recording client. Returns the client handle
    /// so tests can inspect what was dispatched.
    pub fn for_tests(
        db_pool: PgPool,
        endpoints: ServiceEndpoints,
    ) -> (Self, Arc<RecordingDispatchClient>) {
        let dispatch_client = Arc::new(RecordingDispatchClient::new());
        let deps = Self::new(db_pool, dispatch_client.clone(), endpoints);
        (deps, dispatch_client)
    }
}
