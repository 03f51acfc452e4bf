use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: DatabaseHealth,
    connection_pool: ConnectionPoolHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DatabaseHealth {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(message),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Serialize)]
pub struct ConnectionPoolHealth {
    size: u32,
    idle_connections: usize,
}

/// Liveness of the scheduler's one hard dependency.
///
/// The dispatcher and planner are useless without Postgres, so a single
/// round trip decides healthy vs unhealthy. 200 when the database answers
/// within the probe timeout, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = probe_database(&state.db_pool).await;

    let (status_code, status) = if database.is_ok() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: status.to_string(),
        database,
        connection_pool: ConnectionPoolHealth {
            size: state.db_pool.size(),
            idle_connections: state.db_pool.num_idle(),
        },
    };

    (status_code, Json(response))
}

async fn probe_database(pool: &PgPool) -> DatabaseHealth {
    match tokio::time::timeout(PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => DatabaseHealth::ok(),
        Ok(Err(e)) => DatabaseHealth::error(format!("query failed: {e}")),
        Err(_) => DatabaseHealth::error(format!("no reply within {}s", PROBE_TIMEOUT.as_secs())),
    }
}
