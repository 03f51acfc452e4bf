//! HttpDispatchClient tests against a real local HTTP server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::{routing::get, Router};
use scheduler_core::kernel::traits::BaseDispatchClient;
use scheduler_core::kernel::HttpDispatchClient;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn dispatch_returns_the_downstream_status() {
    let app = Router::new()
        .route("/generate-image/:id", get(|| async { "ok" }))
        .route(
            "/broken/:id",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let addr = serve(app).await;
    let client = HttpDispatchClient::new(Duration::from_secs(2)).unwrap();

    let ok = client
        .dispatch(&format!("http://{addr}/generate-image/12"))
        .await
        .unwrap();
    assert_eq!(ok, 200);

    // Non-200 statuses come back as values, not transport errors; the
    // runner decides what to do with them.
    let broken = client
        .dispatch(&format!("http://{addr}/broken/12"))
        .await
        .unwrap();
    assert_eq!(broken, 500);
}

#[tokio::test]
async fn dispatch_times_out_against_a_stalled_service() {
    let app = Router::new().route(
        "/website_scrape/:id",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let addr = serve(app).await;
    let client = HttpDispatchClient::new(Duration::from_secs(1)).unwrap();

    let err = client
        .dispatch(&format!("http://{addr}/website_scrape/3"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("timed out"), "got: {err}");
}

#[tokio::test]
async fn dispatch_reports_connection_failures() {
    // Nothing listens on this port.
    let client = HttpDispatchClient::new(Duration::from_secs(1)).unwrap();

    let err = client
        .dispatch("http://127.0.0.1:9/instagram_scrape/9")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed"), "got: {err}");
}
