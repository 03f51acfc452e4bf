// Main entry point for the content pipeline scheduler

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use scheduler_core::kernel::scheduled_tasks::{run_weekly_planning, start_scheduler};
use scheduler_core::kernel::{
    DispatchRunner, DispatchRunnerConfig, HttpDispatchClient, SchedulerDeps,
};
use scheduler_core::server::build_app;
use scheduler_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scheduler_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Content Pipeline Scheduler");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Wire up dependencies
    let dispatch_client = Arc::new(
        HttpDispatchClient::new(config.request_timeout)
            .context("Failed to create dispatch client")?,
    );
    let deps = SchedulerDeps::new(pool.clone(), dispatch_client, config.endpoints());

    // Catch up on planning at boot; the cron covers steady state. A failed
    // pass is logged rather than fatal so a flaky startup does not stop
    // dispatch of already-planned jobs.
    if let Err(e) = run_weekly_planning(&pool).await {
        tracing::warn!("Startup planning pass failed: {:#}", e);
    }

    // Start scheduled tasks (handle must stay alive for the cron to fire)
    let _scheduler = start_scheduler(pool.clone())
        .await
        .context("Failed to start scheduled tasks")?;

    // Spawn the dispatch runner as a background task
    let runner_config = DispatchRunnerConfig {
        poll_interval: config.poll_interval,
        max_attempts: config.max_attempts,
        retry_backoff: config.retry_backoff,
        ..Default::default()
    };
    let runner = DispatchRunner::new(deps, runner_config);
    let runner_shutdown = runner.shutdown_handle();
    let runner_handle = tokio::spawn(runner.run());

    // Build application
    let app = build_app(pool);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the dispatch runner after the HTTP server drains
    runner_shutdown.store(true, Ordering::SeqCst);
    runner_handle.await.context("Dispatch runner task panicked")?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
