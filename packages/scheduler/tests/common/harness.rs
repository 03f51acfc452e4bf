//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container is shared by every test in the run; each test gets
//! its own freshly migrated database on it. Planner tests assert on whole
//! table contents and claim tests race on specific rows, so tests cannot
//! share tables.

use anyhow::{Context, Result};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::{Mutex, OnceCell};
use uuid::Uuid;

/// Shared container that persists across all tests in this binary.
struct SharedTestInfra {
    host: String,
    port: u16,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

/// CREATE DATABASE clones a template, and two clones of the same template
/// cannot run at once.
static CREATE_DB_LOCK: Mutex<()> = Mutex::const_new(());

impl SharedTestInfra {
    /// Start the shared container. Called once on the first test.
    async fn init() -> Result<Self> {
        // Respect RUST_LOG when debugging tests; try_init() avoids panicking
        // if a subscriber is already installed.
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?.to_string();
        let port = postgres.get_host_port_ipv4(5432).await?;

        Ok(Self {
            host,
            port,
            _postgres: postgres,
        })
    }

    /// Get or initialize the shared infrastructure.
    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }

    fn url_for(&self, db_name: &str) -> String {
        format!(
            "postgresql://postgres:postgres@{}:{}/{}",
            self.host, self.port, db_name
        )
    }
}

/// Test harness that manages test infrastructure.
///
/// Each harness owns a private database, created and migrated in `new`, on
/// the shared container.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let job = create_due_job(&ctx.db_pool, TaskKind::CreateMedia).await?;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Pool is dropped; the database itself goes away with the container
    }
}

impl TestHarness {
    /// Creates a new test harness backed by a fresh database.
    ///
    /// This will:
    /// 1. Get or initialize the shared PostgreSQL container
    /// 2. Create a uniquely named database for this test
    /// 3. Run migrations and connect a pool to it
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;
        let db_name = format!("scheduler_test_{}", Uuid::new_v4().simple());

        {
            let _guard = CREATE_DB_LOCK.lock().await;
            let admin_pool = PgPool::connect(&infra.url_for("postgres"))
                .await
                .context("Failed to connect to admin database")?;
            sqlx::query(&format!(r#"CREATE DATABASE "{db_name}""#))
                .execute(&admin_pool)
                .await
                .context("Failed to create test database")?;
            admin_pool.close().await;
        }

        let db_pool = PgPool::connect(&infra.url_for(&db_name))
            .await
            .context("Failed to connect to test database")?;

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { db_pool })
    }
}
