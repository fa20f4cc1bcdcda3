//! Common test setup functions.

use api::{router, AppState};
use axum::Router;
use db::{DatabaseConfig, Db};
use std::sync::Arc;

use crate::containers::TestContainers;

/// Test context with a real Postgres container and the production router.
///
/// Kafka is replaced by scripted record sources, auth by the auth client's
/// mock mode (the bearer token is used verbatim as the leder fnr), so every
/// other code path is the production one.
pub struct TestContext {
    pub containers: TestContainers,
    pub db: Arc<Db>,
    pub router: Router,
}

impl TestContext {
    /// Create a new test context with schema initialized.
    pub async fn new() -> Self {
        let containers = TestContainers::start().await;

        let db_config = DatabaseConfig {
            url: containers.database_url.clone(),
            max_connections: 5,
            acquire_timeout_secs: 30,
        };
        let db = Arc::new(
            Db::connect(db_config)
                .await
                .expect("Failed to connect to Postgres"),
        );

        db::health::init_schema(&db)
            .await
            .expect("Failed to initialize schema");

        // The readiness probe reads the global registry
        telemetry::health().postgres.set_healthy();

        let state = AppState::new(db.clone(), "mock");
        let router = router(state);

        Self {
            containers,
            db,
            router,
        }
    }

    /// Remove all rows (use between cases sharing one context).
    pub async fn truncate_all(&self) {
        for table in [
            "sykmelding_arbeidsgiver",
            "sykmeldt",
            "narmesteleder",
            "narmesteleder_read_status",
        ] {
            sqlx::query(&format!("TRUNCATE TABLE {}", table))
                .execute(self.db.pool())
                .await
                .expect("Failed to truncate table");
        }
    }

    /// Count rows in a table.
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.db.pool())
            .await
            .expect("Count query failed")
    }
}
