//! Postgres health checks and schema init.

use crate::client::{db_err, Db};
use sync_core::Result;
use tracing::{debug, error};

/// Check postgres connection health.
pub async fn check_connection(db: &Db) -> bool {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(db.pool()).await {
        Ok(_) => {
            debug!("Postgres connection healthy");
            true
        }
        Err(e) => {
            error!("Postgres health check failed: {}", e);
            false
        }
    }
}

/// Create tables that do not exist yet.
pub async fn init_schema(db: &Db) -> Result<()> {
    use crate::schema::all_tables;

    for ddl in all_tables() {
        sqlx::query(ddl).execute(db.pool()).await.map_err(db_err)?;
    }

    debug!("Postgres schema initialized");
    Ok(())
}
