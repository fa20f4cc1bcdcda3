//! Postgres pool wrapper.

use crate::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use sync_core::{Error, Result};
use tracing::info;

/// Postgres client wrapper around the shared connection pool.
///
/// The pool is the only shared mutable resource in the process; every
/// operation acquires one connection, runs its statements in one
/// transaction and releases the connection on all exit paths.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
    config: DatabaseConfig,
}

impl Db {
    /// Connects the pool.
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| Error::database(format!("failed to connect to postgres: {}", e)))?;

        info!(
            max_connections = config.max_connections,
            "Created postgres pool"
        );

        Ok(Self { pool, config })
    }

    /// Wraps an existing pool (tests).
    pub fn from_pool(pool: PgPool, config: DatabaseConfig) -> Self {
        Self { pool, config }
    }

    /// Returns the inner pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// Map an sqlx error into the store error variant.
pub(crate) fn db_err(e: sqlx::Error) -> Error {
    Error::database(e.to_string())
}
