//! Leader-elected retention sweeper.
//!
//! Purges sykmeldinger (and the sykmeldt cache) whose latest periode ended
//! before the sync window. Runs hourly; only the leader executes the purge,
//! everyone else skips the cycle.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use sync_core::sync_cutoff;
use telemetry::metrics;
use tracing::{debug, error, info};

use crate::leader::LeaderElector;
use crate::shutdown::Shutdown;
use db::Db;

/// Time between purge cycles.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Worker that deletes rows outside the sync window.
pub struct RetentionWorker {
    db: Arc<Db>,
    elector: Arc<dyn LeaderElector>,
    interval: Duration,
}

impl RetentionWorker {
    pub fn new(db: Arc<Db>, elector: Arc<dyn LeaderElector>) -> Self {
        Self {
            db,
            elector,
            interval: PURGE_INTERVAL,
        }
    }

    pub fn with_interval(db: Arc<Db>, elector: Arc<dyn LeaderElector>, interval: Duration) -> Self {
        Self {
            db,
            elector,
            interval,
        }
    }

    /// Run until shutdown.
    pub async fn run(&self, shutdown: Shutdown) {
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.triggered() => break,
            }

            if !self.elector.is_leader().await {
                debug!("Not leader, skipping purge cycle");
                continue;
            }

            self.purge_cycle().await;
        }

        info!("Retention worker stopped");
    }

    async fn purge_cycle(&self) {
        let cutoff = sync_cutoff(Utc::now().date_naive());

        match db::sykmelding::delete_expired(&self.db, cutoff).await {
            Ok(result) => {
                metrics().sykmeldinger_purged.inc_by(result.sykmeldinger);
                metrics().sykmeldte_purged.inc_by(result.sykmeldte);
                info!(
                    cutoff = %cutoff,
                    sykmeldinger = result.sykmeldinger,
                    sykmeldte = result.sykmeldte,
                    "Deleted expired sykmeldinger and sykmeldte"
                );
            }
            Err(e) => {
                error!("Could not delete expired sykmeldinger/sykmeldte: {}", e);
            }
        }
    }
}
