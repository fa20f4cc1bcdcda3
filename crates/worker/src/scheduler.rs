//! Spawns the sync consumers and the retention sweeper.

use kafka::{KafkaConfig, KafkaConsumer};
use std::sync::Arc;
use tracing::{error, info};

use crate::consumer::{RecordSource, SyncConsumer, TopicSync};
use crate::leader::LeaderElector;
use crate::lest_status::LestStatusHandler;
use crate::narmesteleder::NarmestelederHandler;
use crate::pdl::PersonLookup;
use crate::retention::RetentionWorker;
use crate::shutdown::Shutdown;
use crate::sykmelding::SykmeldingHandler;
use db::Db;

/// Wires up one consumer per topic plus the sweeper and spawns them.
pub struct SyncScheduler {
    db: Arc<Db>,
    kafka_config: KafkaConfig,
    person_lookup: Arc<dyn PersonLookup>,
    elector: Arc<dyn LeaderElector>,
    cluster: String,
}

impl SyncScheduler {
    pub fn new(
        db: Arc<Db>,
        kafka_config: KafkaConfig,
        person_lookup: Arc<dyn PersonLookup>,
        elector: Arc<dyn LeaderElector>,
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            db,
            kafka_config,
            person_lookup,
            elector,
            cluster: cluster.into(),
        }
    }

    /// Starts all background tasks. Each consumer runs on its own task and
    /// shares nothing but the store.
    pub fn start(self, shutdown: Shutdown) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::new();
        let topics = self.kafka_config.topics.clone();

        handles.push(spawn_consumer(
            SyncConsumer::new(
                KafkaConsumer::new(self.kafka_config.clone(), topics.sykmelding),
                SykmeldingHandler::new(
                    self.db.clone(),
                    self.person_lookup.clone(),
                    self.cluster.clone(),
                ),
            ),
            shutdown.clone(),
        ));

        handles.push(spawn_consumer(
            SyncConsumer::new(
                KafkaConsumer::new(self.kafka_config.clone(), topics.narmesteleder),
                NarmestelederHandler::new(self.db.clone()),
            ),
            shutdown.clone(),
        ));

        handles.push(spawn_consumer(
            SyncConsumer::new(
                KafkaConsumer::new(self.kafka_config.clone(), topics.lest_status),
                LestStatusHandler::new(self.db.clone()),
            ),
            shutdown.clone(),
        ));

        let retention = RetentionWorker::new(self.db.clone(), self.elector.clone());
        let retention_shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            retention.run(retention_shutdown).await;
        }));

        info!("Background workers started");
        handles
    }
}

/// A consumer returning an error means a fatal failure; trip the shutdown
/// token so the whole process fails fast instead of limping along.
fn spawn_consumer<S, H>(
    consumer: SyncConsumer<S, H>,
    shutdown: Shutdown,
) -> tokio::task::JoinHandle<()>
where
    S: RecordSource + 'static,
    H: TopicSync + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = consumer.run(shutdown.clone()).await {
            error!("Consumer failed: {}", e);
            shutdown.trigger();
        }
    })
}
