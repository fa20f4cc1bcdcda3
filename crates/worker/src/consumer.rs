//! The generic topic-sync consumer loop.
//!
//! One parameterized implementation drives every sync topic:
//! 1. Subscribe to the topic (idempotent)
//! 2. Fetch a bounded batch
//! 3. Apply records in arrival order: missing value = tombstone delete,
//!    otherwise deserialize and upsert (per-key last-write-wins follows
//!    from sequential application)
//! 4. Commit the batch offset (at-least-once delivery)
//!
//! Transient failures unsubscribe, back off and resume. Malformed records
//! are quarantined: logged, counted, and the offset still advances, so a
//! single poison message cannot stall the topic. Fatal failures stop the
//! consumer and are escalated by the scheduler.

use async_trait::async_trait;
use kafka::{KafkaConsumer, Offset, SyncRecord};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use sync_core::{Error, FailureClass, Result};
use telemetry::metrics;
use tracing::{error, info};

use crate::shutdown::Shutdown;

/// Where sync records come from. Implemented by the kafka consumer; tests
/// substitute scripted sources.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn topic(&self) -> &str;
    async fn subscribe(&self) -> Result<()>;
    async fn fetch_batch(&self) -> Result<(Vec<SyncRecord>, Option<Offset>)>;
    async fn commit(&self, offset: Offset) -> Result<()>;
    async fn unsubscribe(&self);
}

#[async_trait]
impl RecordSource for KafkaConsumer {
    fn topic(&self) -> &str {
        KafkaConsumer::topic(self)
    }

    async fn subscribe(&self) -> Result<()> {
        KafkaConsumer::subscribe(self).await
    }

    async fn fetch_batch(&self) -> Result<(Vec<SyncRecord>, Option<Offset>)> {
        KafkaConsumer::fetch_batch(self).await
    }

    async fn commit(&self, offset: Offset) -> Result<()> {
        KafkaConsumer::commit(self, offset).await
    }

    async fn unsubscribe(&self) {
        KafkaConsumer::unsubscribe(self).await
    }
}

/// What applying one record did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Upserted,
    Deleted,
    Ignored,
}

/// Per-topic apply logic. `None` is a tombstone for the key.
#[async_trait]
pub trait TopicSync: Send + Sync {
    type Message: DeserializeOwned + Send + Sync;

    async fn apply(&self, key: &str, message: Option<Self::Message>) -> Result<Applied>;
}

/// Sync consumer configuration.
#[derive(Debug, Clone)]
pub struct SyncConsumerConfig {
    /// Backoff before resubscribing after a transient failure
    pub retry_backoff: Duration,
    /// Minimum interval between processed-count log lines
    pub log_interval: Duration,
}

impl Default for SyncConsumerConfig {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_secs(5),
            log_interval: Duration::from_secs(60),
        }
    }
}

/// The consumer loop for one topic.
pub struct SyncConsumer<S, H> {
    source: S,
    handler: H,
    config: SyncConsumerConfig,
}

impl<S, H> SyncConsumer<S, H>
where
    S: RecordSource,
    H: TopicSync,
{
    pub fn new(source: S, handler: H) -> Self {
        Self {
            source,
            handler,
            config: SyncConsumerConfig::default(),
        }
    }

    pub fn with_config(source: S, handler: H, config: SyncConsumerConfig) -> Self {
        Self {
            source,
            handler,
            config,
        }
    }

    /// Run until shutdown. Only fatal errors escape.
    pub async fn run(&self, shutdown: Shutdown) -> Result<()> {
        info!(topic = %self.source.topic(), "Sync consumer starting");

        while !shutdown.is_triggered() {
            if let Err(e) = self.source.subscribe().await {
                error!(
                    topic = %self.source.topic(),
                    error = %e,
                    "Could not subscribe, waiting for retry"
                );
                metrics().consumer_restarts.inc();
                tokio::time::sleep(self.config.retry_backoff).await;
                continue;
            }

            match self.poll_loop(&shutdown).await {
                Ok(()) => {}
                Err(e) if e.classify() == FailureClass::Fatal => {
                    error!(topic = %self.source.topic(), error = %e, "Fatal consumer error");
                    return Err(e);
                }
                Err(e) => {
                    error!(
                        topic = %self.source.topic(),
                        error = %e,
                        "Error running consumer, unsubscribing and waiting for retry"
                    );
                    self.source.unsubscribe().await;
                    metrics().consumer_restarts.inc();
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
            }
        }

        info!(topic = %self.source.topic(), "Sync consumer stopped");
        Ok(())
    }

    async fn poll_loop(&self, shutdown: &Shutdown) -> Result<()> {
        let mut processed: u64 = 0;
        let mut ignored: u64 = 0;
        let mut last_log = Instant::now();

        while !shutdown.is_triggered() {
            let (records, offset) = self.source.fetch_batch().await?;

            for record in &records {
                match self.apply_record(record).await {
                    Ok(Applied::Ignored) => {
                        ignored += 1;
                        metrics().messages_ignored.inc();
                    }
                    Ok(_) => {}
                    Err(e) => match e.classify() {
                        FailureClass::Poison => {
                            error!(
                                topic = %self.source.topic(),
                                offset = record.offset,
                                error = %e,
                                "Quarantining malformed record"
                            );
                            metrics().messages_quarantined.inc();
                        }
                        // Transient and fatal failures propagate before the
                        // commit, so the batch is redelivered
                        _ => return Err(e),
                    },
                }
            }

            processed += records.len() as u64;
            metrics().messages_processed.inc_by(records.len() as u64);

            if let Some(offset) = offset {
                self.source.commit(offset).await?;
            }

            if processed > 0 && last_log.elapsed() >= self.config.log_interval {
                info!(
                    topic = %self.source.topic(),
                    processed = processed,
                    ignored = ignored,
                    "Processed messages"
                );
                processed = 0;
                ignored = 0;
                last_log = Instant::now();
            }
        }

        Ok(())
    }

    async fn apply_record(&self, record: &SyncRecord) -> Result<Applied> {
        let key = record
            .key
            .as_deref()
            .ok_or_else(|| Error::validation("record without key"))?;

        let message = match &record.value {
            None => None,
            Some(bytes) => Some(serde_json::from_slice::<H::Message>(bytes)?),
        };

        self.handler.apply(key, message).await
    }
}
