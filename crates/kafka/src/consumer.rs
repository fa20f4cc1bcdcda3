//! Kafka consumer for keyed, nullable-valued sync topics.
//!
//! Uses rskafka for Kafka-compatible consumption with:
//! - Manual offset management for at-least-once delivery
//! - Bounded polls (record count and duration)
//! - Raw key/value records; tombstones surface as a missing value and
//!   deserialization is left to the sync layer

use crate::config::{KafkaConfig, StartOffset};
use rskafka::client::{
    partition::{OffsetAt, UnknownTopicHandling},
    ClientBuilder, Credentials, SaslConfig,
};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use sync_core::{Error, Result};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Creates a TLS configuration for SASL-authenticated brokers.
fn create_tls_config() -> Arc<rustls::ClientConfig> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

/// One record from a sync topic. A missing value is a tombstone for the key.
#[derive(Debug, Clone)]
pub struct SyncRecord {
    pub key: Option<String>,
    pub value: Option<Vec<u8>>,
    pub offset: i64,
}

/// Offset tracking for manual commit.
#[derive(Debug, Clone, Copy)]
pub struct Offset {
    pub partition: i32,
    pub offset: i64,
}

/// Consumer for one sync topic.
pub struct KafkaConsumer {
    config: KafkaConfig,
    topic: String,
    /// Partition client (currently only partition 0)
    partition_client: RwLock<Option<Arc<rskafka::client::partition::PartitionClient>>>,
    /// Current offset (next offset to read)
    current_offset: AtomicI64,
    /// Whether the start offset has been resolved
    initialized: AtomicBool,
}

impl KafkaConsumer {
    /// Creates a new consumer for the given topic. Connects lazily on the
    /// first subscribe/fetch.
    pub fn new(config: KafkaConfig, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        info!(
            topic = %topic,
            max_poll_records = config.max_poll_records,
            poll_timeout_ms = config.poll_timeout_ms,
            "Creating kafka consumer"
        );

        Self {
            config,
            topic,
            partition_client: RwLock::new(None),
            current_offset: AtomicI64::new(-1),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn config(&self) -> &KafkaConfig {
        &self.config
    }

    /// Establish (or reuse) the partition connection. Idempotent.
    pub async fn subscribe(&self) -> Result<()> {
        self.ensure_connected().await.map(|_| ())
    }

    async fn ensure_connected(&self) -> Result<Arc<rskafka::client::partition::PartitionClient>> {
        // Check if already connected
        {
            let client = self.partition_client.read().await;
            if let Some(ref c) = *client {
                return Ok(c.clone());
            }
        }

        // Create new connection
        let connection = self.config.broker_string();
        let mut builder = ClientBuilder::new(vec![connection]);

        // Add TLS and SASL auth if credentials are configured
        if let (Some(username), Some(password)) =
            (&self.config.sasl_username, &self.config.sasl_password)
        {
            builder = builder
                .tls_config(create_tls_config())
                .sasl_config(SaslConfig::ScramSha256(Credentials::new(
                    username.clone(),
                    password.clone(),
                )));
        }

        let client = builder
            .build()
            .await
            .map_err(|e| Error::kafka(format!("failed to connect to kafka: {}", e)))?;

        let partition_client = client
            .partition_client(
                self.topic.clone(),
                0, // Partition 0 for now
                UnknownTopicHandling::Error,
            )
            .await
            .map_err(|e| Error::kafka(format!("failed to get partition client: {}", e)))?;

        let partition_client = Arc::new(partition_client);

        // Resolve the start offset once
        if !self.initialized.load(Ordering::SeqCst) {
            let offset_at = match self.config.start_at {
                StartOffset::Earliest => OffsetAt::Earliest,
                StartOffset::Latest => OffsetAt::Latest,
            };
            let offset = partition_client
                .get_offset(offset_at)
                .await
                .map_err(|e| Error::kafka(format!("failed to get start offset: {}", e)))?;

            self.current_offset.store(offset, Ordering::SeqCst);
            self.initialized.store(true, Ordering::SeqCst);

            info!(
                topic = %self.topic,
                partition = 0,
                offset = offset,
                "Consumer initialized at offset"
            );
        }

        // Cache client
        {
            let mut client_guard = self.partition_client.write().await;
            *client_guard = Some(partition_client.clone());
        }

        Ok(partition_client)
    }

    /// Fetches one bounded batch of records.
    ///
    /// Blocks until records are available or the poll timeout expires.
    /// Returns the records in offset order and the offset to commit after
    /// the batch has been applied.
    pub async fn fetch_batch(&self) -> Result<(Vec<SyncRecord>, Option<Offset>)> {
        let client = self.ensure_connected().await?;

        let timeout_ms = self.config.poll_timeout_ms as i32;
        // Assume ~64KB max per record for the fetch byte bound
        let max_bytes = self.config.max_poll_records * 64 * 1024;

        let current = self.current_offset.load(Ordering::SeqCst);

        let (records, _watermark) = client
            .fetch_records(current, 1..max_bytes as i32, timeout_ms)
            .await
            .map_err(|e| {
                error!(topic = %self.topic, "Fetch error: {}", e);
                Error::kafka(format!("failed to fetch records: {}", e))
            })?;

        if records.is_empty() {
            return Ok((Vec::new(), None));
        }

        let mut batch = Vec::with_capacity(records.len().min(self.config.max_poll_records));
        for record in records.into_iter().take(self.config.max_poll_records) {
            batch.push(SyncRecord {
                key: record
                    .record
                    .key
                    .and_then(|key| String::from_utf8(key).ok()),
                value: record.record.value,
                offset: record.offset,
            });
        }

        let last_offset = batch.last().map(|r| r.offset).unwrap_or(current);

        debug!(
            topic = %self.topic,
            records = batch.len(),
            offset_start = current,
            offset_end = last_offset,
            "Fetched batch"
        );

        // Commit offset is the next offset after the last applied record;
        // records beyond max_poll_records are re-fetched next poll.
        let commit_offset = Some(Offset {
            partition: 0,
            offset: last_offset + 1,
        });

        Ok((batch, commit_offset))
    }

    /// Commits an offset after the batch has been applied to the store.
    pub async fn commit(&self, offset: Offset) -> Result<()> {
        let prev = self.current_offset.swap(offset.offset, Ordering::SeqCst);

        debug!(
            topic = %self.topic,
            partition = offset.partition,
            prev_offset = prev,
            new_offset = offset.offset,
            "Committed offset"
        );

        Ok(())
    }

    /// Returns the current consumer offset.
    pub fn current_offset(&self) -> i64 {
        self.current_offset.load(Ordering::SeqCst)
    }

    /// Drops the cached connection; the next subscribe reconnects.
    pub async fn unsubscribe(&self) {
        let mut client = self.partition_client.write().await;
        *client = None;
        info!(topic = %self.topic, "Consumer connection reset");
    }
}
