//! Mock implementations for testing.

use async_trait::async_trait;
use kafka::{Offset, SyncRecord};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use sync_core::{Error, Navn, Result};
use worker::{PersonLookup, RecordSource, Shutdown};

/// Person lookup backed by a fixed map.
///
/// Implements the same `PersonLookup` trait as the real pdl client, so the
/// sykmelding handler runs its production code path without a network.
pub struct StaticPersonLookup {
    names: HashMap<String, Navn>,
}

impl StaticPersonLookup {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    pub fn with_person(mut self, fnr: impl Into<String>, navn: Navn) -> Self {
        self.names.insert(fnr.into(), navn);
        self
    }
}

impl Default for StaticPersonLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonLookup for StaticPersonLookup {
    async fn person_navn(&self, fnr: &str, call_id: &str) -> Result<Navn> {
        self.names
            .get(fnr)
            .cloned()
            .ok_or_else(|| Error::person_not_found(format!("no name for {}", call_id)))
    }
}

struct ScriptedInner {
    topic: String,
    batches: Mutex<VecDeque<Vec<SyncRecord>>>,
    commits: Mutex<Vec<i64>>,
    shutdown: Shutdown,
}

/// Record source that serves scripted batches in order and trips the
/// shutdown token once they run out, so consumer runs terminate
/// deterministically in tests.
#[derive(Clone)]
pub struct ScriptedRecordSource {
    inner: Arc<ScriptedInner>,
}

impl ScriptedRecordSource {
    pub fn new(
        topic: impl Into<String>,
        batches: Vec<Vec<SyncRecord>>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                topic: topic.into(),
                batches: Mutex::new(batches.into()),
                commits: Mutex::new(Vec::new()),
                shutdown,
            }),
        }
    }

    /// Offsets committed by the consumer, in order.
    pub fn committed(&self) -> Vec<i64> {
        self.inner.commits.lock().clone()
    }
}

#[async_trait]
impl RecordSource for ScriptedRecordSource {
    fn topic(&self) -> &str {
        &self.inner.topic
    }

    async fn subscribe(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch_batch(&self) -> Result<(Vec<SyncRecord>, Option<Offset>)> {
        let batch = self.inner.batches.lock().pop_front();
        match batch {
            Some(batch) => {
                let last = batch.last().map(|r| r.offset).unwrap_or(0);
                Ok((
                    batch,
                    Some(Offset {
                        partition: 0,
                        offset: last + 1,
                    }),
                ))
            }
            None => {
                self.inner.shutdown.trigger();
                Ok((Vec::new(), None))
            }
        }
    }

    async fn commit(&self, offset: Offset) -> Result<()> {
        self.inner.commits.lock().push(offset.offset);
        Ok(())
    }

    async fn unsubscribe(&self) {}
}

/// An upsert record with a JSON-serialized value.
pub fn upsert_record<T: serde::Serialize>(key: &str, value: &T, offset: i64) -> SyncRecord {
    SyncRecord {
        key: Some(key.to_string()),
        value: Some(serde_json::to_vec(value).expect("Failed to serialize record")),
        offset,
    }
}

/// A tombstone record for the key.
pub fn tombstone_record(key: &str, offset: i64) -> SyncRecord {
    SyncRecord {
        key: Some(key.to_string()),
        value: None,
        offset,
    }
}
