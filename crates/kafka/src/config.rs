//! Kafka configuration.

use serde::{Deserialize, Serialize};

/// Kafka consumer configuration shared by all topic consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Broker addresses
    pub brokers: Vec<String>,
    /// SASL username (for Aiven-hosted clusters)
    pub sasl_username: Option<String>,
    /// SASL password (for Aiven-hosted clusters)
    pub sasl_password: Option<String>,
    /// Bounded poll duration in milliseconds
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    /// Maximum records returned by one poll
    #[serde(default = "default_max_poll_records")]
    pub max_poll_records: usize,
    /// Where a consumer starts when it has no stored offset
    #[serde(default)]
    pub start_at: StartOffset,
    /// Topic names
    #[serde(default)]
    pub topics: TopicsConfig,
}

/// Start position for a consumer without a stored offset.
///
/// A sync consumer rebuilds relational state from the log, so the default
/// is the earliest available offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartOffset {
    #[default]
    Earliest,
    Latest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsConfig {
    /// Sendt-sykmelding topic (key = sykmelding id, null value = tombstone)
    #[serde(default = "default_sykmelding_topic")]
    pub sykmelding: String,
    /// Narmesteleder leesah topic (key = relationship id)
    #[serde(default = "default_narmesteleder_topic")]
    pub narmesteleder: String,
    /// Read-status topic (key = relationship id, null value = tombstone)
    #[serde(default = "default_lest_status_topic")]
    pub lest_status: String,
}

fn default_poll_timeout_ms() -> u64 {
    10_000
}

fn default_max_poll_records() -> usize {
    100
}

fn default_sykmelding_topic() -> String {
    "teamsykmelding.syfo-sendt-sykmelding".to_string()
}

fn default_narmesteleder_topic() -> String {
    "teamsykmelding.syfo-narmesteleder-leesah".to_string()
}

fn default_lest_status_topic() -> String {
    "teamsykmelding.dinesykmeldte-lest-status".to_string()
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            sykmelding: default_sykmelding_topic(),
            narmesteleder: default_narmesteleder_topic(),
            lest_status: default_lest_status_topic(),
        }
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            sasl_username: None,
            sasl_password: None,
            poll_timeout_ms: default_poll_timeout_ms(),
            max_poll_records: default_max_poll_records(),
            start_at: StartOffset::default(),
            topics: TopicsConfig::default(),
        }
    }
}

impl KafkaConfig {
    /// Returns the broker list as a comma-separated string.
    pub fn broker_string(&self) -> String {
        self.brokers.join(",")
    }
}
