//! Read-status counters for a narmesteleder relationship.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of the lest-status topic, keyed by the relationship id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LestStatusKafkaMessage {
    pub kafka_metadata: LestStatusKafkaMetadata,
    pub nl_read_count: NlReadCount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LestStatusKafkaMetadata {
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// Per-relationship unread counters, one row per narmesteleder id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NlReadCount {
    pub narmesteleder_id: String,
    pub unread_sykmeldinger: i32,
    pub unread_soknader: i32,
    pub unread_dialogmoter: i32,
    pub unread_oppfolgingsplaner: i32,
    pub unread_meldinger: i32,
}
