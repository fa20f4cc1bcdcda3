//! Narmesteleder relationship message from the leesah topic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the narmesteleder-leesah topic, keyed by the relationship id.
///
/// A set `aktivTom` means the relationship has ended and is treated as a
/// tombstone, exactly like a null record value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarmestelederLeesahMessage {
    pub narmeste_leder_id: Uuid,
    pub fnr: String,
    pub orgnummer: String,
    pub narmeste_leder_fnr: String,
    #[serde(default)]
    pub narmeste_leder_telefonnummer: Option<String>,
    #[serde(default)]
    pub narmeste_leder_epost: Option<String>,
    pub aktiv_fom: NaiveDate,
    pub aktiv_tom: Option<NaiveDate>,
    #[serde(default)]
    pub arbeidsgiver_forskutterer: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

impl NarmestelederLeesahMessage {
    pub fn is_deactivated(&self) -> bool {
        self.aktiv_tom.is_some()
    }
}
