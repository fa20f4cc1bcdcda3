//! Sykmelding wire messages and the persisted sykmelding document.
//!
//! The document is an explicit, versioned schema validated when the record
//! is written; the store keeps it as JSONB and the read path deserializes
//! back into the same type.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Records whose latest period ended before this cutoff are out of the sync
/// window: dropped at consumption, excluded from aggregation and purged by
/// the retention sweeper.
pub fn sync_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(4))
        .unwrap_or(NaiveDate::MIN)
}

/// Value of the sendt-sykmelding topic. A null record value is a tombstone
/// for the sykmelding id in the record key.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SykmeldingArbeidsgiverKafkaMessage {
    #[validate(nested)]
    pub sykmelding: ArbeidsgiverSykmelding,
    pub kafka_metadata: KafkaMetadata,
    pub event: SykmeldingStatusEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaMetadata {
    pub sykmelding_id: String,
    pub timestamp: DateTime<Utc>,
    pub fnr: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SykmeldingStatusEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status_event: Option<String>,
    pub arbeidsgiver: Option<ArbeidsgiverStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbeidsgiverStatus {
    pub orgnummer: String,
    pub juridisk_orgnummer: Option<String>,
    pub org_navn: String,
}

/// The sykmelding document as the arbeidsgiver is allowed to see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArbeidsgiverSykmelding {
    pub id: String,
    #[validate(length(min = 1, message = "sykmelding must have at least one periode"))]
    pub sykmeldingsperioder: Vec<Sykmeldingsperiode>,
    pub prognose: Option<Prognose>,
    pub behandler: Behandler,
    pub behandlet_tidspunkt: DateTime<Utc>,
    #[serde(default)]
    pub tiltak_arbeidsplassen: Option<String>,
    #[serde(default)]
    pub melding_til_arbeidsgiver: Option<String>,
    #[serde(default)]
    pub syketilfelle_start_dato: Option<NaiveDate>,
    #[serde(default)]
    pub egenmeldt: Option<bool>,
    #[serde(default)]
    pub papirsykmelding: Option<bool>,
    #[serde(default)]
    pub har_redusert_arbeidsgiverperiode: Option<bool>,
}

impl ArbeidsgiverSykmelding {
    /// Latest end date over all perioder. None only for an (invalid)
    /// document without perioder.
    pub fn latest_tom(&self) -> Option<NaiveDate> {
        self.sykmeldingsperioder.iter().map(|p| p.tom).max()
    }

    /// Whether any periode spans the given day.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.sykmeldingsperioder.iter().any(|p| p.is_active(today))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sykmeldingsperiode {
    pub fom: NaiveDate,
    pub tom: NaiveDate,
    pub gradert: Option<Gradert>,
    #[serde(default)]
    pub behandlingsdager: Option<i32>,
    #[serde(default)]
    pub reisetilskudd: bool,
    #[serde(default)]
    pub innspill_til_arbeidsgiver: Option<String>,
    #[serde(default)]
    pub aktivitet_ikke_mulig: Option<AktivitetIkkeMulig>,
    #[serde(rename = "type", default)]
    pub periodetype: Option<String>,
}

impl Sykmeldingsperiode {
    /// A periode is active on both boundary days, inclusive.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.fom <= today && today <= self.tom
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradert {
    pub grad: i32,
    #[serde(default)]
    pub reisetilskudd: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AktivitetIkkeMulig {
    pub arbeidsrelatert_arsak: Option<ArbeidsrelatertArsak>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbeidsrelatertArsak {
    #[serde(default)]
    pub beskrivelse: Option<String>,
    #[serde(default)]
    pub arsak: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prognose {
    #[serde(default)]
    pub arbeidsfor_etter_periode: Option<bool>,
    #[serde(default)]
    pub hensyn_arbeidsplassen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behandler {
    pub fornavn: String,
    #[serde(default)]
    pub mellomnavn: Option<String>,
    pub etternavn: String,
    #[serde(default)]
    pub tlf: Option<String>,
}
