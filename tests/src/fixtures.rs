//! Builders for sync topic messages.

use chrono::{NaiveDate, Utc};
use sync_core::{
    ArbeidsgiverStatus, ArbeidsgiverSykmelding, Behandler, Gradert, KafkaMetadata,
    LestStatusKafkaMessage, LestStatusKafkaMetadata, Navn, NarmestelederLeesahMessage,
    NlReadCount, Sykmeldingsperiode, SykmeldingArbeidsgiverKafkaMessage, SykmeldingStatusEvent,
};
use uuid::Uuid;

pub fn navn(fornavn: &str, etternavn: &str) -> Navn {
    Navn {
        fornavn: fornavn.to_string(),
        mellomnavn: None,
        etternavn: etternavn.to_string(),
    }
}

pub fn periode(fom: NaiveDate, tom: NaiveDate) -> Sykmeldingsperiode {
    Sykmeldingsperiode {
        fom,
        tom,
        gradert: Some(Gradert {
            grad: 50,
            reisetilskudd: false,
        }),
        behandlingsdager: None,
        reisetilskudd: false,
        innspill_til_arbeidsgiver: None,
        aktivitet_ikke_mulig: None,
        periodetype: None,
    }
}

pub fn arbeidsgiver_sykmelding(id: &str, fom: NaiveDate, tom: NaiveDate) -> ArbeidsgiverSykmelding {
    ArbeidsgiverSykmelding {
        id: id.to_string(),
        sykmeldingsperioder: vec![periode(fom, tom)],
        prognose: None,
        behandler: Behandler {
            fornavn: "Lege".to_string(),
            mellomnavn: None,
            etternavn: "Legesen".to_string(),
            tlf: Some("tel:94431152".to_string()),
        },
        behandlet_tidspunkt: Utc::now(),
        tiltak_arbeidsplassen: None,
        melding_til_arbeidsgiver: None,
        syketilfelle_start_dato: Some(fom),
        egenmeldt: Some(false),
        papirsykmelding: Some(false),
        har_redusert_arbeidsgiverperiode: Some(false),
    }
}

pub fn sykmelding_message(
    sykmelding_id: &str,
    fnr: &str,
    orgnummer: &str,
    fom: NaiveDate,
    tom: NaiveDate,
) -> SykmeldingArbeidsgiverKafkaMessage {
    SykmeldingArbeidsgiverKafkaMessage {
        sykmelding: arbeidsgiver_sykmelding(sykmelding_id, fom, tom),
        kafka_metadata: KafkaMetadata {
            sykmelding_id: sykmelding_id.to_string(),
            timestamp: Utc::now(),
            fnr: fnr.to_string(),
            source: "user".to_string(),
        },
        event: SykmeldingStatusEvent {
            timestamp: Utc::now(),
            status_event: Some("SENDT".to_string()),
            arbeidsgiver: Some(ArbeidsgiverStatus {
                orgnummer: orgnummer.to_string(),
                juridisk_orgnummer: Some("888000888".to_string()),
                org_navn: "Bedriften AS".to_string(),
            }),
        },
    }
}

pub fn narmesteleder_message(
    narmesteleder_id: Uuid,
    fnr: &str,
    orgnummer: &str,
    leder_fnr: &str,
) -> NarmestelederLeesahMessage {
    NarmestelederLeesahMessage {
        narmeste_leder_id: narmesteleder_id,
        fnr: fnr.to_string(),
        orgnummer: orgnummer.to_string(),
        narmeste_leder_fnr: leder_fnr.to_string(),
        narmeste_leder_telefonnummer: Some("99999999".to_string()),
        narmeste_leder_epost: Some("leder@bedriften.no".to_string()),
        aktiv_fom: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        aktiv_tom: None,
        arbeidsgiver_forskutterer: Some(true),
        timestamp: Utc::now(),
    }
}

pub fn lest_status_message(narmesteleder_id: &str) -> LestStatusKafkaMessage {
    LestStatusKafkaMessage {
        kafka_metadata: LestStatusKafkaMetadata {
            timestamp: Utc::now(),
            source: "dinesykmeldte-backend".to_string(),
        },
        nl_read_count: NlReadCount {
            narmesteleder_id: narmesteleder_id.to_string(),
            unread_sykmeldinger: 1,
            unread_soknader: 0,
            unread_dialogmoter: 0,
            unread_oppfolgingsplaner: 0,
            unread_meldinger: 2,
        },
    }
}
