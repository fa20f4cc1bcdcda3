//! Read-side projections: aggregated store rows grouped into the per-leder
//! Dine Sykmeldte views.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lest_status::NlReadCount;
use crate::person::format_name;
use crate::sykmelding::{sync_cutoff, ArbeidsgiverSykmelding, Behandler};

/// One row of the aggregated leder view as read from the store:
/// narmesteleder x sykmelding_arbeidsgiver x sykmeldt, with the
/// relationship's read status when present.
#[derive(Debug, Clone)]
pub struct SykmeldingArbeidsgiverRow {
    pub narmesteleder_id: String,
    pub pasient_fnr: String,
    pub pasient_navn: String,
    pub orgnummer: String,
    pub orgnavn: String,
    pub sykmelding: ArbeidsgiverSykmelding,
    pub lest_status: Option<NlReadCount>,
}

/// A narmesteleder relationship row, independent of any sykmelding.
/// `navn` is None until a sykmelding for the employee has been synced.
#[derive(Debug, Clone)]
pub struct Ansatt {
    pub narmesteleder_id: String,
    pub fnr: String,
    pub orgnummer: String,
    pub navn: Option<String>,
    pub lest_status: Option<NlReadCount>,
}

/// One employee as shown to their narmesteleder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sykmeldt {
    pub narmesteleder_id: String,
    pub orgnummer: String,
    pub fnr: String,
    pub navn: Option<String>,
    pub sykmeldinger: Vec<DineSykmeldteSykmelding>,
    pub aktiv_sykmelding: bool,
    pub lest_status: Option<NlReadCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DineSykmeldteSykmelding {
    pub sykmelding_id: String,
    pub pasient: Pasient,
    pub mulighet_for_arbeid: MulighetForArbeid,
    pub skal_vise_skravert_felt: bool,
    pub friskmelding: Friskmelding,
    pub arbeidsgiver: String,
    pub bekreftelse: Bekreftelse,
    pub arbeidsevne: Arbeidsevne,
    pub innspill_til_arbeidsgiver: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pasient {
    pub fnr: String,
    pub navn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulighetForArbeid {
    pub perioder: Vec<Periode>,
    pub aktivitet_ikke_mulig434: Vec<String>,
    pub aarsak_aktivitet_ikke_mulig434: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Periode {
    pub fom: NaiveDate,
    pub tom: NaiveDate,
    pub grad: i32,
    pub behandlingsdager: Option<i32>,
    pub reisetilskudd: bool,
    pub avventende: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bekreftelse {
    pub sykmelder: String,
    pub utstedelsesdato: NaiveDate,
    pub sykmelder_tlf: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friskmelding {
    pub arbeidsfoer_etter_perioden: Option<bool>,
    pub hensyn_paa_arbeidsplassen: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arbeidsevne {
    pub tilrettelegging_arbeidsplass: Option<String>,
}

/// Group aggregated rows into one `Sykmeldt` per relationship.
///
/// Rows whose latest periode ended before the sync window are excluded
/// here as well, in case the sweeper has not caught up with them yet.
pub fn to_sykmeldt_views(rows: Vec<SykmeldingArbeidsgiverRow>, today: NaiveDate) -> Vec<Sykmeldt> {
    let cutoff = sync_cutoff(today);

    let mut groups: BTreeMap<String, Vec<SykmeldingArbeidsgiverRow>> = BTreeMap::new();
    for row in rows {
        if row.sykmelding.latest_tom().is_some_and(|tom| tom >= cutoff) {
            groups
                .entry(row.narmesteleder_id.clone())
                .or_default()
                .push(row);
        }
    }

    groups
        .into_values()
        .map(|rows| sykmeldt_from_rows(rows, today))
        .collect()
}

/// View for a relationship without any qualifying sykmelding.
pub fn sykmeldt_without_sykmeldinger(ansatt: Ansatt) -> Sykmeldt {
    Sykmeldt {
        narmesteleder_id: ansatt.narmesteleder_id,
        orgnummer: ansatt.orgnummer,
        fnr: ansatt.fnr,
        navn: ansatt.navn,
        sykmeldinger: Vec::new(),
        aktiv_sykmelding: false,
        lest_status: ansatt.lest_status,
    }
}

fn sykmeldt_from_rows(rows: Vec<SykmeldingArbeidsgiverRow>, today: NaiveDate) -> Sykmeldt {
    let aktiv_sykmelding = rows.iter().any(|row| row.sykmelding.is_active(today));
    let first = &rows[0];

    let mut sykmeldt = Sykmeldt {
        narmesteleder_id: first.narmesteleder_id.clone(),
        orgnummer: first.orgnummer.clone(),
        fnr: first.pasient_fnr.clone(),
        navn: Some(first.pasient_navn.clone()),
        lest_status: first.lest_status.clone(),
        sykmeldinger: Vec::new(),
        aktiv_sykmelding,
    };
    sykmeldt.sykmeldinger = rows.iter().map(to_dine_sykmeldte_sykmelding).collect();
    sykmeldt
}

fn to_dine_sykmeldte_sykmelding(row: &SykmeldingArbeidsgiverRow) -> DineSykmeldteSykmelding {
    let sykmelding = &row.sykmelding;

    DineSykmeldteSykmelding {
        sykmelding_id: sykmelding.id.clone(),
        pasient: Pasient {
            fnr: row.pasient_fnr.clone(),
            navn: row.pasient_navn.clone(),
        },
        mulighet_for_arbeid: MulighetForArbeid {
            perioder: sykmelding
                .sykmeldingsperioder
                .iter()
                .map(|p| Periode {
                    fom: p.fom,
                    tom: p.tom,
                    grad: p.gradert.as_ref().map(|g| g.grad).unwrap_or(100),
                    behandlingsdager: p.behandlingsdager,
                    reisetilskudd: p.reisetilskudd,
                    avventende: p.innspill_til_arbeidsgiver.clone(),
                })
                .collect(),
            aktivitet_ikke_mulig434: aktivitet_ikke_mulig(sykmelding),
            aarsak_aktivitet_ikke_mulig434: aktivitet_ikke_mulig_beskrivelse(sykmelding),
        },
        skal_vise_skravert_felt: true,
        friskmelding: Friskmelding {
            arbeidsfoer_etter_perioden: sykmelding
                .prognose
                .as_ref()
                .and_then(|p| p.arbeidsfor_etter_periode),
            hensyn_paa_arbeidsplassen: sykmelding
                .prognose
                .as_ref()
                .and_then(|p| p.hensyn_arbeidsplassen.clone()),
        },
        arbeidsgiver: row.orgnavn.clone(),
        bekreftelse: Bekreftelse {
            sykmelder: sykmelder_navn(&sykmelding.behandler),
            utstedelsesdato: sykmelding.behandlet_tidspunkt.date_naive(),
            sykmelder_tlf: sykmelding.behandler.tlf.clone(),
        },
        arbeidsevne: Arbeidsevne {
            tilrettelegging_arbeidsplass: sykmelding.tiltak_arbeidsplassen.clone(),
        },
        innspill_til_arbeidsgiver: sykmelding.melding_til_arbeidsgiver.clone(),
    }
}

fn sykmelder_navn(behandler: &Behandler) -> String {
    match &behandler.mellomnavn {
        Some(mellomnavn) if !mellomnavn.is_empty() => format_name(&format!(
            "{} {} {}",
            behandler.fornavn, mellomnavn, behandler.etternavn
        )),
        _ => format_name(&format!("{} {}", behandler.fornavn, behandler.etternavn)),
    }
}

fn aktivitet_ikke_mulig(sykmelding: &ArbeidsgiverSykmelding) -> Vec<String> {
    let mut arsaker: Vec<String> = Vec::new();
    let candidates = sykmelding
        .sykmeldingsperioder
        .iter()
        .filter_map(|p| p.aktivitet_ikke_mulig.as_ref())
        .filter_map(|a| a.arbeidsrelatert_arsak.as_ref())
        .flat_map(|a| a.arsak.iter().cloned());
    for arsak in candidates {
        if !arsaker.contains(&arsak) {
            arsaker.push(arsak);
        }
    }
    arsaker
}

fn aktivitet_ikke_mulig_beskrivelse(sykmelding: &ArbeidsgiverSykmelding) -> String {
    let mut beskrivelser: Vec<String> = Vec::new();
    for periode in &sykmelding.sykmeldingsperioder {
        if let Some(beskrivelse) = periode
            .aktivitet_ikke_mulig
            .as_ref()
            .and_then(|a| a.arbeidsrelatert_arsak.as_ref())
            .and_then(|a| a.beskrivelse.clone())
        {
            if !beskrivelser.contains(&beskrivelse) {
                beskrivelser.push(beskrivelse);
            }
        }
    }
    beskrivelser.join(", ")
}
