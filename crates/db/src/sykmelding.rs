//! Sykmelding store operations: upsert/tombstone on the write path, the
//! aggregated leder join on the read path, and the retention purge.

use chrono::NaiveDate;
use sqlx::FromRow;
use sync_core::{
    Ansatt, Error, NlReadCount, Result, SykmeldingArbeidsgiverKafkaMessage,
    SykmeldingArbeidsgiverRow,
};
use tracing::debug;

use crate::client::{db_err, Db};

/// Upserts the sykmelding and the denormalized sykmeldt row in one
/// transaction; both commit or neither does.
pub async fn upsert_sykmelding(
    db: &Db,
    message: &SykmeldingArbeidsgiverKafkaMessage,
    pasient_navn: &str,
    latest_tom: NaiveDate,
) -> Result<()> {
    let arbeidsgiver = message
        .event
        .arbeidsgiver
        .as_ref()
        .ok_or_else(|| Error::validation("sykmelding event without arbeidsgiver"))?;
    let sykmelding = serde_json::to_value(&message.sykmelding)?;

    let mut tx = db.pool().begin().await.map_err(db_err)?;

    sqlx::query(
        r#"
        INSERT INTO sykmelding_arbeidsgiver
            (sykmelding_id, pasient_fnr, orgnummer, juridisk_orgnummer, orgnavn, timestamp, latest_tom, sykmelding)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (sykmelding_id) DO UPDATE
            SET pasient_fnr = EXCLUDED.pasient_fnr,
                orgnummer = EXCLUDED.orgnummer,
                juridisk_orgnummer = EXCLUDED.juridisk_orgnummer,
                orgnavn = EXCLUDED.orgnavn,
                timestamp = EXCLUDED.timestamp,
                latest_tom = EXCLUDED.latest_tom,
                sykmelding = EXCLUDED.sykmelding
        "#,
    )
    .bind(&message.sykmelding.id)
    .bind(&message.kafka_metadata.fnr)
    .bind(&arbeidsgiver.orgnummer)
    .bind(&arbeidsgiver.juridisk_orgnummer)
    .bind(&arbeidsgiver.org_navn)
    .bind(message.event.timestamp)
    .bind(latest_tom)
    .bind(&sykmelding)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    sqlx::query(
        r#"
        INSERT INTO sykmeldt (pasient_fnr, pasient_navn, latest_tom)
        VALUES ($1, $2, $3)
        ON CONFLICT (pasient_fnr) DO UPDATE
            SET pasient_navn = EXCLUDED.pasient_navn,
                latest_tom = EXCLUDED.latest_tom
        "#,
    )
    .bind(&message.kafka_metadata.fnr)
    .bind(pasient_navn)
    .bind(latest_tom)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;

    tx.commit().await.map_err(db_err)?;
    Ok(())
}

/// Deletes the sykmelding for a tombstoned key.
pub async fn delete_sykmelding(db: &Db, sykmelding_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM sykmelding_arbeidsgiver WHERE sykmelding_id = $1")
        .bind(sykmelding_id)
        .execute(db.pool())
        .await
        .map_err(db_err)?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct AggregatedRow {
    narmeste_leder_id: String,
    pasient_fnr: String,
    pasient_navn: String,
    orgnummer: String,
    orgnavn: String,
    sykmelding: serde_json::Value,
    unread_sykmeldinger: Option<i32>,
    unread_soknader: Option<i32>,
    unread_dialogmoter: Option<i32>,
    unread_oppfolgingsplaner: Option<i32>,
    unread_meldinger: Option<i32>,
}

impl AggregatedRow {
    fn into_core(self) -> Result<SykmeldingArbeidsgiverRow> {
        let lest_status = read_count(
            &self.narmeste_leder_id,
            self.unread_sykmeldinger,
            self.unread_soknader,
            self.unread_dialogmoter,
            self.unread_oppfolgingsplaner,
            self.unread_meldinger,
        );
        Ok(SykmeldingArbeidsgiverRow {
            narmesteleder_id: self.narmeste_leder_id,
            pasient_fnr: self.pasient_fnr,
            pasient_navn: self.pasient_navn,
            orgnummer: self.orgnummer,
            orgnavn: self.orgnavn,
            sykmelding: serde_json::from_value(self.sykmelding)?,
            lest_status,
        })
    }
}

fn read_count(
    narmesteleder_id: &str,
    unread_sykmeldinger: Option<i32>,
    unread_soknader: Option<i32>,
    unread_dialogmoter: Option<i32>,
    unread_oppfolgingsplaner: Option<i32>,
    unread_meldinger: Option<i32>,
) -> Option<NlReadCount> {
    unread_sykmeldinger.map(|unread_sykmeldinger| NlReadCount {
        narmesteleder_id: narmesteleder_id.to_string(),
        unread_sykmeldinger,
        unread_soknader: unread_soknader.unwrap_or(0),
        unread_dialogmoter: unread_dialogmoter.unwrap_or(0),
        unread_oppfolgingsplaner: unread_oppfolgingsplaner.unwrap_or(0),
        unread_meldinger: unread_meldinger.unwrap_or(0),
    })
}

const AGGREGATED_SELECT: &str = r#"
    SELECT nl.narmeste_leder_id, nl.pasient_fnr, s.pasient_navn, nl.orgnummer,
           sa.orgnavn, sa.sykmelding,
           rs.unread_sykmeldinger, rs.unread_soknader, rs.unread_dialogmoter,
           rs.unread_oppfolgingsplaner, rs.unread_meldinger
    FROM narmesteleder AS nl
    INNER JOIN sykmelding_arbeidsgiver AS sa
        ON sa.pasient_fnr = nl.pasient_fnr AND sa.orgnummer = nl.orgnummer
    INNER JOIN sykmeldt AS s
        ON s.pasient_fnr = nl.pasient_fnr
    LEFT JOIN narmesteleder_read_status AS rs
        ON rs.narmesteleder_id = nl.narmeste_leder_id
"#;

/// Aggregated leder view: all sykmeldinger visible to the leder, joined on
/// both employee fnr and orgnummer so a relationship at one org never
/// surfaces the employee's sykmeldinger from another org.
pub async fn get_sykmeldinger(
    db: &Db,
    leder_fnr: &str,
    narmesteleder_id: Option<&str>,
) -> Result<Vec<SykmeldingArbeidsgiverRow>> {
    let rows: Vec<AggregatedRow> = match narmesteleder_id {
        None => {
            let sql = format!(
                "{AGGREGATED_SELECT} WHERE nl.leder_fnr = $1 ORDER BY nl.narmeste_leder_id"
            );
            sqlx::query_as(&sql)
                .bind(leder_fnr)
                .fetch_all(db.pool())
                .await
                .map_err(db_err)?
        }
        Some(narmesteleder_id) => {
            let sql = format!(
                "{AGGREGATED_SELECT} WHERE nl.leder_fnr = $1 AND nl.narmeste_leder_id = $2"
            );
            sqlx::query_as(&sql)
                .bind(leder_fnr)
                .bind(narmesteleder_id)
                .fetch_all(db.pool())
                .await
                .map_err(db_err)?
        }
    };

    rows.into_iter().map(AggregatedRow::into_core).collect()
}

#[derive(Debug, FromRow)]
struct AnsattRow {
    narmeste_leder_id: String,
    pasient_fnr: String,
    orgnummer: String,
    pasient_navn: Option<String>,
    unread_sykmeldinger: Option<i32>,
    unread_soknader: Option<i32>,
    unread_dialogmoter: Option<i32>,
    unread_oppfolgingsplaner: Option<i32>,
    unread_meldinger: Option<i32>,
}

/// Looks up one relationship for the leder, independent of sykmeldinger.
///
/// None means the leder has no such relationship; a Some with `navn: None`
/// means the relationship exists but no sykmelding has been synced for the
/// employee yet.
pub async fn get_ansatt(
    db: &Db,
    narmesteleder_id: &str,
    leder_fnr: &str,
) -> Result<Option<Ansatt>> {
    let row: Option<AnsattRow> = sqlx::query_as(
        r#"
        SELECT nl.narmeste_leder_id, nl.pasient_fnr, nl.orgnummer, s.pasient_navn,
               rs.unread_sykmeldinger, rs.unread_soknader, rs.unread_dialogmoter,
               rs.unread_oppfolgingsplaner, rs.unread_meldinger
        FROM narmesteleder AS nl
        LEFT JOIN sykmeldt AS s ON s.pasient_fnr = nl.pasient_fnr
        LEFT JOIN narmesteleder_read_status AS rs
            ON rs.narmesteleder_id = nl.narmeste_leder_id
        WHERE nl.narmeste_leder_id = $1 AND nl.leder_fnr = $2
        "#,
    )
    .bind(narmesteleder_id)
    .bind(leder_fnr)
    .fetch_optional(db.pool())
    .await
    .map_err(db_err)?;

    Ok(row.map(|row| {
        let lest_status = read_count(
            &row.narmeste_leder_id,
            row.unread_sykmeldinger,
            row.unread_soknader,
            row.unread_dialogmoter,
            row.unread_oppfolgingsplaner,
            row.unread_meldinger,
        );
        Ansatt {
            narmesteleder_id: row.narmeste_leder_id,
            fnr: row.pasient_fnr,
            orgnummer: row.orgnummer,
            navn: row.pasient_navn,
            lest_status,
        }
    }))
}

/// Counts returned by the retention purge.
#[derive(Debug, Clone, Copy)]
pub struct PurgeResult {
    pub sykmeldinger: u64,
    pub sykmeldte: u64,
}

/// Deletes sykmeldinger and sykmeldte whose latest periode ended before the
/// cutoff. Both deletes run in one transaction.
pub async fn delete_expired(db: &Db, cutoff: NaiveDate) -> Result<PurgeResult> {
    let mut tx = db.pool().begin().await.map_err(db_err)?;

    let sykmeldinger = sqlx::query("DELETE FROM sykmelding_arbeidsgiver WHERE latest_tom < $1")
        .bind(cutoff)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?
        .rows_affected();

    let sykmeldte = sqlx::query("DELETE FROM sykmeldt WHERE latest_tom < $1")
        .bind(cutoff)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?
        .rows_affected();

    tx.commit().await.map_err(db_err)?;

    debug!(
        cutoff = %cutoff,
        sykmeldinger = sykmeldinger,
        sykmeldte = sykmeldte,
        "Deleted expired rows"
    );

    Ok(PurgeResult {
        sykmeldinger,
        sykmeldte,
    })
}
