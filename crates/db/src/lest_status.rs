//! Read-status store operations.

use sqlx::FromRow;
use sync_core::{NlReadCount, Result};

use crate::client::{db_err, Db};

/// Upserts the five unread counters for a relationship.
pub async fn upsert_read_status(db: &Db, read_count: &NlReadCount) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO narmesteleder_read_status
            (narmesteleder_id, unread_sykmeldinger, unread_soknader, unread_dialogmoter,
             unread_oppfolgingsplaner, unread_meldinger)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (narmesteleder_id) DO UPDATE
            SET unread_sykmeldinger = EXCLUDED.unread_sykmeldinger,
                unread_soknader = EXCLUDED.unread_soknader,
                unread_dialogmoter = EXCLUDED.unread_dialogmoter,
                unread_oppfolgingsplaner = EXCLUDED.unread_oppfolgingsplaner,
                unread_meldinger = EXCLUDED.unread_meldinger
        "#,
    )
    .bind(&read_count.narmesteleder_id)
    .bind(read_count.unread_sykmeldinger)
    .bind(read_count.unread_soknader)
    .bind(read_count.unread_dialogmoter)
    .bind(read_count.unread_oppfolgingsplaner)
    .bind(read_count.unread_meldinger)
    .execute(db.pool())
    .await
    .map_err(db_err)?;
    Ok(())
}

/// Deletes the counters for a tombstoned relationship id.
pub async fn delete_read_status(db: &Db, narmesteleder_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM narmesteleder_read_status WHERE narmesteleder_id = $1")
        .bind(narmesteleder_id)
        .execute(db.pool())
        .await
        .map_err(db_err)?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct ReadStatusRow {
    narmesteleder_id: String,
    unread_sykmeldinger: i32,
    unread_soknader: i32,
    unread_dialogmoter: i32,
    unread_oppfolgingsplaner: i32,
    unread_meldinger: i32,
}

/// Fetches the counters for one relationship.
pub async fn get_read_status(db: &Db, narmesteleder_id: &str) -> Result<Option<NlReadCount>> {
    let row: Option<ReadStatusRow> = sqlx::query_as(
        r#"
        SELECT narmesteleder_id, unread_sykmeldinger, unread_soknader, unread_dialogmoter,
               unread_oppfolgingsplaner, unread_meldinger
        FROM narmesteleder_read_status
        WHERE narmesteleder_id = $1
        "#,
    )
    .bind(narmesteleder_id)
    .fetch_optional(db.pool())
    .await
    .map_err(db_err)?;

    Ok(row.map(|row| NlReadCount {
        narmesteleder_id: row.narmesteleder_id,
        unread_sykmeldinger: row.unread_sykmeldinger,
        unread_soknader: row.unread_soknader,
        unread_dialogmoter: row.unread_dialogmoter,
        unread_oppfolgingsplaner: row.unread_oppfolgingsplaner,
        unread_meldinger: row.unread_meldinger,
    }))
}
