//! Narmesteleder relationship store operations.

use sync_core::{NarmestelederLeesahMessage, Result};

use crate::client::{db_err, Db};

/// Upserts the relationship; an updated event for the same id wins.
pub async fn upsert_narmesteleder(db: &Db, message: &NarmestelederLeesahMessage) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO narmesteleder (narmeste_leder_id, pasient_fnr, leder_fnr, orgnummer)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (narmeste_leder_id) DO UPDATE
            SET pasient_fnr = EXCLUDED.pasient_fnr,
                leder_fnr = EXCLUDED.leder_fnr,
                orgnummer = EXCLUDED.orgnummer
        "#,
    )
    .bind(message.narmeste_leder_id.to_string())
    .bind(&message.fnr)
    .bind(&message.narmeste_leder_fnr)
    .bind(&message.orgnummer)
    .execute(db.pool())
    .await
    .map_err(db_err)?;
    Ok(())
}

/// Deletes the relationship for a tombstoned or deactivated id.
pub async fn delete_narmesteleder(db: &Db, narmesteleder_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM narmesteleder WHERE narmeste_leder_id = $1")
        .bind(narmesteleder_id)
        .execute(db.pool())
        .await
        .map_err(db_err)?;
    Ok(())
}
