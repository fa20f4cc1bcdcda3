//! Table definitions, executed at startup.

/// DDL for all tables, in creation order.
pub fn all_tables() -> &'static [&'static str] {
    &[
        r#"
        CREATE TABLE IF NOT EXISTS sykmelding_arbeidsgiver (
            sykmelding_id      TEXT PRIMARY KEY,
            pasient_fnr        TEXT        NOT NULL,
            orgnummer          TEXT        NOT NULL,
            juridisk_orgnummer TEXT,
            orgnavn            TEXT        NOT NULL,
            timestamp          TIMESTAMPTZ NOT NULL,
            latest_tom         DATE        NOT NULL,
            sykmelding         JSONB       NOT NULL
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS sykmelding_arbeidsgiver_pasient_fnr_idx
            ON sykmelding_arbeidsgiver (pasient_fnr)
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS sykmelding_arbeidsgiver_latest_tom_idx
            ON sykmelding_arbeidsgiver (latest_tom)
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS sykmeldt (
            pasient_fnr  TEXT PRIMARY KEY,
            pasient_navn TEXT NOT NULL,
            latest_tom   DATE NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS narmesteleder (
            narmeste_leder_id TEXT PRIMARY KEY,
            pasient_fnr       TEXT NOT NULL,
            leder_fnr         TEXT NOT NULL,
            orgnummer         TEXT NOT NULL
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS narmesteleder_leder_fnr_idx
            ON narmesteleder (leder_fnr)
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS narmesteleder_read_status (
            narmesteleder_id       TEXT PRIMARY KEY,
            unread_sykmeldinger    INT NOT NULL,
            unread_soknader        INT NOT NULL,
            unread_dialogmoter     INT NOT NULL,
            unread_oppfolgingsplaner INT NOT NULL,
            unread_meldinger       INT NOT NULL
        )
        "#,
    ]
}
