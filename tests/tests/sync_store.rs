//! Store-level tests: upsert idempotence, tombstones, the sykmeldt cache
//! and the retention boundary.
//!
//! Requires Docker to be running for the Postgres testcontainer.

use chrono::{Duration, Utc};
use integration_tests::{fixtures, setup::TestContext};
use sync_core::sync_cutoff;
use uuid::Uuid;

const FNR: &str = "12345678901";
const ORGNUMMER: &str = "999000999";
const LEDER_FNR: &str = "11111111111";

#[tokio::test]
async fn test_upsert_is_idempotent_and_update_wins() {
    let ctx = TestContext::new().await;
    let today = Utc::now().date_naive();

    let message = fixtures::sykmelding_message(
        "syk-1",
        FNR,
        ORGNUMMER,
        today - Duration::days(10),
        today + Duration::days(5),
    );
    let latest_tom = message.sykmelding.latest_tom().unwrap();

    db::sykmelding::upsert_sykmelding(&ctx.db, &message, "Ola Nordmann", latest_tom)
        .await
        .unwrap();
    db::sykmelding::upsert_sykmelding(&ctx.db, &message, "Ola Nordmann", latest_tom)
        .await
        .unwrap();

    assert_eq!(ctx.count("sykmelding_arbeidsgiver").await, 1);
    assert_eq!(ctx.count("sykmeldt").await, 1);

    // An updated event for the same key must win
    let mut updated = message.clone();
    updated.event.arbeidsgiver.as_mut().unwrap().org_navn = "Nytt Navn AS".to_string();
    db::sykmelding::upsert_sykmelding(&ctx.db, &updated, "Ola Nordmann", latest_tom)
        .await
        .unwrap();

    let orgnavn: String =
        sqlx::query_scalar("SELECT orgnavn FROM sykmelding_arbeidsgiver WHERE sykmelding_id = $1")
            .bind("syk-1")
            .fetch_one(ctx.db.pool())
            .await
            .unwrap();
    assert_eq!(orgnavn, "Nytt Navn AS");
    assert_eq!(ctx.count("sykmelding_arbeidsgiver").await, 1);
}

#[tokio::test]
async fn test_tombstone_removes_sykmelding() {
    let ctx = TestContext::new().await;
    let today = Utc::now().date_naive();

    let message = fixtures::sykmelding_message(
        "syk-1",
        FNR,
        ORGNUMMER,
        today - Duration::days(10),
        today + Duration::days(5),
    );
    let latest_tom = message.sykmelding.latest_tom().unwrap();

    db::sykmelding::upsert_sykmelding(&ctx.db, &message, "Ola Nordmann", latest_tom)
        .await
        .unwrap();
    assert_eq!(ctx.count("sykmelding_arbeidsgiver").await, 1);

    db::sykmelding::delete_sykmelding(&ctx.db, "syk-1").await.unwrap();
    assert_eq!(ctx.count("sykmelding_arbeidsgiver").await, 0);
}

#[tokio::test]
async fn test_sykmeldt_cache_follows_latest_write() {
    let ctx = TestContext::new().await;
    let today = Utc::now().date_naive();

    let first = fixtures::sykmelding_message(
        "syk-1",
        FNR,
        ORGNUMMER,
        today - Duration::days(20),
        today - Duration::days(10),
    );
    db::sykmelding::upsert_sykmelding(
        &ctx.db,
        &first,
        "Ola Nordmann",
        first.sykmelding.latest_tom().unwrap(),
    )
    .await
    .unwrap();

    // A later sykmelding for the same person refreshes name and date
    let second = fixtures::sykmelding_message(
        "syk-2",
        FNR,
        ORGNUMMER,
        today - Duration::days(5),
        today + Duration::days(10),
    );
    db::sykmelding::upsert_sykmelding(
        &ctx.db,
        &second,
        "Kari Nordmann",
        second.sykmelding.latest_tom().unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(ctx.count("sykmelding_arbeidsgiver").await, 2);
    assert_eq!(ctx.count("sykmeldt").await, 1);

    let (navn, latest_tom): (String, chrono::NaiveDate) =
        sqlx::query_as("SELECT pasient_navn, latest_tom FROM sykmeldt WHERE pasient_fnr = $1")
            .bind(FNR)
            .fetch_one(ctx.db.pool())
            .await
            .unwrap();
    assert_eq!(navn, "Kari Nordmann");
    assert_eq!(latest_tom, today + Duration::days(10));
}

#[tokio::test]
async fn test_retention_boundary() {
    let ctx = TestContext::new().await;
    let today = Utc::now().date_naive();
    let cutoff = sync_cutoff(today);

    // One record exactly on the cutoff (kept), one a day older (purged).
    // Writes bypass the consumer window check on purpose.
    let kept = fixtures::sykmelding_message("kept", FNR, ORGNUMMER, cutoff - Duration::days(14), cutoff);
    db::sykmelding::upsert_sykmelding(&ctx.db, &kept, "Ola Nordmann", cutoff)
        .await
        .unwrap();

    let expired = fixtures::sykmelding_message(
        "expired",
        "10987654321",
        ORGNUMMER,
        cutoff - Duration::days(14),
        cutoff - Duration::days(1),
    );
    db::sykmelding::upsert_sykmelding(&ctx.db, &expired, "Kari Nordmann", cutoff - Duration::days(1))
        .await
        .unwrap();

    let result = db::sykmelding::delete_expired(&ctx.db, cutoff).await.unwrap();
    assert_eq!(result.sykmeldinger, 1);
    assert_eq!(result.sykmeldte, 1);

    let remaining: Vec<String> =
        sqlx::query_scalar("SELECT sykmelding_id FROM sykmelding_arbeidsgiver")
            .fetch_all(ctx.db.pool())
            .await
            .unwrap();
    assert_eq!(remaining, vec!["kept".to_string()]);
}

#[tokio::test]
async fn test_narmesteleder_upsert_and_delete() {
    let ctx = TestContext::new().await;
    let narmesteleder_id = Uuid::new_v4();

    let message = fixtures::narmesteleder_message(narmesteleder_id, FNR, ORGNUMMER, LEDER_FNR);
    db::narmesteleder::upsert_narmesteleder(&ctx.db, &message)
        .await
        .unwrap();
    assert_eq!(ctx.count("narmesteleder").await, 1);

    // A relationship moved to another leder must win over the old row
    let mut moved = message.clone();
    moved.narmeste_leder_fnr = "22222222222".to_string();
    db::narmesteleder::upsert_narmesteleder(&ctx.db, &moved)
        .await
        .unwrap();
    assert_eq!(ctx.count("narmesteleder").await, 1);

    let leder: String =
        sqlx::query_scalar("SELECT leder_fnr FROM narmesteleder WHERE narmeste_leder_id = $1")
            .bind(narmesteleder_id.to_string())
            .fetch_one(ctx.db.pool())
            .await
            .unwrap();
    assert_eq!(leder, "22222222222");

    db::narmesteleder::delete_narmesteleder(&ctx.db, &narmesteleder_id.to_string())
        .await
        .unwrap();
    assert_eq!(ctx.count("narmesteleder").await, 0);
}

#[tokio::test]
async fn test_read_status_roundtrip() {
    let ctx = TestContext::new().await;

    let message = fixtures::lest_status_message("nl-1");
    db::lest_status::upsert_read_status(&ctx.db, &message.nl_read_count)
        .await
        .unwrap();

    let stored = db::lest_status::get_read_status(&ctx.db, "nl-1")
        .await
        .unwrap()
        .expect("read status should exist");
    assert_eq!(stored.unread_sykmeldinger, 1);
    assert_eq!(stored.unread_meldinger, 2);

    // Upsert replaces the counters
    let mut updated = message.nl_read_count.clone();
    updated.unread_sykmeldinger = 0;
    db::lest_status::upsert_read_status(&ctx.db, &updated)
        .await
        .unwrap();
    let stored = db::lest_status::get_read_status(&ctx.db, "nl-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.unread_sykmeldinger, 0);

    db::lest_status::delete_read_status(&ctx.db, "nl-1").await.unwrap();
    assert!(db::lest_status::get_read_status(&ctx.db, "nl-1")
        .await
        .unwrap()
        .is_none());
}
