//! API tests for the Dine Sykmeldte endpoints.
//!
//! Auth runs in mock mode: the bearer token is used verbatim as the leder
//! fnr. Everything else is the production code path against a real
//! Postgres testcontainer.

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use integration_tests::{fixtures, setup::TestContext};
use uuid::Uuid;

const FNR: &str = "12345678901";
const ORGNUMMER: &str = "999000999";
const LEDER_FNR: &str = "11111111111";

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn insert_relationship(ctx: &TestContext, narmesteleder_id: Uuid, orgnummer: &str) {
    let message = fixtures::narmesteleder_message(narmesteleder_id, FNR, orgnummer, LEDER_FNR);
    db::narmesteleder::upsert_narmesteleder(&ctx.db, &message)
        .await
        .unwrap();
}

async fn insert_sykmelding(ctx: &TestContext, sykmelding_id: &str, orgnummer: &str) {
    let today = Utc::now().date_naive();
    let message = fixtures::sykmelding_message(
        sykmelding_id,
        FNR,
        orgnummer,
        today - Duration::days(10),
        today + Duration::days(5),
    );
    db::sykmelding::upsert_sykmelding(
        &ctx.db,
        &message,
        "Ola Nordmann",
        message.sykmelding.latest_tom().unwrap(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_missing_bearer_token_is_401() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/api/dinesykmeldte").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server.get("/api/dinesykmeldte/some-id").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_leder_without_data_gets_empty_list() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .get("/api/dinesykmeldte")
        .add_header("Authorization", bearer(LEDER_FNR))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body.as_array().map(|a| a.len()), Some(0));
}

#[tokio::test]
async fn test_aggregated_view_for_leder() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let narmesteleder_id = Uuid::new_v4();

    insert_relationship(&ctx, narmesteleder_id, ORGNUMMER).await;
    insert_sykmelding(&ctx, "syk-1", ORGNUMMER).await;
    db::lest_status::upsert_read_status(
        &ctx.db,
        &fixtures::lest_status_message(&narmesteleder_id.to_string()).nl_read_count,
    )
    .await
    .unwrap();

    let response = server
        .get("/api/dinesykmeldte")
        .add_header("Authorization", bearer(LEDER_FNR))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let views = body.as_array().expect("array response");
    assert_eq!(views.len(), 1);

    let view = &views[0];
    assert_eq!(view["narmestelederId"], narmesteleder_id.to_string());
    assert_eq!(view["fnr"], FNR);
    assert_eq!(view["orgnummer"], ORGNUMMER);
    assert_eq!(view["navn"], "Ola Nordmann");
    assert_eq!(view["aktivSykmelding"], true);
    assert_eq!(view["lestStatus"]["unreadSykmeldinger"], 1);

    let sykmeldinger = view["sykmeldinger"].as_array().unwrap();
    assert_eq!(sykmeldinger.len(), 1);
    assert_eq!(sykmeldinger[0]["sykmeldingId"], "syk-1");
    assert_eq!(sykmeldinger[0]["arbeidsgiver"], "Bedriften AS");
    assert_eq!(sykmeldinger[0]["bekreftelse"]["sykmelder"], "Lege Legesen");
}

#[tokio::test]
async fn test_relationship_at_other_org_sees_nothing() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let narmesteleder_id = Uuid::new_v4();

    // Relationship at one org, sykmelding filed under another: the join on
    // both fnr and orgnummer must keep them apart
    insert_relationship(&ctx, narmesteleder_id, ORGNUMMER).await;
    insert_sykmelding(&ctx, "syk-1", "111222333").await;

    let response = server
        .get("/api/dinesykmeldte")
        .add_header("Authorization", bearer(LEDER_FNR))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body.as_array().map(|a| a.len()), Some(0));
}

#[tokio::test]
async fn test_unknown_relationship_is_404() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .get(&format!("/api/dinesykmeldte/{}", Uuid::new_v4()))
        .add_header("Authorization", bearer(LEDER_FNR))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_leders_relationship_is_404() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let narmesteleder_id = Uuid::new_v4();

    insert_relationship(&ctx, narmesteleder_id, ORGNUMMER).await;

    // Another leder must not see the relationship at all
    let response = server
        .get(&format!("/api/dinesykmeldte/{}", narmesteleder_id))
        .add_header("Authorization", bearer("99999999999"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_relationship_without_sykmeldinger_is_empty_view_not_404() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let narmesteleder_id = Uuid::new_v4();

    insert_relationship(&ctx, narmesteleder_id, ORGNUMMER).await;

    let response = server
        .get(&format!("/api/dinesykmeldte/{}", narmesteleder_id))
        .add_header("Authorization", bearer(LEDER_FNR))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["narmestelederId"], narmesteleder_id.to_string());
    assert_eq!(body["sykmeldinger"].as_array().map(|a| a.len()), Some(0));
    assert_eq!(body["aktivSykmelding"], false);
}

#[tokio::test]
async fn test_single_lookup_returns_view_with_details() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    let narmesteleder_id = Uuid::new_v4();

    insert_relationship(&ctx, narmesteleder_id, ORGNUMMER).await;
    insert_sykmelding(&ctx, "syk-1", ORGNUMMER).await;

    let response = server
        .get(&format!("/api/dinesykmeldte/{}", narmesteleder_id))
        .add_header("Authorization", bearer(LEDER_FNR))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["aktivSykmelding"], true);
    assert_eq!(
        body["sykmeldinger"].as_array().map(|a| a.len()),
        Some(1)
    );
}

#[tokio::test]
async fn test_internal_probes() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/internal/is_alive").await;
    response.assert_status_ok();
    response.assert_text("I'm alive! :)");

    let response = server.get("/internal/is_ready").await;
    response.assert_status_ok();
    response.assert_text("I'm ready! :)");
}
