//! API routes.

pub mod dinesykmeldte;
pub mod internal;

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/dinesykmeldte", get(dinesykmeldte::get_dine_sykmeldte))
        .route(
            "/api/dinesykmeldte/:narmestelederId",
            get(dinesykmeldte::get_sykmeldt),
        )
        .route("/internal/is_alive", get(internal::is_alive))
        .route("/internal/is_ready", get(internal::is_ready))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
