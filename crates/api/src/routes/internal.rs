//! Liveness and readiness probes.

use axum::http::StatusCode;
use telemetry::health;

/// GET /internal/is_alive
pub async fn is_alive() -> (StatusCode, &'static str) {
    if health().is_alive() {
        (StatusCode::OK, "I'm alive! :)")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "I'm dead x_x")
    }
}

/// GET /internal/is_ready
pub async fn is_ready() -> (StatusCode, &'static str) {
    if health().is_ready() {
        (StatusCode::OK, "I'm ready! :)")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Please wait! I'm not ready :(")
    }
}
