//! Dine Sykmeldte endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use sync_core::Sykmeldt;

use crate::extractors::AuthContext;
use crate::response::ApiError;
use crate::state::AppState;

/// GET /api/dinesykmeldte - all sykmeldte for the authenticated leder.
pub async fn get_dine_sykmeldte(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<Sykmeldt>>, ApiError> {
    let sykmeldte = state
        .dinesykmeldte
        .get_dine_sykmeldte(&auth.leder_fnr)
        .await?;
    Ok(Json(sykmeldte))
}

/// GET /api/dinesykmeldte/{narmestelederId} - one sykmeldt, or 404 when the
/// leder has no such relationship.
pub async fn get_sykmeldt(
    State(state): State<AppState>,
    Path(narmesteleder_id): Path<String>,
    auth: AuthContext,
) -> Result<Json<Sykmeldt>, ApiError> {
    match state
        .dinesykmeldte
        .get_sykmeldt(&narmesteleder_id, &auth.leder_fnr)
        .await?
    {
        Some(sykmeldt) => Ok(Json(sykmeldt)),
        None => Err(ApiError::not_found()),
    }
}
