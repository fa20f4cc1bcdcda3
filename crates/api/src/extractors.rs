//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated context: the narmesteleder making the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The leder's national id, from the verified token subject
    pub leder_fnr: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

        let principal = state.auth_client.validate(token).await?;

        Ok(AuthContext {
            leder_fnr: principal.fnr,
        })
    }
}
