//! Application state shared across handlers.

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use sync_core::{Error, Result};
use tracing::{debug, warn};

use crate::service::DineSykmeldteService;
use db::Db;

/// Cache TTL for token introspection responses (30 seconds).
const AUTH_CACHE_TTL: Duration = Duration::from_secs(30);

/// Maximum cache entries.
const AUTH_CACHE_MAX_CAPACITY: u64 = 10_000;

/// Assurance levels accepted for the leder API.
const ACCEPTED_ACR: [&str; 2] = ["Level4", "idporten-loa-high"];

/// The verified caller: a narmesteleder identified by national id.
#[derive(Debug, Clone)]
pub struct Principal {
    pub fnr: String,
}

/// Token introspection response from the auth capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenIntrospection {
    pub active: bool,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub acr: Option<String>,
}

/// Bearer-token verification client.
///
/// JWT mechanics live behind the introspection endpoint; this only asks
/// "is this token good, and for whom". Responses are cached for 30 seconds
/// to keep token verification off the hot path.
#[derive(Clone)]
pub struct AuthClient {
    /// Introspection endpoint URL
    introspection_url: String,
    http_client: reqwest::Client,
    /// Introspection cache (token -> response)
    cache: Cache<String, TokenIntrospection>,
    /// Mock mode (for testing): any bearer token is accepted and used as
    /// the subject
    mock_mode: bool,
}

impl AuthClient {
    pub fn new(introspection_url: impl Into<String>) -> Self {
        let introspection_url = introspection_url.into();
        let mock_mode = introspection_url.is_empty() || introspection_url == "mock";

        Self {
            introspection_url,
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("Failed to create HTTP client"),
            cache: Cache::builder()
                .max_capacity(AUTH_CACHE_MAX_CAPACITY)
                .time_to_live(AUTH_CACHE_TTL)
                .build(),
            mock_mode,
        }
    }

    /// Verify a bearer token and resolve the caller.
    pub async fn validate(&self, token: &str) -> Result<Principal> {
        let introspection = match self.cache.get(token).await {
            Some(cached) => {
                debug!("Auth cache hit");
                cached
            }
            None => {
                let introspection = if self.mock_mode {
                    self.mock_introspect(token)
                } else {
                    self.remote_introspect(token).await?
                };
                self.cache
                    .insert(token.to_string(), introspection.clone())
                    .await;
                introspection
            }
        };

        if !introspection.active {
            return Err(Error::unauthorized("token is not active"));
        }

        let acceptable_acr = introspection
            .acr
            .as_deref()
            .is_some_and(|acr| ACCEPTED_ACR.contains(&acr));
        if !acceptable_acr {
            return Err(Error::unauthorized("insufficient assurance level"));
        }

        let fnr = introspection
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| Error::unauthorized("token without subject"))?;

        Ok(Principal { fnr })
    }

    async fn remote_introspect(&self, token: &str) -> Result<TokenIntrospection> {
        debug!(url = %self.introspection_url, "Calling token introspection");

        let response = self
            .http_client
            .post(&self.introspection_url)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Token introspection request failed");
                Error::internal(format!("auth service unavailable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "Token introspection returned error");
            return Err(Error::internal(format!(
                "auth service returned {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse introspection response");
            Error::internal(format!("invalid auth response: {}", e))
        })
    }

    /// Mock introspection for testing/development.
    fn mock_introspect(&self, token: &str) -> TokenIntrospection {
        debug!("Using mock token introspection");
        TokenIntrospection {
            active: true,
            sub: Some(token.to_string()),
            acr: Some("Level4".to_string()),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Postgres store
    pub db: Arc<Db>,
    /// Aggregation service
    pub dinesykmeldte: DineSykmeldteService,
    /// Bearer-token verification client
    pub auth_client: AuthClient,
}

impl AppState {
    pub fn new(db: Arc<Db>, introspection_url: impl Into<String>) -> Self {
        Self {
            dinesykmeldte: DineSykmeldteService::new(db.clone()),
            db,
            auth_client: AuthClient::new(introspection_url),
        }
    }
}
