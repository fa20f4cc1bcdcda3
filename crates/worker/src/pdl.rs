//! Person-directory (PDL) lookups for the sykmelding enrichment path.
//!
//! The lookup is a pure read, so it is retried on server-class statuses and
//! transient network failures: 3 attempts with a constant 100ms delay.
//! "Name not found" is a data-quality signal, never retried; the sykmelding
//! handler decides whether it is ignorable or fatal for the cluster.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::time::{Duration, Instant};
use sync_core::{Error, Navn, Result};
use telemetry::metrics;
use tracing::{error, warn};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Margin subtracted from the token lifetime before it is refreshed.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(10);

const GET_PERSON_QUERY: &str = "query($ident: ID!) { hentPerson(ident: $ident) { navn(historikk: false) { fornavn mellomnavn etternavn } } }";

/// Resolve a person's name by national id.
#[async_trait]
pub trait PersonLookup: Send + Sync {
    async fn person_navn(&self, fnr: &str, call_id: &str) -> Result<Navn>;
}

/// PDL client configuration.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct PdlConfig {
    /// PDL graphql endpoint
    pub graphql_url: String,
    /// Machine-to-machine token endpoint
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    /// Scope requested for the PDL audience
    pub scope: String,
}

impl Default for PdlConfig {
    fn default() -> Self {
        Self {
            graphql_url: "http://pdl-api/graphql".to_string(),
            token_endpoint: "http://token-service/token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: "api://pdl-api/.default".to_string(),
        }
    }
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// PDL graphql client with machine-token auth and bounded retry.
pub struct PdlPersonClient {
    config: PdlConfig,
    http_client: reqwest::Client,
    token: RwLock<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct GetPersonResponse {
    data: Option<PersonData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonData {
    hent_person: Option<HentPerson>,
}

#[derive(Debug, Deserialize)]
struct HentPerson {
    navn: Vec<Navn>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl PdlPersonClient {
    pub fn new(config: PdlConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::internal(format!("failed to create http client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            token: RwLock::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        {
            let token = self.token.read();
            if let Some(ref token) = *token {
                if token.expires_at > Instant::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let response = self
            .http_client
            .post(&self.config.token_endpoint)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", self.config.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::upstream(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::upstream(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("invalid token response: {}", e)))?;

        let expires_in = Duration::from_secs(token.expires_in)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + expires_in,
        };
        *self.token.write() = Some(cached);

        Ok(token.access_token)
    }

    async fn get_person(&self, fnr: &str, call_id: &str) -> Result<Navn> {
        let access_token = self.access_token().await?;

        let body = serde_json::json!({
            "query": GET_PERSON_QUERY,
            "variables": { "ident": fnr },
        });

        let response = self
            .http_client
            .post(&self.config.graphql_url)
            .bearer_auth(access_token)
            .header("Tema", "SYM")
            .header("Nav-Call-Id", call_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("pdl request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::upstream(format!(
                "pdl returned {}",
                response.status()
            )));
        }

        let person: GetPersonResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("invalid pdl response: {}", e)))?;

        if let Some(errors) = person.errors {
            for graphql_error in &errors {
                error!(call_id = call_id, "PDL returned error: {}", graphql_error.message);
            }
        }

        person
            .data
            .and_then(|data| data.hent_person)
            .and_then(|person| person.navn.into_iter().next())
            .ok_or_else(|| Error::person_not_found(format!("no name in pdl for {}", call_id)))
    }
}

fn is_retryable(error: &Error) -> bool {
    matches!(error, Error::Upstream(_))
}

#[async_trait]
impl PersonLookup for PdlPersonClient {
    async fn person_navn(&self, fnr: &str, call_id: &str) -> Result<Navn> {
        metrics().pdl_lookups.inc();

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                warn!(call_id = call_id, attempt = attempt, "Retrying pdl lookup");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            match self.get_person(fnr, call_id).await {
                Ok(navn) => return Ok(navn),
                Err(e) if is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => {
                    metrics().pdl_lookup_failures.inc();
                    return Err(e);
                }
            }
        }

        metrics().pdl_lookup_failures.inc();
        Err(last_error
            .unwrap_or_else(|| Error::upstream("pdl lookup failed with unknown error")))
    }
}
