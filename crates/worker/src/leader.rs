//! Leader election as a pluggable capability.
//!
//! The election protocol itself lives in an external coordinator (the
//! elector sidecar); this only asks who the leader is. Failure to find out
//! means "not leader" and the caller skips its cycle.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Checked once per sweeper cycle.
#[async_trait]
pub trait LeaderElector: Send + Sync {
    async fn is_leader(&self) -> bool;
}

/// Always leader; for single-instance deployments and tests.
pub struct AlwaysLeader;

#[async_trait]
impl LeaderElector for AlwaysLeader {
    async fn is_leader(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct LeaderResponse {
    name: String,
}

/// Asks the elector sidecar which pod currently holds leadership and
/// compares it with this pod's hostname.
pub struct PodLeaderElector {
    http_client: reqwest::Client,
    elector_url: String,
    hostname: String,
}

impl PodLeaderElector {
    pub fn new(elector_url: impl Into<String>) -> Self {
        let hostname = std::env::var("HOSTNAME").unwrap_or_default();
        Self::with_hostname(elector_url, hostname)
    }

    pub fn with_hostname(elector_url: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .expect("Failed to create HTTP client"),
            elector_url: elector_url.into(),
            hostname: hostname.into(),
        }
    }
}

#[async_trait]
impl LeaderElector for PodLeaderElector {
    async fn is_leader(&self) -> bool {
        let response = match self.http_client.get(&self.elector_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Could not reach elector: {}", e);
                return false;
            }
        };

        match response.json::<LeaderResponse>().await {
            Ok(leader) => leader.name == self.hostname,
            Err(e) => {
                warn!("Invalid elector response: {}", e);
                false
            }
        }
    }
}
