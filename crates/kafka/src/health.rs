//! Kafka health checks.

use crate::config::KafkaConfig;
use rskafka::client::ClientBuilder;
use tracing::{debug, error};

/// Check broker connection health.
pub async fn check_connection(config: &KafkaConfig) -> bool {
    let connection = config.broker_string();

    match ClientBuilder::new(vec![connection]).build().await {
        Ok(client) => match client.list_topics().await {
            Ok(topics) => {
                debug!(topics = topics.len(), "Kafka connection healthy");
                true
            }
            Err(e) => {
                error!("Failed to list kafka topics: {}", e);
                false
            }
        },
        Err(e) => {
            error!("Failed to connect to kafka: {}", e);
            false
        }
    }
}
