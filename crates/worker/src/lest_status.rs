//! Read-status topic handler.

use async_trait::async_trait;
use std::sync::Arc;
use sync_core::{LestStatusKafkaMessage, Result};

use crate::consumer::{Applied, TopicSync};
use db::Db;

/// Applies read-status events keyed by the relationship id.
pub struct LestStatusHandler {
    db: Arc<Db>,
}

impl LestStatusHandler {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TopicSync for LestStatusHandler {
    type Message = LestStatusKafkaMessage;

    async fn apply(&self, key: &str, message: Option<Self::Message>) -> Result<Applied> {
        match message {
            None => {
                db::lest_status::delete_read_status(&self.db, key).await?;
                Ok(Applied::Deleted)
            }
            Some(message) => {
                db::lest_status::upsert_read_status(&self.db, &message.nl_read_count).await?;
                Ok(Applied::Upserted)
            }
        }
    }
}
