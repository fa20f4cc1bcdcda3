//! Narmesteleder topic handler.

use async_trait::async_trait;
use std::sync::Arc;
use sync_core::{NarmestelederLeesahMessage, Result};
use tracing::debug;

use crate::consumer::{Applied, TopicSync};
use db::Db;

/// Applies leesah relationship events. Both a null record value and a set
/// `aktivTom` delete the relationship; anything else upserts it.
pub struct NarmestelederHandler {
    db: Arc<Db>,
}

impl NarmestelederHandler {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TopicSync for NarmestelederHandler {
    type Message = NarmestelederLeesahMessage;

    async fn apply(&self, key: &str, message: Option<Self::Message>) -> Result<Applied> {
        match message {
            None => {
                db::narmesteleder::delete_narmesteleder(&self.db, key).await?;
                Ok(Applied::Deleted)
            }
            Some(message) if message.is_deactivated() => {
                debug!(
                    narmesteleder_id = %message.narmeste_leder_id,
                    "Relationship deactivated, deleting"
                );
                db::narmesteleder::delete_narmesteleder(
                    &self.db,
                    &message.narmeste_leder_id.to_string(),
                )
                .await?;
                Ok(Applied::Deleted)
            }
            Some(message) => {
                db::narmesteleder::upsert_narmesteleder(&self.db, &message).await?;
                Ok(Applied::Upserted)
            }
        }
    }
}
