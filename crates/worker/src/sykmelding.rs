//! Sykmelding topic handler: the enrichment variant of the sync pattern.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use sync_core::{sync_cutoff, Error, Result, SykmeldingArbeidsgiverKafkaMessage};
use tracing::{debug, info};
use validator::Validate;

use crate::consumer::{Applied, TopicSync};
use crate::pdl::PersonLookup;
use db::Db;

/// The only cluster where "person not found" is ignorable. Everywhere else
/// it takes the process down so the data-quality gap stays visible.
const DEV_CLUSTER: &str = "dev-gcp";

/// Applies sendt-sykmelding events: tombstone deletes, otherwise validate,
/// resolve the patient's name and upsert sykmelding + sykmeldt atomically.
pub struct SykmeldingHandler {
    db: Arc<Db>,
    person_lookup: Arc<dyn PersonLookup>,
    cluster: String,
}

impl SykmeldingHandler {
    pub fn new(db: Arc<Db>, person_lookup: Arc<dyn PersonLookup>, cluster: String) -> Self {
        Self {
            db,
            person_lookup,
            cluster,
        }
    }
}

#[async_trait]
impl TopicSync for SykmeldingHandler {
    type Message = SykmeldingArbeidsgiverKafkaMessage;

    async fn apply(&self, key: &str, message: Option<Self::Message>) -> Result<Applied> {
        let Some(message) = message else {
            db::sykmelding::delete_sykmelding(&self.db, key).await?;
            return Ok(Applied::Deleted);
        };

        message
            .validate()
            .map_err(|e| Error::validation(e.to_string()))?;
        let latest_tom = message
            .sykmelding
            .latest_tom()
            .ok_or_else(|| Error::validation("sykmelding without perioder"))?;

        let today = Utc::now().date_naive();
        if latest_tom < sync_cutoff(today) {
            debug!(
                sykmelding_id = key,
                latest_tom = %latest_tom,
                "Ignoring sykmelding outside the sync window"
            );
            return Ok(Applied::Ignored);
        }

        let navn = match self
            .person_lookup
            .person_navn(&message.kafka_metadata.fnr, key)
            .await
        {
            Ok(navn) => navn,
            Err(Error::PersonNotFound(_)) if self.cluster == DEV_CLUSTER => {
                info!(
                    sykmelding_id = key,
                    "Ignoring sykmelding, person not found in pdl"
                );
                return Ok(Applied::Ignored);
            }
            Err(e) => return Err(e),
        };

        db::sykmelding::upsert_sykmelding(&self.db, &message, &navn.formatted(), latest_tom)
            .await?;
        Ok(Applied::Upserted)
    }
}
