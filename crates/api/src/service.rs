//! Aggregation service: joins the synced tables into per-leder views.

use chrono::Utc;
use std::sync::Arc;
use sync_core::{sykmeldt_without_sykmeldinger, to_sykmeldt_views, Result, Sykmeldt};

use db::Db;

/// Read-side service for the Dine Sykmeldte endpoints.
#[derive(Clone)]
pub struct DineSykmeldteService {
    db: Arc<Db>,
}

impl DineSykmeldteService {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }

    /// All sykmeldte employees for the leder, one view per relationship.
    /// Relationships without qualifying sykmeldinger yield no view here.
    pub async fn get_dine_sykmeldte(&self, leder_fnr: &str) -> Result<Vec<Sykmeldt>> {
        let rows = db::sykmelding::get_sykmeldinger(&self.db, leder_fnr, None).await?;
        Ok(to_sykmeldt_views(rows, Utc::now().date_naive()))
    }

    /// One employee by relationship id.
    ///
    /// None means the leder has no such relationship (the API turns that
    /// into a 404). A relationship without qualifying sykmeldinger yields a
    /// view with an empty list instead, so the two cases stay
    /// distinguishable.
    pub async fn get_sykmeldt(
        &self,
        narmesteleder_id: &str,
        leder_fnr: &str,
    ) -> Result<Option<Sykmeldt>> {
        let rows =
            db::sykmelding::get_sykmeldinger(&self.db, leder_fnr, Some(narmesteleder_id)).await?;
        let today = Utc::now().date_naive();

        if let Some(view) = to_sykmeldt_views(rows, today).into_iter().next() {
            return Ok(Some(view));
        }

        let ansatt = db::sykmelding::get_ansatt(&self.db, narmesteleder_id, leder_fnr).await?;
        Ok(ansatt.map(sykmeldt_without_sykmeldinger))
    }
}
