//! End-to-end processing of one prescription: extract orders from its
//! raw text, reconcile each against the catalog, and replace the stored
//! order set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::extract::extract_orders;
use super::matcher::match_order;
use super::traits::{CatalogSearch, OrderStore};
use super::PipelineError;
use crate::models::{MatchedOrder, PrescriptionStatus};

/// Sequences extraction and matching for one prescription and persists
/// the result. Collaborators are injected as trait objects so tests can
/// supply fixed in-memory implementations.
pub struct PrescriptionProcessor {
    catalog: Box<dyn CatalogSearch + Send + Sync>,
    store: Box<dyn OrderStore + Send + Sync>,
    /// Per-prescription guards: concurrent `process` calls on the same
    /// id must serialize, or the delete of one run could interleave with
    /// the insert of another (lost update).
    in_flight: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl PrescriptionProcessor {
    pub fn new(
        catalog: Box<dyn CatalogSearch + Send + Sync>,
        store: Box<dyn OrderStore + Send + Sync>,
    ) -> Self {
        Self {
            catalog,
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn guard_for(&self, prescription_id: &Uuid) -> Result<Arc<Mutex<()>>, PipelineError> {
        let mut map = self
            .in_flight
            .lock()
            .map_err(|_| PipelineError::LockPoisoned(*prescription_id))?;
        Ok(map
            .entry(*prescription_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Process a prescription's text into matched orders.
    ///
    /// An already-`Processed` prescription short-circuits to the stored
    /// result without touching the catalog. Empty or whitespace-only
    /// text is a normal outcome: the order set is replaced with nothing
    /// and the prescription is still marked `Processed`. Reprocessing a
    /// non-`Processed` prescription fully replaces prior orders.
    pub fn process(&self, prescription_id: &Uuid) -> Result<Vec<MatchedOrder>, PipelineError> {
        let guard = self.guard_for(prescription_id)?;
        let _held = guard
            .lock()
            .map_err(|_| PipelineError::LockPoisoned(*prescription_id))?;

        if self.store.get_status(prescription_id)? == PrescriptionStatus::Processed {
            tracing::debug!(prescription = %prescription_id, "already processed, returning stored orders");
            return self.store.load_orders(prescription_id);
        }

        let raw_text = self.store.load_raw_text(prescription_id)?;
        if raw_text.trim().is_empty() {
            self.store.replace_orders(prescription_id, &[])?;
            self.store
                .set_status(prescription_id, PrescriptionStatus::Processed)?;
            return Ok(Vec::new());
        }

        let extracted = extract_orders(&raw_text);
        let mut matched = Vec::with_capacity(extracted.len());
        for order in extracted {
            matched.push(match_order(self.catalog.as_ref(), order)?);
        }

        self.store.replace_orders(prescription_id, &matched)?;
        self.store
            .set_status(prescription_id, PrescriptionStatus::Processed)?;

        tracing::info!(
            prescription = %prescription_id,
            orders = matched.len(),
            available = matched.iter().filter(|m| m.is_available).count(),
            "prescription processed"
        );
        Ok(matched)
    }
}
