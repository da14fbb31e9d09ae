//! Collaborator seams for the processing pipeline. Both the catalog and
//! the order store are injected capabilities so tests can supply fixed
//! in-memory implementations.

use uuid::Uuid;

use super::PipelineError;
use crate::models::{CatalogMedicine, MatchedOrder, PrescriptionStatus};

/// Queryable medicine catalog (externally owned).
///
/// `search` performs case-insensitive substring search over medicine
/// names and returns results in catalog order. An empty query must
/// return an empty list, not an error.
pub trait CatalogSearch {
    fn search(&self, query: &str) -> Result<Vec<CatalogMedicine>, PipelineError>;
}

/// Durable storage for prescriptions and their matched orders.
///
/// `replace_orders` must swap the stored set atomically with respect to
/// concurrent readers: no observer may see the state between delete and
/// insert.
pub trait OrderStore {
    fn get_status(&self, prescription_id: &Uuid) -> Result<PrescriptionStatus, PipelineError>;

    fn set_status(
        &self,
        prescription_id: &Uuid,
        status: PrescriptionStatus,
    ) -> Result<(), PipelineError>;

    fn load_raw_text(&self, prescription_id: &Uuid) -> Result<String, PipelineError>;

    fn replace_orders(
        &self,
        prescription_id: &Uuid,
        orders: &[MatchedOrder],
    ) -> Result<(), PipelineError>;

    fn load_orders(&self, prescription_id: &Uuid) -> Result<Vec<MatchedOrder>, PipelineError>;
}
