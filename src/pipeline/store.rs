//! SQLite-backed implementations of the pipeline's collaborator traits.
//!
//! Both adapters share one connection behind a mutex: the pipeline is
//! synchronous-per-request, so a single writer is all the concurrency
//! the store needs. The catalog and order store wrap the repository
//! functions in `db::repository`.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use uuid::Uuid;

use super::traits::{CatalogSearch, OrderStore};
use super::PipelineError;
use crate::db::repository::{
    fetch_prescription_orders, get_prescription_status, get_prescription_text,
    replace_prescription_orders, search_medicines, set_prescription_status,
};
use crate::models::{CatalogMedicine, MatchedOrder, PrescriptionStatus};

/// Catalog search over the `medicines` table.
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl CatalogSearch for SqliteCatalog {
    fn search(&self, query: &str) -> Result<Vec<CatalogMedicine>, PipelineError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| PipelineError::Catalog("catalog connection lock poisoned".into()))?;
        Ok(search_medicines(&conn, query)?)
    }
}

/// Order persistence over the `prescriptions` / `prescription_orders`
/// tables.
pub struct SqliteOrderStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteOrderStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self, id: &Uuid) -> Result<std::sync::MutexGuard<'_, Connection>, PipelineError> {
        self.conn
            .lock()
            .map_err(|_| PipelineError::LockPoisoned(*id))
    }
}

impl OrderStore for SqliteOrderStore {
    fn get_status(&self, prescription_id: &Uuid) -> Result<PrescriptionStatus, PipelineError> {
        let conn = self.lock(prescription_id)?;
        Ok(get_prescription_status(&conn, prescription_id)?)
    }

    fn set_status(
        &self,
        prescription_id: &Uuid,
        status: PrescriptionStatus,
    ) -> Result<(), PipelineError> {
        let conn = self.lock(prescription_id)?;
        Ok(set_prescription_status(&conn, prescription_id, status)?)
    }

    fn load_raw_text(&self, prescription_id: &Uuid) -> Result<String, PipelineError> {
        let conn = self.lock(prescription_id)?;
        Ok(get_prescription_text(&conn, prescription_id)?)
    }

    fn replace_orders(
        &self,
        prescription_id: &Uuid,
        orders: &[MatchedOrder],
    ) -> Result<(), PipelineError> {
        let conn = self.lock(prescription_id)?;
        Ok(replace_prescription_orders(&conn, prescription_id, orders)?)
    }

    fn load_orders(&self, prescription_id: &Uuid) -> Result<Vec<MatchedOrder>, PipelineError> {
        let conn = self.lock(prescription_id)?;
        Ok(fetch_prescription_orders(&conn, prescription_id)?)
    }
}
