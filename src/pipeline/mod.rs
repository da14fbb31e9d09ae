pub mod lines;
pub mod extract;
pub mod matcher;
pub mod orchestrator;
pub mod store;
pub mod traits;

pub use extract::*;
pub use lines::*;
pub use matcher::*;
pub use orchestrator::*;
pub use store::*;
pub use traits::*;

use thiserror::Error;

use crate::db::DatabaseError;

/// Failures the pipeline can propagate. Extraction itself never fails —
/// unparseable text degrades to fewer (or zero) orders. Only the external
/// collaborators (catalog search, persistence) produce errors, and they
/// are surfaced as-is: retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Catalog search failed: {0}")]
    Catalog(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Lock poisoned for prescription {0}")]
    LockPoisoned(uuid::Uuid),
}
