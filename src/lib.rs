//! Rxtract — prescription order extraction and catalog matching.
//!
//! Takes the plain text an upstream OCR step produced for a
//! prescription, extracts candidate medicine orders from it (name,
//! dosage, frequency, duration, quantity), and reconciles each order
//! against a medicine catalog to decide availability. Extraction is
//! best-effort by contract: text the rules do not understand yields
//! fewer orders, never an error.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration harnesses embedding
/// this crate. Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
