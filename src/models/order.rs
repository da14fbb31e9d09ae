use serde::{Deserialize, Serialize};

/// A candidate medicine request parsed from free text, before catalog
/// verification. `medicine_name` is trimmed and whitespace-collapsed;
/// no two orders produced for one prescription share the same
/// lower-cased name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedOrder {
    pub medicine_name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub quantity: Option<String>,
}

impl ExtractedOrder {
    pub fn new(medicine_name: impl Into<String>) -> Self {
        Self {
            medicine_name: medicine_name.into(),
            dosage: None,
            frequency: None,
            duration: None,
            quantity: None,
        }
    }
}

/// A catalog entry as returned by the catalog search collaborator.
/// Externally owned; read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMedicine {
    pub id: i64,
    pub name: String,
    pub price: Option<f64>,
}

/// An extracted order annotated with the catalog entry (if any) judged
/// to be the same medicine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedOrder {
    pub order: ExtractedOrder,
    pub matched_catalog_id: Option<i64>,
    pub is_available: bool,
}

impl MatchedOrder {
    /// `is_available` is derived, never set independently: an order is
    /// available iff a catalog entry was matched.
    pub fn new(order: ExtractedOrder, matched_catalog_id: Option<i64>) -> Self {
        Self {
            order,
            matched_catalog_id,
            is_available: matched_catalog_id.is_some(),
        }
    }
}

/// Result of extraction-only mode: the raw text echoed back plus the
/// orders parsed out of it, without any catalog reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub extracted_text: String,
    pub medicines: Vec<ExtractedOrder>,
}
