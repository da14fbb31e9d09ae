//! Catalog reconciliation: decide, for each extracted order, which
//! catalog entry (if any) is the same medicine.
//!
//! Two cascades run per order. The search cascade widens the query until
//! the catalog returns anything: full name, then the longest significant
//! token, then the remaining tokens in order. The selection cascade then
//! narrows that result set tier by tier, from exact name equality down
//! to a deliberate take-the-first-result fallback.

use super::traits::CatalogSearch;
use super::PipelineError;
use crate::models::{CatalogMedicine, ExtractedOrder, MatchedOrder};

/// Words that carry no identity when searching the catalog.
const STOP_WORDS: [&str; 11] = [
    "the", "and", "or", "for", "with", "regular", "tablet", "capsule", "mg", "ml", "g",
];

/// Tokenize an extracted name for fallback search: lower-cased,
/// whitespace-split, stop-words and tokens of length <= 2 dropped,
/// longest first (stable for equal lengths).
pub fn significant_tokens(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let mut tokens: Vec<String> = lower
        .split_whitespace()
        .filter(|t| t.len() > 2 && !STOP_WORDS.contains(t))
        .map(String::from)
        .collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()));
    tokens
}

/// Widening search: full name first, then each significant token
/// (longest first) until some query returns results.
fn search_candidates(
    catalog: &dyn CatalogSearch,
    name: &str,
    tokens: &[String],
) -> Result<Vec<CatalogMedicine>, PipelineError> {
    let results = catalog.search(name)?;
    if !results.is_empty() {
        return Ok(results);
    }

    for token in tokens {
        let results = catalog.search(token)?;
        if !results.is_empty() {
            return Ok(results);
        }
    }

    Ok(Vec::new())
}

/// Tiered best-match selection over a non-empty search result set.
/// Returns `None` only for an empty set: the last tier accepts the
/// first result even without any textual overlap.
fn select_best<'a>(
    name: &str,
    tokens: &[String],
    results: &'a [CatalogMedicine],
) -> Option<&'a CatalogMedicine> {
    let name_lower = name.to_lowercase();

    // Tier a: exact name equality.
    if let Some(m) = results
        .iter()
        .find(|m| m.name.to_lowercase() == name_lower)
    {
        return Some(m);
    }

    // Tier b: one name contains the other.
    if let Some(m) = results.iter().find(|m| {
        let catalog_name = m.name.to_lowercase();
        name_lower.contains(&catalog_name) || catalog_name.contains(&name_lower)
    }) {
        return Some(m);
    }

    // Tier c: a significant token is a substring of the catalog name,
    // or equals one of its words.
    if let Some(m) = results.iter().find(|m| {
        let catalog_name = m.name.to_lowercase();
        let words: Vec<&str> = catalog_name.split_whitespace().collect();
        tokens
            .iter()
            .any(|t| catalog_name.contains(t.as_str()) || words.contains(&t.as_str()))
    }) {
        return Some(m);
    }

    // Tier d: a catalog-name word is itself a significant token.
    if let Some(m) = results.iter().find(|m| {
        m.name
            .to_lowercase()
            .split_whitespace()
            .any(|w| tokens.iter().any(|t| t == w))
    }) {
        return Some(m);
    }

    // Tier e: best-effort fallback — first result wins even with no
    // textual overlap. Kept as-is; see DESIGN.md.
    results.first()
}

/// Reconcile one extracted order against the catalog.
pub fn match_order(
    catalog: &dyn CatalogSearch,
    order: ExtractedOrder,
) -> Result<MatchedOrder, PipelineError> {
    let tokens = significant_tokens(&order.medicine_name);
    let results = search_candidates(catalog, &order.medicine_name, &tokens)?;
    let matched_id = select_best(&order.medicine_name, &tokens, &results).map(|m| m.id);

    tracing::debug!(
        medicine = %order.medicine_name,
        candidates = results.len(),
        matched = ?matched_id,
        "catalog match"
    );

    Ok(MatchedOrder::new(order, matched_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Fixed in-memory catalog recording every query it receives.
    struct FixedCatalog {
        entries: Vec<CatalogMedicine>,
        queries: RefCell<Vec<String>>,
    }

    impl FixedCatalog {
        fn new(names: &[(i64, &str)]) -> Self {
            Self {
                entries: names
                    .iter()
                    .map(|(id, name)| CatalogMedicine {
                        id: *id,
                        name: (*name).to_string(),
                        price: None,
                    })
                    .collect(),
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl CatalogSearch for FixedCatalog {
        fn search(&self, query: &str) -> Result<Vec<CatalogMedicine>, PipelineError> {
            self.queries.borrow_mut().push(query.to_string());
            if query.trim().is_empty() {
                return Ok(Vec::new());
            }
            let needle = query.to_lowercase();
            Ok(self
                .entries
                .iter()
                .filter(|m| m.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }
    }

    fn order(name: &str) -> ExtractedOrder {
        ExtractedOrder::new(name)
    }

    #[test]
    fn tokens_drop_stop_words_and_short_words() {
        let tokens = significant_tokens("Regular Paracetamol XR 500 mg");
        assert_eq!(tokens, vec!["paracetamol", "500"]);
    }

    #[test]
    fn tokens_sorted_longest_first_stable() {
        let tokens = significant_tokens("abc defg hijk lm");
        assert_eq!(tokens, vec!["defg", "hijk", "abc"]);
    }

    #[test]
    fn substring_tier_matches_catalog_entry() {
        // Scenario: catalog "Paracetamol 500mg", extracted "Paracetamol" —
        // exact tier fails, substring tier succeeds.
        let catalog = FixedCatalog::new(&[(7, "Paracetamol 500mg")]);
        let matched = match_order(&catalog, order("Paracetamol")).unwrap();
        assert_eq!(matched.matched_catalog_id, Some(7));
        assert!(matched.is_available);
    }

    #[test]
    fn exact_tier_beats_substring_tier() {
        let catalog =
            FixedCatalog::new(&[(1, "Aspirin 100mg"), (2, "aspirin")]);
        let matched = match_order(&catalog, order("Aspirin")).unwrap();
        assert_eq!(matched.matched_catalog_id, Some(2));
    }

    #[test]
    fn token_search_kicks_in_when_full_name_finds_nothing() {
        let catalog = FixedCatalog::new(&[(3, "Amoxicillin 250mg")]);
        let matched = match_order(&catalog, order("Regular Amoxicillin Forte")).unwrap();
        assert_eq!(matched.matched_catalog_id, Some(3));
        // Full name first, then the longest token
        let queries = catalog.queries.borrow();
        assert_eq!(queries[0], "Regular Amoxicillin Forte");
        assert_eq!(queries[1], "amoxicillin");
    }

    #[test]
    fn fallback_tier_takes_first_result_without_overlap() {
        // The token search can return entries sharing no words with the
        // extracted name; the last tier still picks the first of them.
        struct AlwaysSomething;
        impl CatalogSearch for AlwaysSomething {
            fn search(&self, _query: &str) -> Result<Vec<CatalogMedicine>, PipelineError> {
                Ok(vec![
                    CatalogMedicine {
                        id: 42,
                        name: "Zinc Sulfate".into(),
                        price: None,
                    },
                    CatalogMedicine {
                        id: 43,
                        name: "Folic Acid".into(),
                        price: None,
                    },
                ])
            }
        }
        let matched = match_order(&AlwaysSomething, order("Paracetamol")).unwrap();
        assert_eq!(matched.matched_catalog_id, Some(42));
    }

    #[test]
    fn no_results_anywhere_leaves_order_unmatched() {
        let catalog = FixedCatalog::new(&[(1, "Warfarin 5mg")]);
        let matched = match_order(&catalog, order("Paracetamol")).unwrap();
        assert_eq!(matched.matched_catalog_id, None);
        assert!(!matched.is_available);
    }

    #[test]
    fn search_stops_at_first_non_empty_result() {
        let catalog = FixedCatalog::new(&[(7, "Paracetamol 500mg")]);
        match_order(&catalog, order("Paracetamol")).unwrap();
        assert_eq!(catalog.queries.borrow().len(), 1);
    }

    #[test]
    fn matching_is_deterministic() {
        let catalog = FixedCatalog::new(&[
            (1, "Paracetamol 500mg"),
            (2, "Paracetamol 1g"),
            (3, "Ibuprofen 200mg"),
        ]);
        let a = match_order(&catalog, order("Paracetamol")).unwrap();
        let b = match_order(&catalog, order("Paracetamol")).unwrap();
        assert_eq!(a, b);
    }
}
