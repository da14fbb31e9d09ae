//! Rule-ordered extraction of medicine orders from prepared lines.
//!
//! Five rules are tried per line in fixed priority order; the first
//! match wins. Each rule is a pure function returning `Option<RuleMatch>`
//! so the cascade stays composable and testable rule-by-rule. The
//! pipeline is deliberately best-effort: lines no rule understands are
//! skipped, never errors.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::lines::{is_retained, split_lines, LineCursor};
use crate::models::{ExtractedOrder, ExtractionOutcome};

/// Minimum length of a normalized medicine name.
const MIN_NAME_LEN: usize = 3;

/// Stray instructional words that the rules sometimes capture as a
/// "name" on fragmented OCR output. A candidate equal to one of these
/// is discarded.
const STRAY_WORDS: [&str; 17] = [
    "take",
    "apply",
    "use",
    "with",
    "after",
    "before",
    "food",
    "meal",
    "water",
    "frequency",
    "dose",
    "route",
    "duration",
    "quantity",
    "time",
    "date",
    "signature",
];

// Rule 1: `<NAME>(.|,) Dose|Route|Frequency|Duration` at line start.
static RE_SAME_LINE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z][a-z\s\-]*?)[.,]\s*(?:dose|route|frequency|duration)\b").unwrap()
});

// Rule 2: a name-only line (letters/spaces/hyphens, >= 8 chars, optional
// trailing period) whose following line is a `Dose|Route|...:` continuation.
static RE_NAME_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z][a-z\s\-]{7,})\.?$").unwrap());

static RE_CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:dose|route|frequency|duration)\s*:").unwrap());

// Rule 3: name (>= 4 chars) terminated by `.`, `,`, `:` or a label word.
static RE_TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z][a-z\s\-]{3,}?)\s*(?:[.,:]|\b(?:dose|route|frequency|duration)\b)")
        .unwrap()
});

// Rule 4: `<NAME> <number><unit>` with the unit attached to the number.
static RE_NAME_DOSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([a-z][a-z\s\-]*?)\s+(\d+(?:\.\d+)?(?:tablets|capsules|units|mcg|tabs|caps|mg|ml|g|%))",
    )
    .unwrap()
});

// Rule 5: `<NAME> <number> tablets|capsules|tabs|caps|pills`.
static RE_NAME_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z][a-z\s\-]*?)\s+(\d+)\s*(tablets|capsules|tabs|caps|pills)\b").unwrap()
});

// `Dose: <number><unit>` anywhere in a line (rules 1 and 2).
static RE_DOSE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdose\s*:\s*(\d+(?:\.\d+)?\s*(?:units|mcg|mg|ml|g|%))").unwrap()
});

// Trailing `<number><unit>` (rule 3).
static RE_TRAILING_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?\s*(?:units|mcg|mg|ml|g|%))\s*$").unwrap()
});

static RE_FREQUENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:frequency\s*:|take|apply|use|given)\s+([^,]+)").unwrap()
});

static RE_FREQUENCY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)frequency\s*:\s*(.+)").unwrap());

static RE_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:for|duration|continue|take)\s+(\d+\s*(?:day|week|month|d|w|m)s?)\b")
        .unwrap()
});

static RE_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(tablets?|capsules?|tabs?|caps?|pills?|units?)\b").unwrap()
});

/// Outcome of a single rule applied to a line.
#[derive(Debug, Clone, PartialEq)]
struct RuleMatch {
    name: String,
    dosage: Option<String>,
    quantity: Option<String>,
    /// True when the rule consumed the following line (two-line pattern).
    consumed_next: bool,
}

fn same_line_label(line: &str) -> Option<RuleMatch> {
    let caps = RE_SAME_LINE_LABEL.captures(line)?;
    let dosage = RE_DOSE_VALUE
        .captures(line)
        .map(|c| c[1].trim().to_string());
    Some(RuleMatch {
        name: caps[1].trim().to_string(),
        dosage,
        quantity: None,
        consumed_next: false,
    })
}

fn next_line_label(line: &str, next: Option<&str>) -> Option<RuleMatch> {
    let caps = RE_NAME_ONLY.captures(line)?;
    let next = next?;
    if !RE_CONTINUATION.is_match(next) {
        return None;
    }
    let dosage = RE_DOSE_VALUE.captures(next).map(|c| c[1].trim().to_string());
    Some(RuleMatch {
        name: caps[1].trim().to_string(),
        dosage,
        quantity: None,
        consumed_next: true,
    })
}

fn start_terminator(line: &str) -> Option<RuleMatch> {
    let caps = RE_TERMINATOR.captures(line)?;
    let dosage = RE_TRAILING_DOSE
        .captures(line)
        .map(|c| c[1].trim().to_string());
    Some(RuleMatch {
        name: caps[1].trim().to_string(),
        dosage,
        quantity: None,
        consumed_next: false,
    })
}

fn name_with_dosage(line: &str) -> Option<RuleMatch> {
    let caps = RE_NAME_DOSAGE.captures(line)?;
    Some(RuleMatch {
        name: caps[1].trim().to_string(),
        dosage: Some(caps[2].to_string()),
        quantity: None,
        consumed_next: false,
    })
}

fn name_with_count(line: &str) -> Option<RuleMatch> {
    let caps = RE_NAME_COUNT.captures(line)?;
    Some(RuleMatch {
        name: caps[1].trim().to_string(),
        dosage: None,
        quantity: Some(format!("{} {}", &caps[2], &caps[3])),
        consumed_next: false,
    })
}

/// Apply the five rules in priority order; the first match wins.
fn match_line(line: &str, next: Option<&str>) -> Option<RuleMatch> {
    same_line_label(line)
        .or_else(|| next_line_label(line, next))
        .or_else(|| start_terminator(line))
        .or_else(|| name_with_dosage(line))
        .or_else(|| name_with_count(line))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_stray_word(name: &str) -> bool {
    let lower = name.to_lowercase();
    STRAY_WORDS.iter().any(|w| *w == lower)
}

/// Frequency from the current line, falling back to a `Frequency:` label
/// on the following unconsumed line.
fn find_frequency(line: &str, next: Option<&str>) -> Option<String> {
    if let Some(caps) = RE_FREQUENCY.captures(line) {
        return Some(caps[1].trim().to_string());
    }
    let next = next?;
    RE_FREQUENCY_LABEL
        .captures(next)
        .map(|c| c[1].trim().to_string())
}

fn find_duration(line: &str) -> Option<String> {
    RE_DURATION.captures(line).map(|c| c[1].trim().to_string())
}

fn find_quantity(line: &str) -> Option<String> {
    RE_QUANTITY
        .captures(line)
        .map(|c| format!("{} {}", &c[1], &c[2]))
}

/// Extract candidate medicine orders from raw prescription text.
///
/// Walks the prepared lines with a cursor (two-line rules consume their
/// lookahead line), normalizes each candidate, and deduplicates inline
/// on the lower-cased name — first occurrence wins.
pub fn extract_orders(raw_text: &str) -> Vec<ExtractedOrder> {
    let lines = split_lines(raw_text);
    let mut cursor = LineCursor::new(&lines);
    let mut seen: HashSet<String> = HashSet::new();
    let mut orders = Vec::new();

    while let Some(line) = cursor.current() {
        if !is_retained(line) {
            cursor.advance();
            continue;
        }

        if let Some(matched) = match_line(line, cursor.peek_next()) {
            if matched.consumed_next {
                cursor.advance_extra();
            }

            let name = collapse_whitespace(&matched.name);
            if name.len() >= MIN_NAME_LEN
                && !is_stray_word(&name)
                && seen.insert(name.to_lowercase())
            {
                let frequency = find_frequency(line, cursor.peek_next());
                let duration = find_duration(line);
                let quantity = matched.quantity.or_else(|| find_quantity(line));
                orders.push(ExtractedOrder {
                    medicine_name: name,
                    dosage: matched.dosage,
                    frequency,
                    duration,
                    quantity,
                });
            }
        }

        cursor.advance();
    }

    tracing::debug!(
        lines = lines.len(),
        orders = orders.len(),
        "extraction finished"
    );
    orders
}

/// Extraction-only mode: parse orders without catalog reconciliation.
pub fn extract_prescription(raw_text: &str) -> ExtractionOutcome {
    ExtractionOutcome {
        extracted_text: raw_text.to_string(),
        medicines: extract_orders(raw_text),
    }
}
