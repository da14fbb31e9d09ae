//! Line-level preparation of raw prescription text.
//!
//! Splitting and retention filtering are separate concerns on purpose:
//! two-line extraction rules must be able to look at the line that
//! follows a retained one even when that line would itself be filtered
//! (a `Dose:` continuation line is noise on its own but carries the
//! dosage for the name above it).

use std::sync::LazyLock;

use regex::Regex;

/// Lines shorter than this (after trimming) carry no usable signal.
const MIN_LINE_LEN: usize = 3;

/// Header/noise keywords. A line containing any of these
/// (case-insensitive) is dropped from extraction.
const NOISE_KEYWORDS: [&str; 15] = [
    "PRESCRIPTION",
    "DOCTOR",
    "PHYSICIAN",
    "PATIENT",
    "DATE",
    "REFILL",
    "SIGNATURE",
    "LICENSE",
    "ADDRESS",
    "PHONE",
    "FAX",
    "EMAIL",
    "RX#",
    "RX NUMBER",
    "HOSPITAL",
];

static RE_LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:dose|route|frequency|duration|quantity|time|date|signature)\s*:")
        .unwrap()
});

static RE_NUMERIC_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s/\-]+$").unwrap());

/// Split raw text into trimmed, non-empty lines. Handles LF and CRLF;
/// trimming removes the stray `\r` a CRLF split leaves behind.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Whether a line is a candidate for extraction. Filters out headers,
/// metadata labels, and purely numeric noise.
pub fn is_retained(line: &str) -> bool {
    if line.len() < MIN_LINE_LEN {
        return false;
    }

    let upper = line.to_uppercase();
    if NOISE_KEYWORDS.iter().any(|kw| upper.contains(kw)) {
        return false;
    }

    if RE_LABEL_PREFIX.is_match(line) {
        return false;
    }

    if RE_NUMERIC_ONLY.is_match(line) {
        return false;
    }

    true
}

/// Index-based walk over the prepared line sequence.
///
/// Two-line patterns consume the line after the current one; that
/// consumption is an explicit `advance_extra` so the extractor never
/// mutates a loop variable behind the reader's back.
pub struct LineCursor<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self { lines, pos: 0 }
    }

    pub fn current(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(String::as_str)
    }

    pub fn peek_next(&self) -> Option<&'a str> {
        self.lines.get(self.pos + 1).map(String::as_str)
    }

    /// Step to the next line.
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Skip one additional line — used after a two-line pattern consumed
    /// the lookahead line, so it is never revisited as its own candidate.
    pub fn advance_extra(&mut self) {
        self.pos += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_lf_and_crlf() {
        let lines = split_lines("Paracetamol 500mg\r\nAspirin 100mg\nIbuprofen 200mg");
        assert_eq!(
            lines,
            vec!["Paracetamol 500mg", "Aspirin 100mg", "Ibuprofen 200mg"]
        );
    }

    #[test]
    fn drops_empty_and_whitespace_lines() {
        let lines = split_lines("Paracetamol 500mg\n\n   \nAspirin 100mg\n");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn short_lines_are_dropped() {
        assert!(!is_retained("ab"));
        assert!(is_retained("abc"));
    }

    #[test]
    fn noise_keywords_drop_line_case_insensitively() {
        assert!(!is_retained("City Hospital Pharmacy"));
        assert!(!is_retained("Dr. Chen, physician"));
        assert!(!is_retained("patient: John Doe"));
        assert!(!is_retained("Rx# 12345"));
        assert!(is_retained("Paracetamol 500mg"));
    }

    #[test]
    fn metadata_label_prefix_drops_line() {
        assert!(!is_retained("Dose: 500mg"));
        assert!(!is_retained("frequency: twice daily"));
        assert!(!is_retained("Duration : 5 days"));
        // Label elsewhere in the line does not trigger the prefix rule
        assert!(is_retained("Metformin Dose 500mg"));
    }

    #[test]
    fn numeric_only_lines_are_dropped() {
        assert!(!is_retained("12/05-2024"));
        assert!(!is_retained("100 - 200"));
        assert!(is_retained("100 tablets"));
    }

    #[test]
    fn cursor_walks_with_lookahead() {
        let lines = split_lines("one line\ntwo line\nthree line");
        let mut cursor = LineCursor::new(&lines);

        assert_eq!(cursor.current(), Some("one line"));
        assert_eq!(cursor.peek_next(), Some("two line"));

        cursor.advance_extra(); // consume "two line"
        cursor.advance();
        assert_eq!(cursor.current(), Some("three line"));
        assert_eq!(cursor.peek_next(), None);

        cursor.advance();
        assert_eq!(cursor.current(), None);
    }
}
