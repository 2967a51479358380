//! The pattern table: one entry per PHI type, each with its matchers,
//! contextual keywords, and base confidences.
//!
//! Confidence is derived from match specificity: separator presence and
//! exact digit counts give a higher base, contextual keywords nearby add a
//! fixed boost. Matchers flagged `needs_context` are only kept when a
//! keyword is found near the span, which keeps low-specificity patterns
//! (bare digit runs, plain five-digit numbers) from flooding results.

use once_cell::sync::Lazy;
use phigate_domain::PhiType;
use regex::Regex;

/// One compiled matcher for a PHI type.
pub(crate) struct Matcher {
    pub regex: Regex,
    /// Capture group whose span becomes the finding; 0 is the whole match.
    /// Non-zero groups let keyword-anchored patterns report only the
    /// identifier, not the keyword.
    pub group: usize,
    /// Base confidence before any contextual boost.
    pub confidence: f64,
    /// Discard the candidate unless a contextual keyword is nearby.
    pub needs_context: bool,
}

/// All matchers for one PHI type.
pub(crate) struct PatternSpec {
    pub phi_type: PhiType,
    pub matchers: Vec<Matcher>,
    /// Keyword pattern searched in a window around each candidate span.
    pub context: Option<Regex>,
}

fn compile(pattern: &str) -> Regex {
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("pattern should compile - this is a bug")
}

fn matcher(pattern: &str, confidence: f64) -> Matcher {
    Matcher { regex: compile(pattern), group: 0, confidence, needs_context: false }
}

fn grouped(pattern: &str, group: usize, confidence: f64) -> Matcher {
    Matcher { regex: compile(pattern), group, confidence, needs_context: false }
}

fn contextual(pattern: &str, confidence: f64) -> Matcher {
    Matcher { regex: compile(pattern), group: 0, confidence, needs_context: true }
}

/// Ordered pattern table. Order here is irrelevant to precedence; overlap
/// resolution uses confidence, span length, and `PhiType::priority`.
pub(crate) static PATTERN_TABLE: Lazy<Vec<PatternSpec>> = Lazy::new(|| {
    vec![
        PatternSpec {
            phi_type: PhiType::Ssn,
            matchers: vec![
                // Exactly 3-2-4 digit groupings. Word boundaries reject 8-
                // and 10-digit near-misses.
                matcher(r"\b\d{3}-\d{2}-\d{4}\b", 0.95),
                matcher(r"\b\d{3} \d{2} \d{4}\b", 0.9),
                // Bare 9 digits only count near an SSN keyword.
                contextual(r"\b\d{9}\b", 0.8),
            ],
            context: Some(compile(r"(?i)\b(?:ssn|social\s+security)\b")),
        },
        PatternSpec {
            phi_type: PhiType::Mrn,
            matchers: vec![
                grouped(
                    r"(?i)\b(?:mrn|medical\s+record(?:\s+number)?)\s*[:#]?\s*([A-Za-z]{0,3}\d{6,10})\b",
                    1,
                    0.9,
                ),
                contextual(r"\b[A-Z]{1,3}\d{7,9}\b", 0.75),
                contextual(r"\b\d{6,8}\b", 0.7),
            ],
            context: Some(compile(r"(?i)\b(?:mrn|medical\s+record|chart)\b")),
        },
        PatternSpec {
            phi_type: PhiType::Name,
            matchers: vec![
                grouped(r"\b(?:Dr|Mr|Mrs|Ms)\.?\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)", 1, 0.7),
                grouped(
                    r"(?i:\b(?:patient(?:\s+name)?|name)\s*:\s*)([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)",
                    1,
                    0.75,
                ),
            ],
            context: None,
        },
        PatternSpec {
            phi_type: PhiType::Phone,
            matchers: vec![
                matcher(r"\(\d{3}\)\s*\d{3}[-.\s]?\d{4}\b", 0.9),
                matcher(r"\b\d{3}[-.]\d{3}[-.]\d{4}\b", 0.85),
                matcher(r"\b\+?1[-.\s]\d{3}[-.\s]\d{3}[-.\s]\d{4}\b", 0.85),
            ],
            context: Some(compile(r"(?i)\b(?:phone|telephone|tel|call|fax|cell|mobile)\b")),
        },
        PatternSpec {
            phi_type: PhiType::Email,
            matchers: vec![matcher(
                r"(?u)\b[\p{L}\p{N}._%+-]+@[\p{L}\p{N}.-]+\.[\p{L}]{2,}\b",
                0.9,
            )],
            context: Some(compile(r"(?i)\be-?mail\b")),
        },
        PatternSpec {
            phi_type: PhiType::Dob,
            matchers: vec![
                // Four-digit years only; two-digit years are too ambiguous
                // to count as dates of birth.
                matcher(
                    r"\b(?:0?[1-9]|1[0-2])[/-](?:0?[1-9]|[12]\d|3[01])[/-](?:19|20)\d{2}\b",
                    0.7,
                ),
                matcher(r"\b(?:19|20)\d{2}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01])\b", 0.7),
                matcher(
                    r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept?|Oct|Nov|Dec)\.?\s+\d{1,2},?\s+(?:19|20)\d{2}\b",
                    0.65,
                ),
            ],
            context: Some(compile(r"(?i)\b(?:dob|date\s+of\s+birth|born|birth\s?date)\b")),
        },
        PatternSpec {
            phi_type: PhiType::Address,
            matchers: vec![matcher(
                r"\b\d{1,5}\s+(?:[A-Z][a-z]+\s+){0,3}[A-Z][a-z]+\s+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Place|Pl|Way|Terrace|Ter)\b\.?",
                0.8,
            )],
            context: Some(compile(r"(?i)\b(?:address|residence|lives\s+at)\b")),
        },
        PatternSpec {
            phi_type: PhiType::ZipCode,
            matchers: vec![
                matcher(r"\b\d{5}-\d{4}\b", 0.75),
                // State abbreviation prefix, e.g. "MN 55401".
                grouped(r"\b[A-Z]{2}\s+(\d{5}(?:-\d{4})?)\b", 1, 0.8),
                contextual(r"\b\d{5}\b", 0.55),
            ],
            context: Some(compile(r"(?i)\b(?:zip|postal)\b")),
        },
    ]
});

/// Spans matching any of these are never PHI: statistical expressions and
/// study/protocol identifiers, plus redaction markers so that re-scanning
/// redacted text is a no-op.
pub(crate) static EXCLUSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // p-values: p < 0.05, p=.001
        compile(r"(?i)\bp\s*[<=>]\s*0?\.\d+"),
        // confidence intervals: "95% CI", "confidence interval"
        compile(r"(?i)\b\d{1,3}(?:\.\d+)?%\s*ci\b"),
        compile(r"(?i)\bconfidence\s+interval\b"),
        // registry and protocol identifiers
        compile(r"(?i)\bnct\d{7,9}\b"),
        compile(r"(?i)\b(?:irb|protocol|study)[-\s#:]*[A-Za-z]*\d[A-Za-z0-9-]{2,}\b"),
        // redaction markers are not re-detectable
        compile(r"\[REDACTED-[A-Z_]+\]"),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_phi_type() {
        let mut types: Vec<PhiType> = PATTERN_TABLE.iter().map(|spec| spec.phi_type).collect();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), 8, "every PHI type needs at least one matcher");
    }

    #[test]
    fn ssn_pattern_rejects_near_misses() {
        let spec = PATTERN_TABLE
            .iter()
            .find(|s| s.phi_type == PhiType::Ssn)
            .expect("ssn spec present");
        let separated = &spec.matchers[0].regex;
        assert!(separated.is_match("123-45-6789"));
        assert!(!separated.is_match("123-45-678"));
        assert!(!separated.is_match("123-45-67890"));
        assert!(!separated.is_match("1234-45-6789"));
    }

    #[test]
    fn exclusions_cover_statistical_expressions() {
        let hits = |text: &str| EXCLUSION_PATTERNS.iter().any(|rx| rx.is_match(text));
        assert!(hits("p < 0.05"));
        assert!(hits("95% CI"));
        assert!(hits("NCT01234567"));
        assert!(hits("IRB-2023-0456"));
        assert!(hits("[REDACTED-SSN]"));
    }
}
