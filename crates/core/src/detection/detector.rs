//! Core PHI detector: detect, redact, and existence checks.
//!
//! The detector is pure, deterministic, and side-effect-free: no network,
//! no filesystem, no shared mutable state. It is safe to call concurrently
//! from any number of callers.

use chrono::Utc;
use phigate_domain::constants::{CONTEXT_CONFIDENCE_BOOST, CONTEXT_WINDOW_CHARS};
use phigate_domain::{
    Confidence, DetectionConfig, Finding, PhiGateError, PhiType, Result, RiskConfig, ScanResult,
    ScanStatus,
};
use tracing::instrument;

use super::patterns::{PatternSpec, EXCLUSION_PATTERNS, PATTERN_TABLE};
use crate::risk;

/// Pattern-based PHI detector.
#[derive(Debug, Clone)]
pub struct PhiDetector {
    detection: DetectionConfig,
    risk: RiskConfig,
}

impl Default for PhiDetector {
    fn default() -> Self {
        Self { detection: DetectionConfig::default(), risk: RiskConfig::default() }
    }
}

impl PhiDetector {
    /// Create a detector with validated configuration.
    pub fn new(detection: DetectionConfig, risk: RiskConfig) -> Result<Self> {
        detection.validate()?;
        risk.validate()?;
        Ok(Self { detection, risk })
    }

    /// Detect PHI findings in `text`.
    ///
    /// Returns findings ordered by start offset with no two spans
    /// overlapping. Empty input yields an empty result, never an error.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn detect(&self, text: &str) -> Result<Vec<Finding>> {
        self.validate_input(text)?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let candidates = self.collect_candidates(text, false);
        Ok(resolve_overlaps(candidates))
    }

    /// Run a full scan: detection plus risk classification.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub fn scan(&self, text: &str) -> Result<ScanResult> {
        let findings = self.detect(text)?;
        let (risk_level, counts_by_type) = risk::classify(&findings, &self.risk);
        Ok(ScanResult {
            findings,
            risk_level,
            counts_by_type,
            status: ScanStatus::Complete,
            scanned_at: Utc::now(),
        })
    }

    /// Replace each retained finding's exact span with its fixed redaction
    /// marker. All non-matched text is preserved byte-for-byte.
    ///
    /// Idempotent: markers are excluded from detection, so re-redacting
    /// already-redacted text is a no-op.
    pub fn redact(&self, text: &str) -> Result<String> {
        let findings = self.detect(text)?;
        if findings.is_empty() {
            return Ok(text.to_string());
        }

        // Replace in reverse offset order to preserve earlier indices.
        let mut redacted = text.to_string();
        for finding in findings.iter().rev() {
            redacted.replace_range(finding.start..finding.end, finding.phi_type.marker());
        }
        Ok(redacted)
    }

    /// True when `text` contains at least one finding. Short-circuits on the
    /// first retained candidate; overlap resolution never removes the last
    /// finding, so existence is decided before resolution runs.
    pub fn has_phi(&self, text: &str) -> Result<bool> {
        self.validate_input(text)?;
        if text.is_empty() {
            return Ok(false);
        }
        Ok(!self.collect_candidates(text, true).is_empty())
    }

    fn validate_input(&self, text: &str) -> Result<()> {
        let limit = self.detection.max_input_bytes;
        if text.len() > limit {
            return Err(PhiGateError::ContentTooLarge { size: text.len(), limit });
        }
        Ok(())
    }

    /// Run every matcher in the pattern table, applying exactness guards,
    /// exclusion spans, context requirements, and the confidence floor.
    fn collect_candidates(&self, text: &str, stop_at_first: bool) -> Vec<Finding> {
        let exclusions = exclusion_spans(text);
        let mut candidates = Vec::new();

        for spec in PATTERN_TABLE.iter() {
            for matcher in &spec.matchers {
                for captures in matcher.regex.captures_iter(text) {
                    let Some(span) = captures.get(matcher.group) else {
                        continue;
                    };
                    let (start, end) = (span.start(), span.end());
                    let value = span.as_str();

                    if overlaps_any(start, end, &exclusions) {
                        continue;
                    }
                    if !passes_guards(spec, value) {
                        continue;
                    }

                    let in_context = spec
                        .context
                        .as_ref()
                        .is_some_and(|rx| rx.is_match(context_window(text, start, end)));
                    if matcher.needs_context && !in_context {
                        continue;
                    }

                    let confidence = if in_context {
                        Confidence::new(matcher.confidence).boosted(CONTEXT_CONFIDENCE_BOOST)
                    } else {
                        Confidence::new(matcher.confidence)
                    };
                    if confidence < self.detection.min_confidence {
                        continue;
                    }

                    candidates.push(Finding {
                        phi_type: spec.phi_type,
                        value: value.to_string(),
                        start,
                        end,
                        confidence,
                    });
                    if stop_at_first {
                        return candidates;
                    }
                }
            }
        }

        candidates
    }
}

/// Type-specific exactness guards applied before a candidate is accepted.
fn passes_guards(spec: &PatternSpec, value: &str) -> bool {
    match spec.phi_type {
        PhiType::Ssn => ssn_groups_valid(value),
        _ => true,
    }
}

/// SSNs must be exactly 9 digits in valid groupings: area not 000/666/9xx,
/// group not 00, serial not 0000.
fn ssn_groups_valid(value: &str) -> bool {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 9 {
        return false;
    }
    let (area, rest) = digits.split_at(3);
    let (group, serial) = rest.split_at(2);
    area != "000" && area != "666" && !area.starts_with('9') && group != "00" && serial != "0000"
}

/// Byte spans matching any exclusion pattern; candidates overlapping one of
/// these are dropped before overlap resolution.
fn exclusion_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for rx in EXCLUSION_PATTERNS.iter() {
        for m in rx.find_iter(text) {
            spans.push((m.start(), m.end()));
        }
    }
    spans
}

fn overlaps_any(start: usize, end: usize, spans: &[(usize, usize)]) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}

/// Slice of `text` around `start..end`, expanded by a fixed number of
/// characters on each side, respecting char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> &str {
    let window_start = expand_left(text, start, CONTEXT_WINDOW_CHARS);
    let window_end = expand_right(text, end, CONTEXT_WINDOW_CHARS);
    &text[window_start..window_end]
}

fn expand_left(text: &str, mut byte_idx: usize, mut chars: usize) -> usize {
    while byte_idx > 0 && chars > 0 {
        if let Some((prev_idx, _)) = text[..byte_idx].char_indices().next_back() {
            byte_idx = prev_idx;
        } else {
            return 0;
        }
        chars -= 1;
    }
    byte_idx
}

fn expand_right(text: &str, mut byte_idx: usize, mut chars: usize) -> usize {
    let len = text.len();
    while byte_idx < len && chars > 0 {
        if let Some(ch) = text[byte_idx..].chars().next() {
            byte_idx = (byte_idx + ch.len_utf8()).min(len);
        } else {
            return len;
        }
        chars -= 1;
    }
    byte_idx
}

/// Resolve overlapping candidate spans.
///
/// Precedence: higher confidence, tie-broken by longer span, tie-broken by
/// type priority. Winners are accepted greedily; the result is re-sorted by
/// start offset and contains no overlapping pair.
pub(crate) fn resolve_overlaps(mut candidates: Vec<Finding>) -> Vec<Finding> {
    candidates.sort_by(|a, b| {
        b.confidence
            .value()
            .total_cmp(&a.confidence.value())
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| b.phi_type.priority().cmp(&a.phi_type.priority()))
            .then_with(|| a.start.cmp(&b.start))
    });

    let mut accepted: Vec<Finding> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !accepted.iter().any(|kept| kept.overlaps_with(&candidate)) {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|f| f.start);
    accepted
}

#[cfg(test)]
mod tests {
    use phigate_domain::{PhiType, RiskLevel};

    use super::*;

    fn detector() -> PhiDetector {
        PhiDetector::default()
    }

    fn finding(phi_type: PhiType, start: usize, end: usize, confidence: f64) -> Finding {
        Finding {
            phi_type,
            value: "x".repeat(end - start),
            start,
            end,
            confidence: Confidence::new(confidence),
        }
    }

    #[test]
    fn detects_separated_ssn_as_high_risk() {
        let result = detector().scan("Patient SSN: 123-45-6789").expect("scan succeeds");
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].phi_type, PhiType::Ssn);
        assert_eq!(result.findings[0].value, "123-45-6789");
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn eight_and_ten_digit_spans_never_match_ssn() {
        let d = detector();
        assert!(d.detect("SSN: 12345678").expect("detect").is_empty());
        let ten = d.detect("id 1234567890 logged").expect("detect");
        assert!(ten.iter().all(|f| f.phi_type != PhiType::Ssn));
    }

    #[test]
    fn invalid_ssn_groupings_are_rejected() {
        let d = detector();
        assert!(d.detect("000-12-3456").expect("detect").is_empty());
        assert!(d.detect("666-12-3456").expect("detect").is_empty());
        assert!(d.detect("123-00-4567").expect("detect").is_empty());
        assert!(d.detect("123-45-0000").expect("detect").is_empty());
    }

    #[test]
    fn bare_nine_digits_require_ssn_context() {
        let d = detector();
        let with_context = d.detect("social security 123456789").expect("detect");
        assert!(with_context.iter().any(|f| f.phi_type == PhiType::Ssn));

        let without = d.detect("order number 123456789 shipped").expect("detect");
        assert!(without.iter().all(|f| f.phi_type != PhiType::Ssn));
    }

    #[test]
    fn statistical_expressions_never_match() {
        let d = detector();
        assert!(d.detect("Mean age: 54.3 years, TSH: 4.8").expect("detect").is_empty());
        assert!(d.detect("p < 0.05, 95% CI 1.2-3.4").expect("detect").is_empty());
        assert!(d.detect("registered as NCT01234567").expect("detect").is_empty());
        assert!(d.detect("approved under IRB-2023-0456").expect("detect").is_empty());
    }

    #[test]
    fn two_digit_years_never_match_dob() {
        let d = detector();
        let findings = d.detect("seen on 3/4/85 for follow-up").expect("detect");
        assert!(findings.iter().all(|f| f.phi_type != PhiType::Dob));

        let four_digit = d.detect("DOB: 3/4/1985").expect("detect");
        assert!(four_digit.iter().any(|f| f.phi_type == PhiType::Dob));
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let d = detector();
        assert!(d.detect("").expect("detect").is_empty());
        assert!(!d.has_phi("").expect("has_phi"));
        let result = d.scan("").expect("scan");
        assert_eq!(result.risk_level, RiskLevel::None);
    }

    #[test]
    fn byte_ceiling_is_exact() {
        let config = DetectionConfig { max_input_bytes: 16, ..Default::default() };
        let d = PhiDetector::new(config, RiskConfig::default()).expect("valid config");

        let at_limit = "a".repeat(16);
        assert!(d.detect(&at_limit).is_ok());

        let over = "a".repeat(17);
        match d.detect(&over) {
            Err(PhiGateError::ContentTooLarge { size, limit }) => {
                assert_eq!(size, 17);
                assert_eq!(limit, 16);
            }
            other => panic!("expected ContentTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn findings_are_ordered_and_non_overlapping() {
        let text = "Call (612) 555-0142 or email jane.doe@example.org. SSN 123-45-6789.";
        let findings = detector().detect(text).expect("detect");
        assert!(findings.len() >= 3);
        for pair in findings.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert!(!pair[0].overlaps_with(&pair[1]));
        }
    }

    #[test]
    fn offsets_reproduce_exact_substrings() {
        let text = "Patient SSN: 123-45-6789, phone 612-555-0142.";
        for finding in detector().detect(text).expect("detect") {
            assert_eq!(&text[finding.start..finding.end], finding.value);
        }
    }

    #[test]
    fn redact_replaces_spans_and_preserves_rest() {
        let redacted =
            detector().redact("Patient SSN: 123-45-6789 follow-up").expect("redact");
        assert_eq!(redacted, "Patient SSN: [REDACTED-SSN] follow-up");
    }

    #[test]
    fn redact_is_idempotent() {
        let text = "SSN 123-45-6789, email a.b@clinic.org, call 612-555-0142";
        let d = detector();
        let once = d.redact(text).expect("redact once");
        let twice = d.redact(&once).expect("redact twice");
        assert_eq!(once, twice);
        assert!(!d.has_phi(&once).expect("has_phi"));
    }

    #[test]
    fn overlap_resolution_prefers_higher_confidence() {
        let resolved = resolve_overlaps(vec![
            finding(PhiType::ZipCode, 0, 5, 0.6),
            finding(PhiType::Phone, 2, 12, 0.9),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].phi_type, PhiType::Phone);
    }

    #[test]
    fn overlap_resolution_breaks_confidence_ties_by_length() {
        let resolved = resolve_overlaps(vec![
            finding(PhiType::Name, 0, 20, 0.8),
            finding(PhiType::Email, 5, 12, 0.8),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].phi_type, PhiType::Name);
    }

    #[test]
    fn overlap_resolution_breaks_full_ties_by_priority() {
        let resolved = resolve_overlaps(vec![
            finding(PhiType::Name, 0, 10, 0.8),
            finding(PhiType::Ssn, 0, 10, 0.8),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].phi_type, PhiType::Ssn);
    }

    #[test]
    fn non_overlapping_candidates_all_survive() {
        let resolved = resolve_overlaps(vec![
            finding(PhiType::Ssn, 20, 31, 0.95),
            finding(PhiType::Email, 0, 10, 0.9),
        ]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].start, 0);
    }
}
