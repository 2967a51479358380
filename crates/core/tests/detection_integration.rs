//! Integration tests for PHI detection
//!
//! Fixture-style corpus covering clinical note snippets, research prose,
//! overlap precedence, and redaction round-trips.

use phigate_core::detection::PhiDetector;
use phigate_domain::{PhiType, RiskLevel};

fn detector() -> PhiDetector {
    PhiDetector::default()
}

// ============================================================================
// Clinical note fixtures
// ============================================================================

/// Scenario: a discharge summary carrying several identifier types at once.
#[test]
fn discharge_summary_detects_each_identifier_type() {
    let text = "Patient name: Jane Doe\n\
                DOB: 04/12/1962\n\
                MRN: AB1234567\n\
                Phone: 612-555-0142\n\
                Email: jane.doe@example.org\n\
                Address: 1420 Elm Street, Minneapolis, MN 55401";

    let findings = detector().detect(text).expect("detect succeeds");
    let types: Vec<PhiType> = findings.iter().map(|f| f.phi_type).collect();

    assert!(types.contains(&PhiType::Name), "name from 'Patient name:' anchor");
    assert!(types.contains(&PhiType::Dob), "four-digit-year date near DOB keyword");
    assert!(types.contains(&PhiType::Mrn), "keyword-anchored MRN");
    assert!(types.contains(&PhiType::Phone), "separated phone");
    assert!(types.contains(&PhiType::Email), "email address");
    assert!(types.contains(&PhiType::Address), "street address");
    assert!(types.contains(&PhiType::ZipCode), "state-prefixed zip");
}

/// Scenario: non-matched text is reproducible from the finding offsets.
#[test]
fn gaps_between_findings_reproduce_original_text() {
    let text = "Pt called from 612-555-0142 about SSN 123-45-6789 on 04/12/1985.";
    let findings = detector().detect(text).expect("detect succeeds");
    assert!(!findings.is_empty());

    let mut cursor = 0;
    let mut rebuilt = String::new();
    for f in &findings {
        rebuilt.push_str(&text[cursor..f.start]);
        rebuilt.push_str(&text[f.start..f.end]);
        cursor = f.end;
    }
    rebuilt.push_str(&text[cursor..]);
    assert_eq!(rebuilt, text, "offsets must tile the original text without corruption");
}

// ============================================================================
// Research prose fixtures (must stay clean)
// ============================================================================

/// Scenario: statistical reporting in a results section.
#[test]
fn results_section_produces_no_findings() {
    let text = "Mean TSH was 4.8 mIU/L (95% CI 4.1-5.5); the difference was \
                significant at p < 0.001. Enrollment per protocol 2021-044 \
                and registry NCT04812345.";
    let result = detector().scan(text).expect("scan succeeds");
    assert!(result.findings.is_empty());
    assert_eq!(result.risk_level, RiskLevel::None);
}

/// Scenario: bare digit runs without identifying context stay clean.
#[test]
fn bare_numbers_without_context_are_ignored() {
    let text = "Sample sizes were 1284 and 20119 across cohorts 301 and 40522.";
    let findings = detector().detect(text).expect("detect succeeds");
    assert!(
        findings.is_empty(),
        "counts and cohort numbers must not be treated as identifiers"
    );
}

// ============================================================================
// Overlap precedence fixtures
// ============================================================================

/// Scenario: the same digit run is claimable as SSN (keyword nearby) and as
/// MRN (keyword nearby); the higher-confidence interpretation must win and
/// exactly one finding must remain.
#[test]
fn competing_claims_on_one_span_leave_a_single_finding() {
    let text = "listed under SSN MRN 123456789";
    let findings = detector().detect(text).expect("detect succeeds");

    let claiming: Vec<_> =
        findings.iter().filter(|f| f.value.contains("123456789")).collect();
    assert_eq!(claiming.len(), 1, "overlap resolution must keep exactly one claimant");
}

/// Scenario: ZIP+4 next to a phone number; spans do not overlap and both
/// survive.
#[test]
fn adjacent_spans_are_both_kept() {
    let text = "Reach me at 612-555-0142, mail goes to MN 55401-2345.";
    let findings = detector().detect(text).expect("detect succeeds");
    let types: Vec<PhiType> = findings.iter().map(|f| f.phi_type).collect();
    assert!(types.contains(&PhiType::Phone));
    assert!(types.contains(&PhiType::ZipCode));
}

// ============================================================================
// Redaction fixtures
// ============================================================================

/// Scenario: full redaction round-trip over a mixed document.
#[test]
fn redaction_markers_carry_the_finding_type() {
    let d = detector();
    let text = "SSN 123-45-6789 and email a.b@clinic.org";
    let redacted = d.redact(text).expect("redact succeeds");

    assert!(redacted.contains("[REDACTED-SSN]"));
    assert!(redacted.contains("[REDACTED-EMAIL]"));
    assert!(!redacted.contains("123-45-6789"));
    assert!(!redacted.contains("a.b@clinic.org"));
}

/// Scenario: redacted output is stable under repeated redaction and scans
/// clean.
#[test]
fn redacted_text_is_a_fixed_point() {
    let d = detector();
    let text = "Patient name: John Smith, MRN: 88213344, DOB: 01/02/1950, \
                call (612) 555-0101, 45 Oak Avenue, MN 55401";
    let once = d.redact(text).expect("first redaction");
    let twice = d.redact(&once).expect("second redaction");

    assert_eq!(once, twice);
    assert!(!d.has_phi(&once).expect("has_phi"));
    assert_eq!(d.scan(&once).expect("scan").risk_level, RiskLevel::None);
}

// ============================================================================
// Risk reduction fixtures
// ============================================================================

/// Scenario: a single SSN drives the whole scan to high risk.
#[test]
fn single_ssn_scans_high() {
    let result = detector().scan("Patient SSN: 123-45-6789").expect("scan succeeds");
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.counts_by_type[&PhiType::Ssn], 1);
}

/// Scenario: contact details without SSN/MRN stay medium.
#[test]
fn contact_details_scan_medium() {
    let result = detector()
        .scan("email a.b@clinic.org or call 612-555-0142")
        .expect("scan succeeds");
    assert_eq!(result.risk_level, RiskLevel::Medium);
}
