//! Risk classification: reduces a set of findings to a coarse risk level.

use std::collections::BTreeMap;

use phigate_domain::{Finding, PhiType, RiskConfig, RiskLevel};

/// Classify findings into a risk level plus per-type counts.
///
/// `High` when any SSN/MRN finding is present or the total count exceeds the
/// configured threshold; `Medium` when any finding is present below that;
/// `None` when empty. The result is a pure function of the findings and is
/// monotonic in severity: adding an SSN/MRN finding never lowers the level.
pub fn classify(
    findings: &[Finding],
    config: &RiskConfig,
) -> (RiskLevel, BTreeMap<PhiType, usize>) {
    let mut counts: BTreeMap<PhiType, usize> = BTreeMap::new();
    for finding in findings {
        *counts.entry(finding.phi_type).or_insert(0) += 1;
    }

    let total: usize = counts.values().sum();
    let has_identifier =
        findings.iter().any(|f| matches!(f.phi_type, PhiType::Ssn | PhiType::Mrn));

    let level = if total == 0 {
        RiskLevel::None
    } else if has_identifier || total > config.high_count_threshold {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    (level, counts)
}
