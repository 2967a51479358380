//! Detection types: PHI categories, findings, and scan results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categories of Protected Health Information the detector recognizes.
///
/// The set is closed on purpose: the gating policy and the redaction markers
/// are exhaustively matched against it, so adding a category is a
/// compile-time checked change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PhiType {
    Ssn,
    Mrn,
    Name,
    Phone,
    Email,
    Dob,
    Address,
    ZipCode,
}

impl PhiType {
    /// Precedence used when overlapping candidate spans tie on confidence and
    /// span length. Higher wins. `Name` is deliberately last to minimize
    /// false positives against common-word overlaps with other types.
    pub const fn priority(self) -> u8 {
        match self {
            Self::Ssn => 8,
            Self::Mrn => 7,
            Self::Dob => 6,
            Self::Phone => 5,
            Self::Email => 4,
            Self::Address => 3,
            Self::ZipCode => 2,
            Self::Name => 1,
        }
    }

    /// Fixed redaction marker for this category, e.g. `[REDACTED-SSN]`.
    ///
    /// Markers must never themselves be detectable as PHI; redaction relies
    /// on that for idempotence.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Ssn => "[REDACTED-SSN]",
            Self::Mrn => "[REDACTED-MRN]",
            Self::Name => "[REDACTED-NAME]",
            Self::Phone => "[REDACTED-PHONE]",
            Self::Email => "[REDACTED-EMAIL]",
            Self::Dob => "[REDACTED-DOB]",
            Self::Address => "[REDACTED-ADDRESS]",
            Self::ZipCode => "[REDACTED-ZIP_CODE]",
        }
    }
}

impl fmt::Display for PhiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssn => write!(f, "ssn"),
            Self::Mrn => write!(f, "mrn"),
            Self::Name => write!(f, "name"),
            Self::Phone => write!(f, "phone"),
            Self::Email => write!(f, "email"),
            Self::Dob => write!(f, "dob"),
            Self::Address => write!(f, "address"),
            Self::ZipCode => write!(f, "zip_code"),
        }
    }
}

/// Detection confidence (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    /// Creates a new confidence score, clamping the value between 0.0 and 1.0
    pub fn new(score: f64) -> Self {
        debug_assert!(score.is_finite(), "confidence must be finite");
        Self(score.clamp(0.0, 1.0))
    }

    /// Returns the confidence value as f64
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Additive boost, saturating at 1.0.
    pub fn boosted(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }

    pub const LOW: Self = Self(0.3);
    pub const MEDIUM: Self = Self(0.6);
    pub const HIGH: Self = Self(0.8);
    pub const MAXIMUM: Self = Self(1.0);
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

impl From<f64> for Confidence {
    fn from(score: f64) -> Self {
        Self::new(score)
    }
}

/// A single detected PHI occurrence.
///
/// Transient: produced per scan, never persisted standalone. Offsets are byte
/// offsets into the scanned text with `start < end <= text.len()`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub phi_type: PhiType,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub confidence: Confidence,
}

impl Finding {
    /// Span length in bytes.
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the byte spans of the two findings intersect.
    pub const fn overlaps_with(&self, other: &Self) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

// The matched value is PHI. It must never leak through Debug output into
// logs or panic messages.
impl fmt::Debug for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finding")
            .field("phi_type", &self.phi_type)
            .field("value", &"[REDACTED]")
            .field("span", &format!("{}..{}", self.start, self.end))
            .field("confidence", &self.confidence)
            .finish()
    }
}

/// Coarse risk level reduced from a set of findings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    None,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Whether a scan ran to completion or degraded.
///
/// A degraded scan is reported explicitly instead of masquerading as an
/// empty-findings result; the gating policy fails closed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    Complete,
    Unavailable { reason: String },
}

/// Result of one detector invocation. Persisted for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub findings: Vec<Finding>,
    pub risk_level: RiskLevel,
    pub counts_by_type: BTreeMap<PhiType, usize>,
    pub status: ScanStatus,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    /// A degraded result carrying an explicit unavailability flag.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            findings: Vec::new(),
            risk_level: RiskLevel::None,
            counts_by_type: BTreeMap::new(),
            status: ScanStatus::Unavailable { reason: reason.into() },
            scanned_at: Utc::now(),
        }
    }

    pub const fn is_unavailable(&self) -> bool {
        matches!(self.status, ScanStatus::Unavailable { .. })
    }

    /// Metadata-only projection safe for logs, audit sinks, and quarantine
    /// records. Never contains raw matched values.
    pub fn summary(&self) -> crate::types::governance::FindingsSummary {
        crate::types::governance::FindingsSummary {
            counts_by_type: self.counts_by_type.clone(),
            risk_level: self.risk_level,
        }
    }
}
