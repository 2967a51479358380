//! Governance types: operational modes, roles, quarantine records, and the
//! append-only audit trail.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::detection::{PhiType, RiskLevel};

/// Operational mode consulted at decision time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationalMode {
    /// Never touches production content; permissive.
    Demo,
    /// Production path; fails closed whenever scan status cannot be trusted.
    Live,
    /// No real data path is active; blocks unconditionally.
    Standby,
}

impl fmt::Display for OperationalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demo => write!(f, "DEMO"),
            Self::Live => write!(f, "LIVE"),
            Self::Standby => write!(f, "STANDBY"),
        }
    }
}

/// Reviewer roles, ordered: `Viewer < Researcher < Steward < Admin`.
///
/// Quarantine overrides require at least [`ReviewerRole::Steward`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewerRole {
    Viewer,
    Researcher,
    Steward,
    Admin,
}

impl fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Viewer => write!(f, "VIEWER"),
            Self::Researcher => write!(f, "RESEARCHER"),
            Self::Steward => write!(f, "STEWARD"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Quarantine lifecycle state.
///
/// Transitions only `Pending -> {Released, Rejected, Escalated}`;
/// `Released` and `Rejected` are terminal. An escalated record re-enters
/// review at a higher tier and may be resolved there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuarantineStatus {
    Pending,
    Released,
    Rejected,
    Escalated,
}

impl QuarantineStatus {
    /// Terminal states admit no further transition.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Released | Self::Rejected)
    }
}

impl fmt::Display for QuarantineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Released => write!(f, "RELEASED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Escalated => write!(f, "ESCALATED"),
        }
    }
}

/// Reviewer verdict on a quarantined action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewDecision {
    Release,
    Reject,
    Escalate,
}

impl ReviewDecision {
    /// The status a successful review moves the record into.
    pub const fn resulting_status(self) -> QuarantineStatus {
        match self {
            Self::Release => QuarantineStatus::Released,
            Self::Reject => QuarantineStatus::Rejected,
            Self::Escalate => QuarantineStatus::Escalated,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => write!(f, "RELEASE"),
            Self::Reject => write!(f, "REJECT"),
            Self::Escalate => write!(f, "ESCALATE"),
        }
    }
}

/// Metadata-only view of a scan: counts and risk, never raw matched values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub counts_by_type: BTreeMap<PhiType, usize>,
    pub risk_level: RiskLevel,
}

impl FindingsSummary {
    pub fn total_findings(&self) -> usize {
        self.counts_by_type.values().sum()
    }
}

/// A blocked action awaiting authorized release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineRecord {
    pub id: Uuid,
    pub subject_id: String,
    pub reason: String,
    pub summary: FindingsSummary,
    pub status: QuarantineStatus,
    /// Review tier; starts at 0 and increments on each escalation.
    pub escalation_tier: u32,
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl QuarantineRecord {
    pub fn new(
        subject_id: impl Into<String>,
        summary: FindingsSummary,
        requested_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id: subject_id.into(),
            reason: reason.into(),
            summary,
            status: QuarantineStatus::Pending,
            escalation_tier: 0,
            requested_by: requested_by.into(),
            requested_at: Utc::now(),
            resolved_by: None,
            resolved_at: None,
        }
    }
}

/// One immutable entry in the override audit trail.
///
/// Entries are never mutated or deleted after creation; the trail is
/// append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub quarantine_id: Uuid,
    pub decision: ReviewDecision,
    pub reviewer_id: String,
    pub justification: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a gating decision.
///
/// A blocked decision carries a metadata-only message; raw matched values
/// never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub allow: bool,
    pub quarantine_id: Option<Uuid>,
    pub message: String,
}

impl GateDecision {
    pub fn allowed(message: impl Into<String>) -> Self {
        Self { allow: true, quarantine_id: None, message: message.into() }
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self { allow: false, quarantine_id: None, message: message.into() }
    }
}

/// Structured governance events for the audit/log sink.
///
/// Events carry metadata only: types, counts, risk levels, and ids. Raw
/// matched values must never be emitted to any log or audit sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GovernanceEvent {
    ScanCompleted {
        subject_id: String,
        risk_level: RiskLevel,
        total_findings: usize,
        degraded: bool,
    },
    DecisionMade {
        subject_id: String,
        mode: OperationalMode,
        risk_level: RiskLevel,
        allowed: bool,
        audit_flag: bool,
    },
    QuarantineCreated {
        quarantine_id: Uuid,
        subject_id: String,
        risk_level: RiskLevel,
    },
    QuarantineResolved {
        quarantine_id: Uuid,
        decision: ReviewDecision,
        reviewer_id: String,
        escalation_tier: u32,
    },
}
