//! Domain type definitions

pub mod detection;
pub mod governance;

pub use detection::{
    Confidence, Finding, PhiType, RiskLevel, ScanResult, ScanStatus,
};
pub use governance::{
    AuditEntry, FindingsSummary, GateDecision, GovernanceEvent, OperationalMode, QuarantineRecord,
    QuarantineStatus, ReviewDecision, ReviewerRole,
};
