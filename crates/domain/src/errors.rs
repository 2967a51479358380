//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::governance::{QuarantineStatus, ReviewDecision, ReviewerRole};

/// Main error type for PhiGate
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum PhiGateError {
    /// Input exceeded the configured byte ceiling. Rejected locally, never
    /// scanned.
    #[error("content too large: {size} bytes exceeds limit of {limit}")]
    ContentTooLarge { size: usize, limit: usize },

    /// The detector or one of its dependencies failed. Must propagate to the
    /// gating policy as "unavailable", never be treated as "no findings".
    #[error("scan unavailable: {0}")]
    ScanUnavailable(String),

    /// Reviewer's role does not meet the override threshold.
    #[error("insufficient role: requires at least {required}, reviewer has {actual}")]
    InsufficientRole { required: ReviewerRole, actual: ReviewerRole },

    /// Review justification is below the configured minimum length.
    #[error("justification too short: {actual} characters, minimum is {minimum}")]
    JustificationTooShort { minimum: usize, actual: usize },

    /// Review attempted on a quarantine record in a terminal state.
    #[error("invalid state transition: record is {from}, cannot apply {attempted}")]
    InvalidStateTransition { from: QuarantineStatus, attempted: ReviewDecision },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for PhiGate operations
pub type Result<T> = std::result::Result<T, PhiGateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_too_large_reports_both_sizes() {
        let err = PhiGateError::ContentTooLarge { size: 1025, limit: 1024 };
        let rendered = err.to_string();
        assert!(rendered.contains("1025"));
        assert!(rendered.contains("1024"));
    }

    #[test]
    fn errors_round_trip_through_serde() {
        let err = PhiGateError::InsufficientRole {
            required: ReviewerRole::Steward,
            actual: ReviewerRole::Researcher,
        };
        let json = serde_json::to_string(&err).expect("serialize");
        let back: PhiGateError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, err);
    }
}
