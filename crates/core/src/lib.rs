//! # PhiGate Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The PHI pattern detector (detect / redact / has_phi)
//! - The risk classifier
//! - The mode-aware gating policy
//! - The quarantine & override workflow
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `phigate-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod detection;
pub mod gating;
pub mod ports;
pub mod quarantine;
pub mod risk;

// Re-export specific items to avoid ambiguity
pub use detection::PhiDetector;
pub use gating::{GatePolicy, GovernanceService};
pub use ports::{
    AuditEventSink, AuditTrail, ContentProvider, ModeProvider, QuarantineRepository, RoleProvider,
};
pub use quarantine::QuarantineService;
pub use risk::classify;
