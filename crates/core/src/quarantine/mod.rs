//! Quarantine & override workflow.
//!
//! Blocked actions become quarantine records that only sufficiently
//! privileged reviewers can release, reject, or escalate. Every review
//! appends an immutable audit entry.

pub mod service;

pub use service::QuarantineService;
