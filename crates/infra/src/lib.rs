//! # PhiGate Infra
//!
//! Adapter layer owning runtime resources: timers, persistence, and
//! observability sinks.
//!
//! This crate contains:
//! - The debounced scan scheduler (the only owner of per-subject timers)
//! - In-memory persistence adapters for quarantine records and the audit
//!   trail
//! - Static role/mode providers and a tracing-backed audit event sink
//!
//! ## Architecture
//! - Implements the port traits declared in `phigate-core`
//! - Owns all mutable shared state; the core stays pure

pub mod persistence;
pub mod providers;
pub mod scheduling;

pub use persistence::{InMemoryAuditTrail, InMemoryQuarantineRepository};
pub use providers::{StaticModeProvider, StaticRoleProvider, TracingAuditSink};
pub use scheduling::{ScanScheduler, ScanSchedulerConfig, SchedulerError, SchedulerResult};
