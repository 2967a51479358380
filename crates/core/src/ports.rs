//! Port interfaces for governance and scheduling collaborators.
//!
//! The core never talks to storage, identity, or content sources directly;
//! adapters implement these traits in the infra layer (or in tests).

use async_trait::async_trait;
use phigate_domain::{
    AuditEntry, GovernanceEvent, OperationalMode, QuarantineRecord, Result, ReviewerRole,
};
use uuid::Uuid;

/// Durable store for quarantine records. Keyed by record id; ownership of
/// the actual storage lives outside the core.
#[async_trait]
pub trait QuarantineRepository: Send + Sync {
    /// Persist a newly created record.
    async fn save(&self, record: &QuarantineRecord) -> Result<()>;

    /// Fetch a record by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<QuarantineRecord>>;

    /// Replace an existing record after a review transition.
    async fn update(&self, record: &QuarantineRecord) -> Result<()>;
}

/// Append-only audit trail for override reviews. Entries are never mutated
/// or deleted after creation.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<()>;

    async fn entries_for(&self, quarantine_id: Uuid) -> Result<Vec<AuditEntry>>;
}

/// Resolves a reviewer's role for override permission checks.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// Role of the given reviewer, or `NotFound` for unknown reviewers.
    async fn role_of(&self, reviewer_id: &str) -> Result<ReviewerRole>;
}

/// Read-only accessor for the current operational mode at decision time.
#[async_trait]
pub trait ModeProvider: Send + Sync {
    async fn current_mode(&self) -> OperationalMode;
}

/// Supplies the current text for a subject. Invoked by the scheduler only
/// when a scan actually fires, never on every trigger.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn content_for(&self, subject_id: &str) -> Result<String>;
}

/// Receives structured governance events. Events carry metadata only; raw
/// matched values must never reach any implementation of this trait.
pub trait AuditEventSink: Send + Sync {
    fn emit(&self, event: GovernanceEvent);
}
