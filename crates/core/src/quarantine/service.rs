//! Stateful, role-gated approval process for blocked actions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use phigate_domain::{
    AuditEntry, FindingsSummary, GovernanceConfig, GovernanceEvent, PhiGateError,
    QuarantineRecord, Result, ReviewDecision, ReviewerRole,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::ports::{AuditEventSink, AuditTrail, QuarantineRepository, RoleProvider};

/// A one-shot permission for a previously blocked action to proceed.
#[derive(Debug, Clone)]
struct ReleaseGrant {
    granted_at: DateTime<Utc>,
}

/// Quarantine workflow service.
///
/// State transitions: `Pending -> {Released, Rejected, Escalated}`.
/// `Released` and `Rejected` are terminal; an escalated record re-enters
/// review at the next tier.
pub struct QuarantineService {
    repository: Arc<dyn QuarantineRepository>,
    audit: Arc<dyn AuditTrail>,
    roles: Arc<dyn RoleProvider>,
    events: Arc<dyn AuditEventSink>,
    config: GovernanceConfig,
    releases: Mutex<HashMap<String, ReleaseGrant>>,
}

impl QuarantineService {
    pub fn new(
        repository: Arc<dyn QuarantineRepository>,
        audit: Arc<dyn AuditTrail>,
        roles: Arc<dyn RoleProvider>,
        events: Arc<dyn AuditEventSink>,
        config: GovernanceConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { repository, audit, roles, events, config, releases: Mutex::new(HashMap::new()) })
    }

    /// Create a quarantine record for a blocked action.
    ///
    /// The summary carries counts and risk only; raw matched values never
    /// enter a record.
    #[instrument(skip(self, summary))]
    pub async fn create_quarantine(
        &self,
        subject_id: &str,
        summary: FindingsSummary,
        requested_by: &str,
        reason: &str,
    ) -> Result<QuarantineRecord> {
        let record = QuarantineRecord::new(subject_id, summary, requested_by, reason);
        self.repository.save(&record).await?;
        self.events.emit(GovernanceEvent::QuarantineCreated {
            quarantine_id: record.id,
            subject_id: record.subject_id.clone(),
            risk_level: record.summary.risk_level,
        });
        info!(quarantine_id = %record.id, subject_id, "quarantine created");
        Ok(record)
    }

    /// Review a quarantined action.
    ///
    /// Fails with `InsufficientRole` below `Steward`, `JustificationTooShort`
    /// below the configured minimum, and `InvalidStateTransition` when the
    /// record is already terminal. On success the status is updated, an
    /// immutable audit entry is appended, and a release registers a one-shot
    /// grant for the original action.
    #[instrument(skip(self, justification))]
    pub async fn review_quarantine(
        &self,
        record_id: Uuid,
        decision: ReviewDecision,
        reviewer_id: &str,
        justification: &str,
    ) -> Result<QuarantineRecord> {
        let mut record = self
            .repository
            .fetch(record_id)
            .await?
            .ok_or_else(|| PhiGateError::NotFound(format!("quarantine record {record_id}")))?;

        let actual = self.roles.role_of(reviewer_id).await?;
        if actual < ReviewerRole::Steward {
            warn!(quarantine_id = %record_id, %actual, "review rejected: insufficient role");
            return Err(PhiGateError::InsufficientRole {
                required: ReviewerRole::Steward,
                actual,
            });
        }

        let justification = justification.trim();
        let chars = justification.chars().count();
        if chars < self.config.min_justification_chars {
            return Err(PhiGateError::JustificationTooShort {
                minimum: self.config.min_justification_chars,
                actual: chars,
            });
        }

        if record.status.is_terminal() {
            return Err(PhiGateError::InvalidStateTransition {
                from: record.status,
                attempted: decision,
            });
        }

        let now = Utc::now();
        record.status = decision.resulting_status();
        match decision {
            ReviewDecision::Release | ReviewDecision::Reject => {
                record.resolved_by = Some(reviewer_id.to_string());
                record.resolved_at = Some(now);
            }
            ReviewDecision::Escalate => {
                // Re-enters review at the next tier; the escalation target
                // is external to the core.
                record.escalation_tier += 1;
            }
        }
        self.repository.update(&record).await?;

        self.audit
            .append(AuditEntry {
                quarantine_id: record.id,
                decision,
                reviewer_id: reviewer_id.to_string(),
                justification: justification.to_string(),
                timestamp: now,
            })
            .await?;

        if decision == ReviewDecision::Release {
            self.releases
                .lock()
                .insert(record.subject_id.clone(), ReleaseGrant { granted_at: now });
        }

        self.events.emit(GovernanceEvent::QuarantineResolved {
            quarantine_id: record.id,
            decision,
            reviewer_id: reviewer_id.to_string(),
            escalation_tier: record.escalation_tier,
        });
        info!(quarantine_id = %record.id, %decision, "quarantine reviewed");

        Ok(record)
    }

    /// Consume the release grant for a subject, if one exists.
    ///
    /// Returns true exactly once per release; a grant older than the
    /// configured release window has expired and returns false.
    pub fn take_release(&self, subject_id: &str) -> bool {
        let Some(grant) = self.releases.lock().remove(subject_id) else {
            return false;
        };
        match self.config.release_window {
            None => true,
            Some(window) => {
                let age = Utc::now().signed_duration_since(grant.granted_at);
                match chrono::Duration::from_std(window) {
                    Ok(limit) => age < limit,
                    Err(_) => true,
                }
            }
        }
    }

    /// Audit trail entries for a record, oldest first.
    pub async fn audit_entries(&self, record_id: Uuid) -> Result<Vec<AuditEntry>> {
        self.audit.entries_for(record_id).await
    }
}
