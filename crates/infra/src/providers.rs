//! Static providers and the tracing-backed event sink.
//!
//! Small adapters for deployments where the mode and the role table are
//! fixed at startup. The event sink turns governance events into structured
//! log records; events carry metadata only, so nothing sensitive can reach
//! the logs through it.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use phigate_core::ports::{AuditEventSink, ModeProvider, RoleProvider};
use phigate_domain::{GovernanceEvent, OperationalMode, PhiGateError, Result, ReviewerRole};
use tracing::{info, warn};

/// Mode provider backed by a single switchable value.
#[derive(Debug)]
pub struct StaticModeProvider {
    mode: RwLock<OperationalMode>,
}

impl StaticModeProvider {
    pub fn new(mode: OperationalMode) -> Self {
        Self { mode: RwLock::new(mode) }
    }

    /// Switch the mode; takes effect for every subsequent decision.
    pub fn set_mode(&self, mode: OperationalMode) {
        let previous = {
            let mut current = self.mode.write();
            std::mem::replace(&mut *current, mode)
        };
        if previous != mode {
            info!(%previous, %mode, "operational mode changed");
        }
    }
}

#[async_trait]
impl ModeProvider for StaticModeProvider {
    async fn current_mode(&self) -> OperationalMode {
        *self.mode.read()
    }
}

/// Role provider backed by a fixed reviewer table.
#[derive(Debug, Default)]
pub struct StaticRoleProvider {
    roles: HashMap<String, ReviewerRole>,
}

impl StaticRoleProvider {
    pub fn new(roles: HashMap<String, ReviewerRole>) -> Self {
        Self { roles }
    }

    pub fn with_role(mut self, reviewer_id: impl Into<String>, role: ReviewerRole) -> Self {
        self.roles.insert(reviewer_id.into(), role);
        self
    }
}

#[async_trait]
impl RoleProvider for StaticRoleProvider {
    async fn role_of(&self, reviewer_id: &str) -> Result<ReviewerRole> {
        self.roles
            .get(reviewer_id)
            .copied()
            .ok_or_else(|| PhiGateError::NotFound(format!("reviewer {reviewer_id}")))
    }
}

/// Event sink that emits each governance event as a structured log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditEventSink for TracingAuditSink {
    fn emit(&self, event: GovernanceEvent) {
        match &event {
            GovernanceEvent::ScanCompleted { subject_id, risk_level, total_findings, degraded } => {
                if *degraded {
                    warn!(subject_id, %risk_level, total_findings, "scan completed degraded");
                } else {
                    info!(subject_id, %risk_level, total_findings, "scan completed");
                }
            }
            GovernanceEvent::DecisionMade { subject_id, mode, risk_level, allowed, audit_flag } => {
                info!(subject_id, %mode, %risk_level, allowed, audit_flag, "gate decision");
            }
            GovernanceEvent::QuarantineCreated { quarantine_id, subject_id, risk_level } => {
                warn!(%quarantine_id, subject_id, %risk_level, "quarantine created");
            }
            GovernanceEvent::QuarantineResolved {
                quarantine_id,
                decision,
                reviewer_id,
                escalation_tier,
            } => {
                info!(%quarantine_id, %decision, reviewer_id, escalation_tier, "quarantine resolved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mode_provider_reflects_switches() {
        let provider = StaticModeProvider::new(OperationalMode::Demo);
        assert_eq!(provider.current_mode().await, OperationalMode::Demo);

        provider.set_mode(OperationalMode::Live);
        assert_eq!(provider.current_mode().await, OperationalMode::Live);
    }

    #[tokio::test]
    async fn role_provider_resolves_known_reviewers() {
        let provider = StaticRoleProvider::default()
            .with_role("alice", ReviewerRole::Steward)
            .with_role("bob", ReviewerRole::Viewer);

        assert_eq!(provider.role_of("alice").await.unwrap(), ReviewerRole::Steward);
        assert_eq!(provider.role_of("bob").await.unwrap(), ReviewerRole::Viewer);
        assert!(matches!(
            provider.role_of("mallory").await,
            Err(PhiGateError::NotFound(_))
        ));
    }
}
