//! Mode-aware gating policy.
//!
//! Consumes a scan result and the current operational mode and decides
//! whether the downstream action (commit, export, broadcast) may proceed.
//! LIVE fails closed whenever the scan status cannot be trusted; STANDBY
//! blocks unconditionally as defense in depth; DEMO is permissive because it
//! never touches production content.

use std::sync::Arc;

use phigate_domain::{
    GateDecision, GovernanceEvent, OperationalMode, Result, RiskLevel, ScanResult,
};
use tracing::{info, instrument, warn};

use crate::ports::{AuditEventSink, ModeProvider};
use crate::quarantine::QuarantineService;

/// Fixed block message for STANDBY mode, returned irrespective of findings.
const STANDBY_BLOCK_MESSAGE: &str = "standby mode: action blocked";

/// Mode-aware decision function over scan results.
pub struct GatePolicy {
    quarantines: Arc<QuarantineService>,
    events: Arc<dyn AuditEventSink>,
}

impl GatePolicy {
    pub fn new(quarantines: Arc<QuarantineService>, events: Arc<dyn AuditEventSink>) -> Self {
        Self { quarantines, events }
    }

    /// Decide whether the action for `subject_id` may proceed.
    ///
    /// Block responses never include raw matched values, only counts and the
    /// risk level. In LIVE mode a high-risk scan creates a quarantine record
    /// whose id is returned for the override workflow.
    #[instrument(skip(self, scan), fields(risk = %scan.risk_level, %mode))]
    pub async fn decide(
        &self,
        subject_id: &str,
        scan: &ScanResult,
        mode: OperationalMode,
        requested_by: &str,
    ) -> Result<GateDecision> {
        let decision = match mode {
            OperationalMode::Demo => self.decide_demo(subject_id, scan),
            OperationalMode::Live => self.decide_live(subject_id, scan, requested_by).await?,
            OperationalMode::Standby => GateDecision::blocked(STANDBY_BLOCK_MESSAGE),
        };

        self.events.emit(GovernanceEvent::DecisionMade {
            subject_id: subject_id.to_string(),
            mode,
            risk_level: scan.risk_level,
            allowed: decision.allow,
            audit_flag: mode == OperationalMode::Live && scan.risk_level == RiskLevel::Medium,
        });

        Ok(decision)
    }

    fn decide_demo(&self, subject_id: &str, scan: &ScanResult) -> GateDecision {
        if scan.is_unavailable() {
            warn!(subject_id, "demo mode: scan unavailable, allowing");
            return GateDecision::allowed("allowed (demo mode, scan unavailable)");
        }
        if scan.risk_level > RiskLevel::None {
            info!(subject_id, risk = %scan.risk_level, "demo mode: findings present, allowing");
        }
        GateDecision::allowed("allowed (demo mode)")
    }

    async fn decide_live(
        &self,
        subject_id: &str,
        scan: &ScanResult,
        requested_by: &str,
    ) -> Result<GateDecision> {
        if scan.is_unavailable() {
            // Never assume "no PHI" on error.
            warn!(subject_id, "live mode: scan unavailable, failing closed");
            return Ok(GateDecision::blocked("scan unavailable: action blocked"));
        }

        match scan.risk_level {
            RiskLevel::None => Ok(GateDecision::allowed("allowed")),
            RiskLevel::Medium => {
                info!(subject_id, "live mode: medium risk allowed with audit flag");
                Ok(GateDecision::allowed("allowed (medium risk, flagged for audit)"))
            }
            RiskLevel::High => {
                let summary = scan.summary();
                let total = summary.total_findings();
                let record = self
                    .quarantines
                    .create_quarantine(
                        subject_id,
                        summary,
                        requested_by,
                        "high risk findings detected",
                    )
                    .await?;
                Ok(GateDecision {
                    allow: false,
                    quarantine_id: Some(record.id),
                    message: format!("action blocked: risk=high, findings={total}"),
                })
            }
        }
    }
}

/// Facade binding the gating policy to a mode provider, for callers that do
/// not carry the current mode themselves.
pub struct GovernanceService {
    mode: Arc<dyn ModeProvider>,
    policy: GatePolicy,
}

impl GovernanceService {
    pub fn new(mode: Arc<dyn ModeProvider>, policy: GatePolicy) -> Self {
        Self { mode, policy }
    }

    /// Decide using the mode provider's current operational mode.
    pub async fn decide(
        &self,
        subject_id: &str,
        scan: &ScanResult,
        requested_by: &str,
    ) -> Result<GateDecision> {
        let mode = self.mode.current_mode().await;
        self.policy.decide(subject_id, scan, mode, requested_by).await
    }
}
