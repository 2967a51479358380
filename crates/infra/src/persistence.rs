//! In-memory persistence adapters.
//!
//! Backing stores for the quarantine repository and the audit trail. Both
//! are process-local; a deployment wanting durability swaps these for a
//! database-backed implementation of the same ports.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use phigate_core::ports::{AuditTrail, QuarantineRepository};
use phigate_domain::{AuditEntry, PhiGateError, QuarantineRecord, Result};
use uuid::Uuid;

/// Quarantine record store keyed by record id.
#[derive(Debug, Default)]
pub struct InMemoryQuarantineRepository {
    records: RwLock<HashMap<Uuid, QuarantineRecord>>,
}

impl InMemoryQuarantineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, terminal or not.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl QuarantineRepository for InMemoryQuarantineRepository {
    async fn save(&self, record: &QuarantineRecord) -> Result<()> {
        self.records.write().insert(record.id, record.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<QuarantineRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn update(&self, record: &QuarantineRecord) -> Result<()> {
        let mut records = self.records.write();
        if !records.contains_key(&record.id) {
            return Err(PhiGateError::NotFound(format!(
                "quarantine record {}",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }
}

/// Append-only audit trail. Entries are pushed in arrival order and never
/// mutated or removed.
#[derive(Debug, Default)]
pub struct InMemoryAuditTrail {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries across all quarantines.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl AuditTrail for InMemoryAuditTrail {
    async fn append(&self, entry: AuditEntry) -> Result<()> {
        self.entries.write().push(entry);
        Ok(())
    }

    async fn entries_for(&self, quarantine_id: Uuid) -> Result<Vec<AuditEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|entry| entry.quarantine_id == quarantine_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use phigate_domain::{FindingsSummary, QuarantineStatus, ReviewDecision, RiskLevel};

    fn record() -> QuarantineRecord {
        QuarantineRecord::new(
            "doc-1",
            FindingsSummary {
                counts_by_type: Default::default(),
                risk_level: RiskLevel::High,
            },
            "system",
            "high risk findings detected",
        )
    }

    #[tokio::test]
    async fn save_then_fetch_round_trips() {
        let repo = InMemoryQuarantineRepository::new();
        let rec = record();
        repo.save(&rec).await.unwrap();

        let fetched = repo.fetch(rec.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, rec.id);
        assert_eq!(fetched.status, QuarantineStatus::Pending);
    }

    #[tokio::test]
    async fn fetch_unknown_id_is_none() {
        let repo = InMemoryQuarantineRepository::new();
        assert!(repo.fetch(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let repo = InMemoryQuarantineRepository::new();
        let err = repo.update(&record()).await.unwrap_err();
        assert!(matches!(err, PhiGateError::NotFound(_)));
    }

    #[tokio::test]
    async fn audit_entries_filtered_by_quarantine() {
        let trail = InMemoryAuditTrail::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        for (id, reviewer) in [(a, "steward"), (b, "admin"), (a, "admin")] {
            trail
                .append(AuditEntry {
                    quarantine_id: id,
                    decision: ReviewDecision::Escalate,
                    reviewer_id: reviewer.to_string(),
                    justification: "needs a second opinion from compliance".to_string(),
                    timestamp: Utc::now(),
                })
                .await
                .unwrap();
        }

        let for_a = trail.entries_for(a).await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].reviewer_id, "steward");
        assert_eq!(for_a[1].reviewer_id, "admin");
        assert_eq!(trail.len(), 3);
    }
}
