/// ReconciliationService - one full-refresh run
///
/// Pipeline stages:
/// 1. Fetch - pull the complete snapshot from a `RecordSource`
/// 2. Detect - diff it against the store (one read)
/// 3. Apply - write the changeset and its change log in one transaction
///
/// Store calls block, so detection and apply run on tokio's blocking pool.
/// Runs must not overlap: the caller schedules them one at a time.
use crate::modules::anime::domain::AnimeRecord;
use crate::modules::reconciliation::application::bulk_applier::{ApplySummary, BulkApplier};
use crate::modules::reconciliation::application::ports::RecordSource;
use crate::modules::reconciliation::domain::{ChangeDetector, ChangeSet};
use crate::modules::store::ports::AnimeStore;
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::TimedOperation;
use crate::log_info;
use serde::Serialize;
use std::sync::Arc;

/// Sizes of the detected changeset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl From<&ChangeSet> for ChangeCounts {
    fn from(changeset: &ChangeSet) -> Self {
        Self {
            inserts: changeset.inserts().len(),
            updates: changeset.updates().len(),
            deletes: changeset.deletes().len(),
        }
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Records received from the source
    pub fetched: usize,
    pub changes: ChangeCounts,
    pub summary: ApplySummary,
    pub duration_ms: u64,
}

impl ReconciliationReport {
    pub fn is_noop(&self) -> bool {
        self.summary == ApplySummary::default()
    }
}

#[derive(Clone)]
pub struct ReconciliationService {
    detector: ChangeDetector,
    applier: BulkApplier,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn AnimeStore>) -> Self {
        Self {
            detector: ChangeDetector::new(Arc::clone(&store)),
            applier: BulkApplier::new(store),
        }
    }

    /// Fetch from `source` and reconcile the result
    pub async fn reconcile(&self, source: &dyn RecordSource) -> AppResult<ReconciliationReport> {
        log_info!("Fetching anime records from {}", source.name());
        let records = source.fetch().await?;
        self.reconcile_records(records).await
    }

    /// Reconcile an already collected snapshot
    pub async fn reconcile_records(&self, records: Vec<AnimeRecord>) -> AppResult<ReconciliationReport> {
        let timer = TimedOperation::new("Reconciliation");
        let fetched = records.len();
        log_info!("Starting reconciliation of {} anime records", fetched);

        let detector = self.detector.clone();
        let changeset = tokio::task::spawn_blocking(move || detector.detect_changes(records)).await??;
        let changes = ChangeCounts::from(&changeset);

        let applier = self.applier.clone();
        let summary = tokio::task::spawn_blocking(move || applier.apply(&changeset)).await??;

        let duration_ms = timer.finish_with_info(&format!(
            "{} fetched, {} inserted, {} updated, {} deleted",
            fetched, summary.inserted, summary.updated, summary.deleted
        ));

        Ok(ReconciliationReport {
            fetched,
            changes,
            summary,
            duration_ms,
        })
    }
}
