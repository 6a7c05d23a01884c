use crate::modules::anime::domain::AnimeId;
use crate::modules::change_log::domain::{ChangeKind, ChangeLogEntry, ChangeLogId};
use crate::modules::store::ports::{AnimeStore, StoreTransaction, BATCH_SIZE};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::LogContext;
use crate::log_info;
use std::sync::Arc;

/// Append-only change log for downstream incremental consumers.
///
/// Entries are written inside the caller's transaction so they commit or roll
/// back together with the mutation they describe.
#[derive(Clone)]
pub struct ChangeLogWriter {
    store: Arc<dyn AnimeStore>,
}

impl ChangeLogWriter {
    pub fn new(store: Arc<dyn AnimeStore>) -> Self {
        Self { store }
    }

    /// One entry per id, in batches of `BATCH_SIZE`
    pub fn append(
        tx: &mut dyn StoreTransaction,
        anime_ids: &[AnimeId],
        kind: ChangeKind,
    ) -> AppResult<usize> {
        let batch_count = anime_ids.len().div_ceil(BATCH_SIZE);
        let operation = format!("Logged {} changes", kind);

        let mut written = 0;
        for (index, batch) in anime_ids.chunks(BATCH_SIZE).enumerate() {
            written += tx.append_change_log(batch, kind)?;
            LogContext::batch_progress(&operation, index, batch_count);
        }
        Ok(written)
    }

    /// Unprocessed entries in creation order
    pub fn pending(&self) -> AppResult<Vec<ChangeLogEntry>> {
        self.store.pending_changes()
    }

    /// Mark entries processed. Safe to repeat: entries already processed are
    /// left as they are and unknown ids are ignored.
    pub fn ack(&self, entry_ids: &[ChangeLogId]) -> AppResult<usize> {
        if entry_ids.is_empty() {
            return Ok(0);
        }

        let batch_count = entry_ids.len().div_ceil(BATCH_SIZE);
        let mut acknowledged = 0;

        self.store
            .within_transaction(&mut |tx: &mut dyn StoreTransaction| {
                acknowledged = 0;
                for (index, batch) in entry_ids.chunks(BATCH_SIZE).enumerate() {
                    acknowledged += tx.mark_processed(batch)?;
                    LogContext::batch_progress("Acknowledged changes", index, batch_count);
                }
                Ok(())
            })?;

        log_info!(
            "Acknowledged {} of {} change log entries",
            acknowledged,
            entry_ids.len()
        );
        Ok(acknowledged)
    }
}
