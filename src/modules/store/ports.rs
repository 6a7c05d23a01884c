/// Ports for the cross-reference store
///
/// The reconciliation engine talks to storage only through these traits; the
/// Diesel/PostgreSQL implementation lives in `infrastructure`.
use crate::modules::anime::domain::{
    AnimeId, HashedRecord, ManualMapping, PersistedAnime, Platform, SnapshotRow,
};
use crate::modules::change_log::domain::{ChangeKind, ChangeLogEntry, ChangeLogId};
use crate::shared::errors::AppResult;

/// Upper bound on ids or rows carried by one batched statement
pub const BATCH_SIZE: usize = 1000;

/// Statements available inside one open transaction.
///
/// Every method issues exactly one statement (or one bulk-load stream) for
/// the slice it is given; batching is the caller's job.
#[cfg_attr(test, mockall::automock)]
pub trait StoreTransaction {
    /// Stream rows through the bulk-load path; returns rows loaded
    fn bulk_load(&mut self, rows: &[HashedRecord]) -> AppResult<usize>;

    /// Resolve ids of freshly loaded rows by primary id, and by title for
    /// rows without one
    fn lookup_ids(&mut self, primary_ids: &[i64], titles: &[String]) -> AppResult<Vec<AnimeId>>;

    /// Multi-row update keyed by id; absent ids never clear a stored column
    fn update_batch(&mut self, rows: &[(AnimeId, HashedRecord)]) -> AppResult<usize>;

    fn delete_batch(&mut self, ids: &[AnimeId]) -> AppResult<usize>;

    fn append_change_log(&mut self, anime_ids: &[AnimeId], kind: ChangeKind) -> AppResult<usize>;

    /// Flip pending entries to processed; entries already processed are skipped
    fn mark_processed(&mut self, entry_ids: &[ChangeLogId]) -> AppResult<usize>;
}

/// Explicitly scoped handle on the store used by the writer side
pub trait AnimeStore: Send + Sync {
    /// The single detection read
    fn load_snapshot(&self) -> AppResult<Vec<SnapshotRow>>;

    /// Run `work` inside one transaction. Commits when it returns `Ok`,
    /// rolls back every statement otherwise.
    fn within_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreTransaction) -> AppResult<()>,
    ) -> AppResult<()>;

    /// Unprocessed change log entries, oldest first
    fn pending_changes(&self) -> AppResult<Vec<ChangeLogEntry>>;
}

/// Read-only lookups consumed by the export step
pub trait CatalogQueries: Send + Sync {
    fn count_anime(&self) -> AppResult<i64>;

    fn count_platform(&self, platform: Platform) -> AppResult<i64>;

    fn manual_mappings(&self, platform: Platform) -> AppResult<Vec<ManualMapping>>;

    fn all_anime(&self) -> AppResult<Vec<PersistedAnime>>;
}
