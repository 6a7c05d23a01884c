/// Transactional application of a changeset
///
/// Phases run in a fixed order (insert, update, delete) on one open
/// transaction. Each phase is followed by its change log entries, so nothing
/// commits unless every mutation and every log row made it.
use crate::modules::anime::domain::{AnimeId, HashedRecord};
use crate::modules::change_log::application::ChangeLogWriter;
use crate::modules::change_log::domain::ChangeKind;
use crate::modules::reconciliation::domain::ChangeSet;
use crate::modules::store::ports::{AnimeStore, StoreTransaction, BATCH_SIZE};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_error, log_info, log_warn};
use serde::Serialize;
use std::sync::Arc;

/// Generated ids are re-read in chunks of this size after a bulk load
pub const ID_LOOKUP_BATCH_SIZE: usize = 1000;

/// Row counts written by one successful apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub logged: usize,
}

#[derive(Clone)]
pub struct BulkApplier {
    store: Arc<dyn AnimeStore>,
}

impl BulkApplier {
    pub fn new(store: Arc<dyn AnimeStore>) -> Self {
        Self { store }
    }

    /// Apply `changeset` atomically. An empty changeset never opens a
    /// transaction.
    pub fn apply(&self, changeset: &ChangeSet) -> AppResult<ApplySummary> {
        if changeset.is_empty() {
            log_info!("No changes to apply");
            return Ok(ApplySummary::default());
        }

        let timer = TimedOperation::new("Apply changeset");
        let mut summary = ApplySummary::default();

        let result = self
            .store
            .within_transaction(&mut |tx: &mut dyn StoreTransaction| {
                summary = Self::apply_in(tx, changeset)?;
                Ok(())
            });

        if let Err(err) = result {
            LogContext::error_with_context(&err, "Changeset rolled back");
            log_error!("Failed to apply {}", changeset);
            return Err(AppError::apply_failed(err));
        }

        timer.finish_with_info(&format!(
            "{} inserted, {} updated, {} deleted, {} logged",
            summary.inserted, summary.updated, summary.deleted, summary.logged
        ));
        Ok(summary)
    }

    /// Run every phase on an already open transaction
    pub fn apply_in(tx: &mut dyn StoreTransaction, changeset: &ChangeSet) -> AppResult<ApplySummary> {
        let mut summary = ApplySummary::default();

        if !changeset.inserts().is_empty() {
            let timer = TimedOperation::new("Insert phase");
            let (loaded, inserted_ids) = Self::insert_phase(tx, changeset.inserts())?;
            summary.inserted = loaded;
            summary.logged += ChangeLogWriter::append(tx, &inserted_ids, ChangeKind::Insert)?;
            timer.finish();
        }

        if !changeset.updates().is_empty() {
            let timer = TimedOperation::new("Update phase");
            summary.updated = Self::update_phase(tx, changeset.updates())?;
            let updated_ids: Vec<AnimeId> = changeset.updates().iter().map(|(id, _)| *id).collect();
            summary.logged += ChangeLogWriter::append(tx, &updated_ids, ChangeKind::Update)?;
            timer.finish();
        }

        if !changeset.deletes().is_empty() {
            let timer = TimedOperation::new("Delete phase");
            summary.deleted = Self::delete_phase(tx, changeset.deletes())?;
            summary.logged += ChangeLogWriter::append(tx, changeset.deletes(), ChangeKind::Delete)?;
            timer.finish();
        }

        Ok(summary)
    }

    /// Bulk load, then resolve the ids the store generated. Every loaded row
    /// must resolve to exactly one id or the transaction is abandoned.
    fn insert_phase(
        tx: &mut dyn StoreTransaction,
        rows: &[HashedRecord],
    ) -> AppResult<(usize, Vec<AnimeId>)> {
        let loaded = tx.bulk_load(rows)?;
        log_info!("Inserted {} anime records", loaded);

        let mut primary_ids = Vec::new();
        let mut titles = Vec::new();
        for row in rows {
            match row.record.primary_id() {
                Some(id) => primary_ids.push(id),
                None => titles.push(row.record.title.clone()),
            }
        }

        let mut inserted_ids = Vec::with_capacity(rows.len());
        for batch in primary_ids.chunks(ID_LOOKUP_BATCH_SIZE) {
            inserted_ids.extend(tx.lookup_ids(batch, &[])?);
        }
        for batch in titles.chunks(ID_LOOKUP_BATCH_SIZE) {
            inserted_ids.extend(tx.lookup_ids(&[], batch)?);
        }

        if inserted_ids.len() != loaded {
            log_warn!(
                "Resolved {} ids for {} loaded anime records",
                inserted_ids.len(),
                loaded
            );
            return Err(AppError::InternalError(format!(
                "Resolved {} ids for {} loaded anime records",
                inserted_ids.len(),
                loaded
            )));
        }

        Ok((loaded, inserted_ids))
    }

    fn update_phase(tx: &mut dyn StoreTransaction, rows: &[(AnimeId, HashedRecord)]) -> AppResult<usize> {
        let batch_count = rows.len().div_ceil(BATCH_SIZE);
        let mut updated = 0;

        for (index, batch) in rows.chunks(BATCH_SIZE).enumerate() {
            updated += tx.update_batch(batch)?;
            LogContext::batch_progress("Updated anime records", index, batch_count);
        }

        log_info!("Updated {} anime records", updated);
        Ok(updated)
    }

    fn delete_phase(tx: &mut dyn StoreTransaction, ids: &[AnimeId]) -> AppResult<usize> {
        let batch_count = ids.len().div_ceil(BATCH_SIZE);
        let mut deleted = 0;

        for (index, batch) in ids.chunks(BATCH_SIZE).enumerate() {
            deleted += tx.delete_batch(batch)?;
            LogContext::batch_progress("Deleted anime records", index, batch_count);
        }

        log_info!("Deleted {} anime records", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::anime::domain::{AnimeRecord, Platform, SnapshotRow};
    use crate::modules::change_log::domain::ChangeLogEntry;
    use crate::modules::store::ports::MockStoreTransaction;
    use mockall::Sequence;

    struct UntouchedStore;

    impl AnimeStore for UntouchedStore {
        fn load_snapshot(&self) -> AppResult<Vec<SnapshotRow>> {
            panic!("snapshot must not be read")
        }

        fn within_transaction(
            &self,
            _work: &mut dyn FnMut(&mut dyn StoreTransaction) -> AppResult<()>,
        ) -> AppResult<()> {
            panic!("no transaction expected")
        }

        fn pending_changes(&self) -> AppResult<Vec<ChangeLogEntry>> {
            panic!("change log must not be read")
        }
    }

    fn hashed(title: &str, mal: Option<i64>) -> HashedRecord {
        let record = match mal {
            Some(id) => AnimeRecord::new(title).with_numeric(Platform::MyAnimeList, id),
            None => AnimeRecord::new(title),
        };
        HashedRecord::new(record).unwrap()
    }

    #[test]
    fn empty_changeset_touches_nothing() {
        let applier = BulkApplier::new(Arc::new(UntouchedStore));

        let summary = applier.apply(&ChangeSet::default()).unwrap();
        assert_eq!(summary, ApplySummary::default());
    }

    #[test]
    fn deletes_run_in_batches_of_one_thousand() {
        let ids: Vec<AnimeId> = (1..=2500).collect();
        let changeset = ChangeSet::new(vec![], vec![], ids);

        let mut tx = MockStoreTransaction::new();
        let mut seq = Sequence::new();
        for expected in [1000usize, 1000, 500] {
            tx.expect_delete_batch()
                .withf(move |batch| batch.len() == expected)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|batch| Ok(batch.len()));
        }
        tx.expect_append_change_log()
            .withf(|_, kind| *kind == ChangeKind::Delete)
            .times(3)
            .returning(|batch, _| Ok(batch.len()));
        tx.expect_bulk_load().never();
        tx.expect_update_batch().never();

        let summary = BulkApplier::apply_in(&mut tx, &changeset).unwrap();

        assert_eq!(summary.deleted, 2500);
        assert_eq!(summary.logged, 2500);
    }

    #[test]
    fn inserted_ids_are_resolved_by_primary_id_then_title() {
        let changeset = ChangeSet::new(
            vec![hashed("A", Some(10)), hashed("B", None), hashed("C", Some(30))],
            vec![],
            vec![],
        );

        let mut tx = MockStoreTransaction::new();
        tx.expect_bulk_load()
            .withf(|rows| rows.len() == 3)
            .times(1)
            .returning(|rows| Ok(rows.len()));
        tx.expect_lookup_ids()
            .withf(|ids, titles| ids == [10, 30] && titles.is_empty())
            .times(1)
            .returning(|_, _| Ok(vec![1, 3]));
        tx.expect_lookup_ids()
            .withf(|ids, titles| ids.is_empty() && titles == ["B".to_string()])
            .times(1)
            .returning(|_, _| Ok(vec![2]));
        tx.expect_append_change_log()
            .withf(|ids, kind| ids == [1, 3, 2] && *kind == ChangeKind::Insert)
            .times(1)
            .returning(|batch, _| Ok(batch.len()));

        let summary = BulkApplier::apply_in(&mut tx, &changeset).unwrap();

        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.logged, 3);
    }

    #[test]
    fn unresolved_insert_ids_abort_before_logging() {
        let changeset = ChangeSet::new(vec![hashed("A", Some(10)), hashed("B", Some(20))], vec![], vec![]);

        let mut tx = MockStoreTransaction::new();
        tx.expect_bulk_load().times(1).returning(|rows| Ok(rows.len()));
        tx.expect_lookup_ids().times(1).returning(|_, _| Ok(vec![1]));
        tx.expect_append_change_log().never();

        let result = BulkApplier::apply_in(&mut tx, &changeset);
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[test]
    fn inserted_count_is_what_the_store_loaded() {
        let changeset = ChangeSet::new(vec![hashed("A", Some(10)), hashed("B", Some(20))], vec![], vec![]);

        let mut tx = MockStoreTransaction::new();
        tx.expect_bulk_load().times(1).returning(|_| Ok(1));
        tx.expect_lookup_ids().times(1).returning(|_, _| Ok(vec![7]));
        tx.expect_append_change_log()
            .withf(|ids, kind| ids == [7] && *kind == ChangeKind::Insert)
            .times(1)
            .returning(|batch, _| Ok(batch.len()));

        let summary = BulkApplier::apply_in(&mut tx, &changeset).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.logged, 1);
    }

    #[test]
    fn updates_are_logged_after_the_update_phase() {
        let changeset = ChangeSet::new(vec![], vec![(5, hashed("Bar", Some(100)))], vec![]);

        let mut tx = MockStoreTransaction::new();
        let mut seq = Sequence::new();
        tx.expect_update_batch()
            .withf(|rows| rows.len() == 1 && rows[0].0 == 5)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|rows| Ok(rows.len()));
        tx.expect_append_change_log()
            .withf(|ids, kind| ids == [5] && *kind == ChangeKind::Update)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|batch, _| Ok(batch.len()));

        let summary = BulkApplier::apply_in(&mut tx, &changeset).unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.logged, 1);
    }

    #[test]
    fn failing_phase_stops_before_its_log_entries() {
        let changeset = ChangeSet::new(vec![], vec![], vec![1, 2]);

        let mut tx = MockStoreTransaction::new();
        tx.expect_delete_batch()
            .times(1)
            .returning(|_| Err(AppError::DatabaseError("deadlock detected".to_string())));
        tx.expect_append_change_log().never();

        let result = BulkApplier::apply_in(&mut tx, &changeset);
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }
}
