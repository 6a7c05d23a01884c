/// Full-refresh change detection
///
/// The incoming snapshot is ground truth: rows it matches are updated when
/// their content hash moved, rows it misses are deleted, records matching
/// nothing are inserted.
use crate::log_info;
use crate::modules::anime::domain::{AnimeId, AnimeRecord, HashedRecord, SnapshotRow};
use crate::modules::reconciliation::domain::change_set::ChangeSet;
use crate::modules::store::ports::AnimeStore;
use crate::shared::errors::AppResult;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone)]
pub struct ChangeDetector {
    store: Arc<dyn AnimeStore>,
}

impl ChangeDetector {
    pub fn new(store: Arc<dyn AnimeStore>) -> Self {
        Self { store }
    }

    /// Read the stored snapshot once and diff `new_records` against it
    pub fn detect_changes(&self, new_records: Vec<AnimeRecord>) -> AppResult<ChangeSet> {
        log_info!("Detecting changes in {} anime records...", new_records.len());

        let snapshot = self.store.load_snapshot()?;
        let changeset = Self::diff(new_records, &snapshot)?;

        log_info!("Changes detected: {}", changeset);
        Ok(changeset)
    }

    /// Pure diff. Any record that cannot be hashed aborts the whole pass:
    /// silently dropping it would get its row deleted.
    pub fn diff(new_records: Vec<AnimeRecord>, snapshot: &[SnapshotRow]) -> AppResult<ChangeSet> {
        let by_primary: HashMap<i64, &SnapshotRow> = snapshot
            .iter()
            .filter_map(|row| row.primary_id.map(|id| (id, row)))
            .collect();
        let by_title: HashMap<&str, &SnapshotRow> = snapshot
            .iter()
            .map(|row| (row.title.as_str(), row))
            .collect();

        let mut seen_primary: HashSet<i64> = HashSet::new();
        let mut seen_titles: HashSet<String> = HashSet::new();

        let mut inserts = Vec::new();
        let mut updates = Vec::new();

        for record in new_records {
            let hashed = HashedRecord::new(record)?;
            let primary_id = hashed.record.primary_id();

            let existing = match primary_id.and_then(|id| by_primary.get(&id).map(|row| (id, *row))) {
                Some((id, row)) => {
                    seen_primary.insert(id);
                    Some(row)
                }
                None => by_title.get(hashed.record.title.as_str()).map(|row| {
                    seen_titles.insert(hashed.record.title.clone());
                    *row
                }),
            };

            match existing {
                Some(row) => {
                    if row.data_hash != hashed.data_hash {
                        updates.push((row.id, hashed));
                    }
                }
                None => {
                    if let Some(id) = primary_id {
                        seen_primary.insert(id);
                    }
                    seen_titles.insert(hashed.record.title.clone());
                    inserts.push(hashed);
                }
            }
        }

        let deletes: Vec<AnimeId> = snapshot
            .iter()
            .filter(|row| match row.primary_id {
                Some(id) => !seen_primary.contains(&id),
                None => !seen_titles.contains(&row.title),
            })
            .map(|row| row.id)
            .collect();

        Ok(ChangeSet::new(inserts, updates, deletes))
    }
}
