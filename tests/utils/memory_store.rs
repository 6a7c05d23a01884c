/// In-memory store with real transaction semantics
///
/// A transaction works on a copy of the state which replaces the committed
/// state only when the work returns `Ok`. Statement counts are recorded
/// whether or not the transaction commits.
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use xref_lib::modules::anime::domain::{
    AnimeId, HashedRecord, ManualMapping, PersistedAnime, Platform, SnapshotRow,
};
use xref_lib::modules::change_log::domain::{ChangeKind, ChangeLogEntry, ChangeLogId};
use xref_lib::modules::store::{AnimeStore, CatalogQueries, StoreTransaction};
use xref_lib::shared::errors::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct State {
    anime: BTreeMap<AnimeId, PersistedAnime>,
    next_anime_id: AnimeId,
    change_log: Vec<ChangeLogEntry>,
    next_log_id: ChangeLogId,
    manual_mappings: Vec<ManualMapping>,
}

/// Statements issued against the store, committed or not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementCounts {
    pub bulk_loads: usize,
    pub lookups: usize,
    pub updates: usize,
    pub deletes: usize,
    pub log_appends: usize,
    pub acks: usize,
    pub transactions: usize,
    pub snapshot_reads: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    counts: Mutex<StatementCounts>,
    fail_deletes: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delete statement fails from now on
    pub fn fail_delete_batches(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn add_manual_mapping(&self, platform: Platform, platform_id: &str, slug: Option<&str>) {
        lock(&self.state).manual_mappings.push(ManualMapping {
            platform: platform.as_str().to_string(),
            platform_id: platform_id.to_string(),
            platform_slug: slug.map(str::to_string),
        });
    }

    pub fn counts(&self) -> StatementCounts {
        lock(&self.counts).clone()
    }

    pub fn reset_counts(&self) {
        *lock(&self.counts) = StatementCounts::default();
    }

    pub fn rows(&self) -> Vec<PersistedAnime> {
        lock(&self.state).anime.values().cloned().collect()
    }

    pub fn change_log(&self) -> Vec<ChangeLogEntry> {
        lock(&self.state).change_log.clone()
    }
}

struct MemoryTransaction<'a> {
    state: &'a mut State,
    counts: &'a Mutex<StatementCounts>,
    fail_deletes: bool,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn bulk_load(&mut self, rows: &[HashedRecord]) -> AppResult<usize> {
        lock(self.counts).bulk_loads += 1;

        let now = Utc::now();
        for row in rows {
            if let Some(primary) = row.record.primary_id() {
                let taken = self
                    .state
                    .anime
                    .values()
                    .any(|stored| stored.record.primary_id() == Some(primary));
                if taken {
                    return Err(AppError::DatabaseError(format!(
                        "duplicate key value violates unique constraint (myanimelist)=({})",
                        primary
                    )));
                }
            }

            self.state.next_anime_id += 1;
            let id = self.state.next_anime_id;
            self.state.anime.insert(
                id,
                PersistedAnime {
                    id,
                    record: row.record.clone(),
                    data_hash: row.data_hash.clone(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        Ok(rows.len())
    }

    fn lookup_ids(&mut self, primary_ids: &[i64], titles: &[String]) -> AppResult<Vec<AnimeId>> {
        lock(self.counts).lookups += 1;

        let mut ids: Vec<AnimeId> = self
            .state
            .anime
            .values()
            .filter(|row| matches!(row.record.primary_id(), Some(id) if primary_ids.contains(&id)))
            .map(|row| row.id)
            .collect();
        ids.extend(
            self.state
                .anime
                .values()
                .filter(|row| row.record.primary_id().is_none() && titles.contains(&row.record.title))
                .map(|row| row.id),
        );
        Ok(ids)
    }

    fn update_batch(&mut self, rows: &[(AnimeId, HashedRecord)]) -> AppResult<usize> {
        lock(self.counts).updates += 1;

        let now = Utc::now();
        let mut updated = 0;
        for (id, hashed) in rows {
            if let Some(stored) = self.state.anime.get_mut(id) {
                stored.record.title = hashed.record.title.clone();
                for (platform, external_id) in &hashed.record.ids {
                    stored.record.ids.insert(*platform, external_id.clone());
                }
                stored.data_hash = hashed.data_hash.clone();
                stored.updated_at = now;
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn delete_batch(&mut self, ids: &[AnimeId]) -> AppResult<usize> {
        lock(self.counts).deletes += 1;

        if self.fail_deletes {
            return Err(AppError::DatabaseError("canceling statement due to lock timeout".to_string()));
        }

        Ok(ids
            .iter()
            .filter(|id| self.state.anime.remove(*id).is_some())
            .count())
    }

    fn append_change_log(&mut self, anime_ids: &[AnimeId], kind: ChangeKind) -> AppResult<usize> {
        lock(self.counts).log_appends += 1;

        let now = Utc::now();
        for anime_id in anime_ids {
            self.state.next_log_id += 1;
            self.state.change_log.push(ChangeLogEntry {
                id: self.state.next_log_id,
                anime_id: *anime_id,
                change_type: kind,
                processed: false,
                created_at: now,
                processed_at: None,
            });
        }
        Ok(anime_ids.len())
    }

    fn mark_processed(&mut self, entry_ids: &[ChangeLogId]) -> AppResult<usize> {
        lock(self.counts).acks += 1;

        let now = Utc::now();
        let mut flipped = 0;
        for entry in self.state.change_log.iter_mut() {
            if entry_ids.contains(&entry.id) && entry.is_pending() {
                entry.acknowledge(now);
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

impl AnimeStore for MemoryStore {
    fn load_snapshot(&self) -> AppResult<Vec<SnapshotRow>> {
        lock(&self.counts).snapshot_reads += 1;
        Ok(lock(&self.state)
            .anime
            .values()
            .map(PersistedAnime::snapshot_row)
            .collect())
    }

    fn within_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreTransaction) -> AppResult<()>,
    ) -> AppResult<()> {
        lock(&self.counts).transactions += 1;

        let mut committed = lock(&self.state);
        let mut draft = committed.clone();
        let mut tx = MemoryTransaction {
            state: &mut draft,
            counts: &self.counts,
            fail_deletes: self.fail_deletes.load(Ordering::SeqCst),
        };

        work(&mut tx)?;
        *committed = draft;
        Ok(())
    }

    fn pending_changes(&self) -> AppResult<Vec<ChangeLogEntry>> {
        let mut pending: Vec<ChangeLogEntry> = lock(&self.state)
            .change_log
            .iter()
            .filter(|entry| entry.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|entry| (entry.created_at, entry.id));
        Ok(pending)
    }
}

impl CatalogQueries for MemoryStore {
    fn count_anime(&self) -> AppResult<i64> {
        Ok(lock(&self.state).anime.len() as i64)
    }

    fn count_platform(&self, platform: Platform) -> AppResult<i64> {
        Ok(lock(&self.state)
            .anime
            .values()
            .filter(|row| row.record.id(platform).is_some())
            .count() as i64)
    }

    fn manual_mappings(&self, platform: Platform) -> AppResult<Vec<ManualMapping>> {
        Ok(lock(&self.state)
            .manual_mappings
            .iter()
            .filter(|mapping| mapping.platform == platform.as_str())
            .cloned()
            .collect())
    }

    fn all_anime(&self) -> AppResult<Vec<PersistedAnime>> {
        Ok(lock(&self.state).anime.values().cloned().collect())
    }
}
