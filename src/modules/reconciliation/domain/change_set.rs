use crate::modules::anime::domain::{AnimeId, HashedRecord};

/// Minimal difference between an incoming snapshot and the store.
///
/// Built once by the detector and applied once; there is no way to edit it
/// after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    inserts: Vec<HashedRecord>,
    updates: Vec<(AnimeId, HashedRecord)>,
    deletes: Vec<AnimeId>,
}

impl ChangeSet {
    pub fn new(
        inserts: Vec<HashedRecord>,
        updates: Vec<(AnimeId, HashedRecord)>,
        deletes: Vec<AnimeId>,
    ) -> Self {
        Self {
            inserts,
            updates,
            deletes,
        }
    }

    pub fn inserts(&self) -> &[HashedRecord] {
        &self.inserts
    }

    pub fn updates(&self) -> &[(AnimeId, HashedRecord)] {
        &self.updates
    }

    pub fn deletes(&self) -> &[AnimeId] {
        &self.deletes
    }

    pub fn total_changes(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

impl std::fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} inserts, {} updates, {} deletes",
            self.inserts.len(),
            self.updates.len(),
            self.deletes.len()
        )
    }
}
