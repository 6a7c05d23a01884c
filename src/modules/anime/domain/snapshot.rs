use crate::modules::anime::domain::record::{AnimeId, AnimeRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal view of a stored row, enough for change detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub id: AnimeId,
    pub title: String,
    pub primary_id: Option<i64>,
    pub data_hash: String,
}

/// A stored row as handed to the export step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedAnime {
    pub id: AnimeId,
    pub record: AnimeRecord,
    pub data_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersistedAnime {
    pub fn snapshot_row(&self) -> SnapshotRow {
        SnapshotRow {
            id: self.id,
            title: self.record.title.clone(),
            primary_id: self.record.primary_id(),
            data_hash: self.data_hash.clone(),
        }
    }
}

/// Curated override layered on top of generated data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMapping {
    pub platform: String,
    pub platform_id: String,
    pub platform_slug: Option<String>,
}
