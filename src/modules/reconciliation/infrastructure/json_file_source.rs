/// RecordSource adapter over a collector's JSON dump
///
/// The file holds one JSON array of flat records. Duplicates keep their first
/// occurrence: by primary id when present, otherwise by title.
use crate::modules::anime::domain::AnimeRecord;
use crate::modules::reconciliation::application::ports::RecordSource;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("json file {}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a dump already held in memory
    pub fn parse(contents: &str) -> AppResult<Vec<AnimeRecord>> {
        let document: JsonValue = serde_json::from_str(contents)
            .map_err(|e| AppError::SourceError(format!("Malformed record dump: {}", e)))?;

        let entries = document.as_array().ok_or_else(|| {
            AppError::SourceError("Record dump must be a JSON array".to_string())
        })?;

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let record = AnimeRecord::from_flat_json(entry).map_err(|e| match e {
                AppError::ValidationError(msg) => {
                    AppError::ValidationError(format!("Record #{}: {}", index, msg))
                }
                other => other,
            })?;
            records.push(record);
        }

        Ok(Self::dedupe(records))
    }

    fn dedupe(records: Vec<AnimeRecord>) -> Vec<AnimeRecord> {
        let mut seen_primary = HashSet::new();
        let mut seen_titles = HashSet::new();
        let total = records.len();

        let unique: Vec<AnimeRecord> = records
            .into_iter()
            .filter(|record| match record.primary_id() {
                Some(id) => seen_primary.insert(id),
                None => seen_titles.insert(record.title.clone()),
            })
            .collect();

        if unique.len() != total {
            log_warn!("Dropped {} duplicate anime records", total - unique.len());
        }
        unique
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> AppResult<Vec<AnimeRecord>> {
        let path = self.path();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::SourceError(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let records = Self::parse(&contents)?;
        log_info!("Loaded {} anime records from {}", records.len(), path.display());
        Ok(records)
    }
}
