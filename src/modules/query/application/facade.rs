/// Read-only accessors used by the export step
use crate::modules::anime::domain::{PersistedAnime, Platform};
use crate::modules::change_log::application::ChangeLogWriter;
use crate::modules::change_log::domain::ChangeLogEntry;
use crate::modules::store::ports::{AnimeStore, CatalogQueries};
use crate::shared::errors::AppResult;
use crate::{log_debug, log_warn};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct QueryFacade {
    queries: Arc<dyn CatalogQueries>,
    change_log: ChangeLogWriter,
}

impl QueryFacade {
    pub fn new(queries: Arc<dyn CatalogQueries>, store: Arc<dyn AnimeStore>) -> Self {
        Self {
            queries,
            change_log: ChangeLogWriter::new(store),
        }
    }

    /// Total number of stored anime
    pub fn count(&self) -> AppResult<i64> {
        self.queries.count_anime()
    }

    /// Rows carrying an id for the named platform. Unknown names count zero.
    pub fn platform_count(&self, name: &str) -> AppResult<i64> {
        match name.parse::<Platform>() {
            Ok(platform) => self.queries.count_platform(platform),
            Err(_) => {
                log_warn!("Unknown platform '{}' requested, reporting 0", name);
                Ok(0)
            }
        }
    }

    /// Curated overrides for `platform`, keyed by external id. The slug falls
    /// back to the id itself.
    pub fn manual_mappings(&self, platform: Platform) -> AppResult<HashMap<String, String>> {
        let mappings = self.queries.manual_mappings(platform)?;
        log_debug!("Loaded {} manual mappings for {}", mappings.len(), platform);

        Ok(mappings
            .into_iter()
            .map(|mapping| {
                let slug = mapping
                    .platform_slug
                    .unwrap_or_else(|| mapping.platform_id.clone());
                (mapping.platform_id, slug)
            })
            .collect())
    }

    /// Full snapshot ordered by id
    pub fn all_records(&self) -> AppResult<Vec<PersistedAnime>> {
        self.queries.all_anime()
    }

    pub fn pending_changes(&self) -> AppResult<Vec<ChangeLogEntry>> {
        self.change_log.pending()
    }
}
