use crate::modules::anime::domain::AnimeRecord;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Port for whatever collects the full snapshot of records for one run.
///
/// Implementations return a finite list already normalized and de-duplicated;
/// the list is treated as ground truth for the run.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    async fn fetch(&self) -> AppResult<Vec<AnimeRecord>>;
}
