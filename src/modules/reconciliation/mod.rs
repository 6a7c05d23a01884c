/// Reconciliation module
///
/// Full-refresh synchronization of the cross-reference store:
/// - Domain: changeset and change detection
/// - Application: transactional bulk applier, record source port, run service
/// - Infrastructure: JSON dump record source
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    ApplySummary, BulkApplier, ChangeCounts, RecordSource, ReconciliationReport,
    ReconciliationService, ID_LOOKUP_BATCH_SIZE,
};
pub use domain::{ChangeDetector, ChangeSet};
pub use infrastructure::JsonFileSource;
