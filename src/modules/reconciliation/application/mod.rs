pub mod bulk_applier;
pub mod ports;
pub mod service;

pub use bulk_applier::{ApplySummary, BulkApplier, ID_LOOKUP_BATCH_SIZE};
pub use ports::RecordSource;
pub use service::{ChangeCounts, ReconciliationReport, ReconciliationService};
