pub mod anime;
pub mod change_log;
pub mod query;
pub mod reconciliation;
pub mod store;
