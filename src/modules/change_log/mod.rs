/// Change log module
///
/// Durable, append-only trail of every applied mutation:
/// - Domain: entry entity and change kind
/// - Application: writer used by the applier, plus pending/ack for consumers
pub mod application;
pub mod domain;

pub use application::ChangeLogWriter;
pub use domain::{ChangeKind, ChangeLogEntry, ChangeLogId};
