pub mod entities;

pub use entities::{ChangeKind, ChangeLogEntry, ChangeLogId};
