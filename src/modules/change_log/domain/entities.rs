/// Change log entries
///
/// One entry per applied mutation, written in the same transaction as the
/// mutation. Entries are never deleted; the processed flag flips once on ack.
use crate::modules::anime::domain::AnimeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of mutation an entry records, matching the `change_kind` database type
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::ChangeKind"]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "insert"),
            ChangeKind::Update => write!(f, "update"),
            ChangeKind::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insert" => Ok(ChangeKind::Insert),
            "update" => Ok(ChangeKind::Update),
            "delete" => Ok(ChangeKind::Delete),
            _ => Err(format!("Invalid change kind: {}", s)),
        }
    }
}

pub type ChangeLogId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub id: ChangeLogId,
    pub anime_id: AnimeId,
    pub change_type: ChangeKind,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl ChangeLogEntry {
    pub fn is_pending(&self) -> bool {
        !self.processed
    }

    /// Flip to processed; already processed entries keep their first ack time
    pub fn acknowledge(&mut self, at: DateTime<Utc>) {
        if !self.processed {
            self.processed = true;
            self.processed_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn change_kind_display_and_parse() {
        assert_eq!(ChangeKind::Insert.to_string(), "insert");
        assert_eq!(ChangeKind::Delete.to_string(), "delete");
        assert_eq!("UPDATE".parse::<ChangeKind>().unwrap(), ChangeKind::Update);
        assert!("upsert".parse::<ChangeKind>().is_err());
    }

    #[test]
    fn acknowledge_is_terminal() {
        let created = Utc::now();
        let mut entry = ChangeLogEntry {
            id: 1,
            anime_id: 42,
            change_type: ChangeKind::Insert,
            processed: false,
            created_at: created,
            processed_at: None,
        };
        assert!(entry.is_pending());

        let first = created + Duration::seconds(5);
        entry.acknowledge(first);
        entry.acknowledge(first + Duration::seconds(5));

        assert!(entry.processed);
        assert_eq!(entry.processed_at, Some(first));
    }
}
