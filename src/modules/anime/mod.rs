/// Cross-reference records
///
/// One anime title mapped to at most one identifier per supported platform,
/// plus the persisted views of those records.
pub mod domain;

pub use domain::{
    AnimeId, AnimeRecord, ExternalId, HashedRecord, IdKind, ManualMapping, PersistedAnime,
    Platform, SnapshotRow,
};
