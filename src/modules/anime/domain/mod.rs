pub mod platform;
pub mod record;
pub mod snapshot;

pub use platform::{IdKind, Platform};
pub use record::{AnimeId, AnimeRecord, ExternalId, HashedRecord};
pub use snapshot::{ManualMapping, PersistedAnime, SnapshotRow};
