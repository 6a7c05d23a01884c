/// Cross-reference store
///
/// Ports used by the reconciliation engine and the Diesel/PostgreSQL adapter
/// that implements them.
pub mod infrastructure;
pub mod ports;

pub use infrastructure::PgAnimeStore;
pub use ports::{AnimeStore, CatalogQueries, StoreTransaction, BATCH_SIZE};
