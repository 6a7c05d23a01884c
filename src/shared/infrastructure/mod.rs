/// Shared infrastructure concerns
///
/// Connection pooling, configuration and migrations used by every module.
pub mod database;

// Re-exports for convenience
pub use database::{Database, DatabaseConfig, DbConnection, DbPool};
