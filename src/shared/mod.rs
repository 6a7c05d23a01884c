// Shared kernel: errors, infrastructure and logging used across modules

pub mod errors;
pub mod infrastructure;
pub mod utils;

// Re-exports for convenience
pub use infrastructure::database::{Database, DatabaseConfig};
