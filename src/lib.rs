pub mod modules;
pub mod schema;
pub mod shared;

use modules::{
    query::QueryFacade,
    reconciliation::{JsonFileSource, ReconciliationReport, ReconciliationService},
    store::{AnimeStore, CatalogQueries, PgAnimeStore},
};
use shared::errors::AppResult;
use shared::utils::logger::init_logger;
use shared::{Database, DatabaseConfig};
use std::path::Path;
use std::sync::Arc;

/// Services wired over one Postgres store
pub struct Engine {
    pub database: Arc<Database>,
    pub reconciliation: ReconciliationService,
    pub queries: QueryFacade,
}

impl Engine {
    /// Build every service over an already connected database
    pub fn new(database: Arc<Database>) -> Self {
        let pg_store = Arc::new(PgAnimeStore::new(Arc::clone(&database)));

        // Same adapter behind both ports
        let store: Arc<dyn AnimeStore> = pg_store.clone();
        let catalog: Arc<dyn CatalogQueries> = pg_store;

        Self {
            database,
            reconciliation: ReconciliationService::new(Arc::clone(&store)),
            queries: QueryFacade::new(catalog, store),
        }
    }

    /// Connect with `config` and bring the schema up to date
    pub fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let database = Database::connect(config)?;
        database.run_migrations()?;
        Ok(Self::new(Arc::new(database)))
    }
}

/// Reconcile the store against the JSON dump at `path`.
///
/// Configuration comes from the environment (`.env` honoured).
pub async fn run(path: &Path) -> AppResult<ReconciliationReport> {
    dotenvy::dotenv().ok();
    init_logger();

    let config = DatabaseConfig::from_env()?;
    log_info!(
        "Connecting to {} (pool size {})",
        config.redacted_host(),
        config.pool_size
    );

    // Pool setup and migrations block
    let engine = tokio::task::spawn_blocking(move || Engine::connect(&config)).await??;

    let source = JsonFileSource::new(path);
    let report = engine.reconciliation.reconcile(&source).await?;

    let queries = engine.queries.clone();
    let total = tokio::task::spawn_blocking(move || queries.count()).await??;
    log_info!("Store now holds {} anime records", total);
    log_debug!("Pool status after run: {:?}", engine.database.pool_status());

    Ok(report)
}
