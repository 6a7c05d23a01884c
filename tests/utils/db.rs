/// Database test utilities with singleton pattern
///
/// Provides thread-safe access to the test database with proper isolation.
/// Tests using it are `#[ignore]`d and need `TEST_DATABASE_URL`.
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, Pool};
use std::sync::{Arc, Mutex, OnceLock};
use xref_lib::shared::Database;

type PgPool = Pool<ConnectionManager<PgConnection>>;

static DATABASE: OnceLock<Arc<Database>> = OnceLock::new();

/// Get or create the singleton test database, migrated once
pub fn get_test_database() -> Arc<Database> {
    DATABASE
        .get_or_init(|| {
            dotenvy::dotenv().ok();
            let test_db_url = std::env::var("TEST_DATABASE_URL")
                .expect("TEST_DATABASE_URL must be set in .env for tests");

            let manager = ConnectionManager::<PgConnection>::new(test_db_url);
            let pool: PgPool = r2d2::Pool::builder()
                .max_size(4)
                .build(manager)
                .expect("Failed to create test database pool");

            let database = Database::from_pool(pool);
            database
                .run_migrations()
                .expect("Failed to run migrations on test database");
            Arc::new(database)
        })
        .clone()
}

/// Clean all test tables - use at the start of each test
pub fn clean_test_db() {
    let database = get_test_database();
    let mut conn = database.get_connection().expect("Failed to get DB connection");

    diesel::sql_query("TRUNCATE TABLE anime, change_log, manual_mapping RESTART IDENTITY")
        .execute(&mut conn)
        .expect("Failed to clean test tables");
}

/// Seed a curated override row
pub fn insert_manual_mapping(platform: &str, platform_id: &str, slug: Option<&str>) {
    use xref_lib::schema::manual_mapping;

    let database = get_test_database();
    let mut conn = database.get_connection().expect("Failed to get DB connection");

    diesel::insert_into(manual_mapping::table)
        .values((
            manual_mapping::platform.eq(platform),
            manual_mapping::platform_id.eq(platform_id),
            manual_mapping::platform_slug.eq(slug),
        ))
        .execute(&mut conn)
        .expect("Failed to insert manual mapping");
}

/// Global test mutex for serialization
static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Acquire test lock to ensure tests run serially
/// Returns a guard that releases the lock when dropped
pub fn acquire_test_lock() -> std::sync::MutexGuard<'static, ()> {
    // Handle poisoned mutex by recovering from panic
    match TEST_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
