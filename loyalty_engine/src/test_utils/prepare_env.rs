use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// Creates a fresh, migrated database at `url` and returns a handle to it.
pub async fn prepare_test_db(url: &str) -> SqliteDatabase {
    let _ = env_logger::try_init();
    if let Err(e) = Sqlite::drop_database(url).await {
        debug!("Could not drop database {url}: {e:?}");
    }
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    db
}

/// A unique throwaway database path for one test.
pub fn random_db_path() -> String {
    format!("sqlite://{}/loyalty_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}
