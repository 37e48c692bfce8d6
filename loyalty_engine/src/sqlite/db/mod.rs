pub(crate) mod balances;
pub(crate) mod orders;
pub(crate) mod users;

use std::env;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty.db";

/// The database URL from `DATABASE_URL`, or the default local path.
pub fn db_url() -> String {
    env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new().max_connections(max_connections).connect(url).await
}
