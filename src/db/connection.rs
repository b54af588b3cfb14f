// SQLite connection pool setup: creates the database file (and its directory)
// on first start, enables WAL and brings the schema up to date.

use crate::db::migration;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};
use std::path::Path;
use tracing::info;

pub async fn establish_connection(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(dir) = database_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }

    // Create database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
        info!("Created database {}", database_url);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

    migration::run_migrations(&pool).await?;

    Ok(pool)
}

/// Parent directory of a file-backed SQLite URL, if it has one.
fn database_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite:")?
        .trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}
