//! Tests that span several layers: cache wrappers over mocked repositories,
//! the SQLite repositories, and the HTTP router.

mod cache_tests;
mod comment_tests;

use crate::db::migration::run_migrations;
use crate::models::Guest;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Fresh in-memory database with the schema applied.
///
/// A single long-lived connection, since every `sqlite::memory:` connection
/// is its own database.
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

pub(crate) fn stored_guest(id: i64, name: &str) -> Guest {
    Guest { id, ..Guest::new(name) }
}
