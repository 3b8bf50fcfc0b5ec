//! Row-store layer for widget settings.
//!
//! - [`RowStore`] is the seam the rest of the workspace depends on: atomic
//!   merge-upsert, select, username lookup, and a change feed.
//! - [`PgRowStore`] implements it over PostgreSQL via sqlx, with the change
//!   feed driven by `LISTEN/NOTIFY` ([`ChangeFeedListener`]).
//! - [`MemoryRowStore`] implements the same contract in process.

use sqlx::postgres::PgPoolOptions;

pub mod listener;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod store;

pub use listener::ChangeFeedListener;
pub use memory::MemoryRowStore;
pub use store::{FeedEvent, PgRowStore, RowStore, StoreError};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
