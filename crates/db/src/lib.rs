//! Persistence layer: connection pool, migrations, models and repositories.
//!
//! Cotisation lifecycle writes go through [`lifecycle::CotisationLifecycle`],
//! which wraps the table repositories in a single transaction.

use sqlx::postgres::PgPoolOptions;

pub mod lifecycle;
pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Default page size for list queries.
pub const DEFAULT_LIMIT: i64 = 100;

/// Upper bound accepted for `limit` query parameters.
pub const MAX_LIMIT: i64 = 500;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Clamp a caller-supplied page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a caller-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
