//! Database connection for the storefront.
//!
//! `PostgreSQL` holds one thing: the `tower_sessions` table where each
//! visitor's cart lines and checkout are stored. The table is created by
//! [`PostgresStore::migrate`](tower_sessions_sqlx_store::PostgresStore::migrate)
//! at startup.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
