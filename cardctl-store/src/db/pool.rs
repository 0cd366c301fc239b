//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits and an acquire bound,
//! so a stalled server cannot block a caller indefinitely.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::StoreConfig;

/// Create a PostgreSQL connection pool.
///
/// Opens one session up front, so an unreachable server fails here
/// rather than on the first query.
///
/// # Errors
///
/// Returns an error if no session can be established within
/// `connect_timeout`.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&StoreConfig::default()).await?;
/// ```
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .acquire_timeout(config.connect_timeout())
        .connect_with(config.connect_options())
        .await
}
