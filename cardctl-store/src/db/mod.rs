//! Database layer - connection pool, schema, and the card store
//!
//! # Design Principles
//!
//! - Connection pool, no Arc<Mutex<Connection>>
//! - Every statement bounded by a timeout; the server gives up before the client
//! - Quantity changes are single conditional UPDATEs, no read-modify-write
//! - Columns mapped by name, never by position

pub mod cards;
pub mod pool;
pub mod schema;

use std::future::Future;
use std::time::Duration;

use sqlx::{PgPool, Postgres, Transaction};

pub use cards::CardStore;
pub use pool::create_pool;

use crate::error::FailureCause;

/// Extra time the client waits beyond the server's `statement_timeout`.
/// The server cancels first; a write reported as timed out never commits.
pub const CLIENT_GRACE: Duration = Duration::from_secs(1);

/// Client-side bound for work the server limits to `server_limit`.
pub(crate) fn client_limit(server_limit: Duration) -> Duration {
    server_limit + CLIENT_GRACE
}

/// Begin a transaction whose statements the server cancels after `limit`.
///
/// `set_config(.., true)` is `SET LOCAL`: it holds for this transaction
/// only, whatever the pool's own session settings are.
pub(crate) async fn begin_bounded(
    pool: &PgPool,
    limit: Duration,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT set_config('statement_timeout', $1, true)")
        .bind(format!("{}ms", limit.as_millis()))
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Run one statement with a client-side time bound.
///
/// Dropping the statement future on timeout returns its connection to
/// the pool and rolls back any open transaction on it.
pub(crate) async fn bounded<T, F>(limit: Duration, statement: F) -> Result<T, FailureCause>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, statement).await {
        Ok(result) => result.map_err(FailureCause::Database),
        Err(_) => Err(FailureCause::TimedOut(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_passes_results_through() {
        let value = bounded(Duration::from_secs(1), async { Ok::<_, sqlx::Error>(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);

        let err = bounded(Duration::from_secs(1), async {
            Err::<(), _>(sqlx::Error::RowNotFound)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, FailureCause::Database(sqlx::Error::RowNotFound)));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_times_out_stalled_statements() {
        let limit = Duration::from_millis(500);
        let err = bounded(limit, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, FailureCause::TimedOut(d) if d == limit));
    }

    #[test]
    fn client_waits_longer_than_the_server() {
        let server = Duration::from_millis(300);
        assert!(client_limit(server) > server);
        assert_eq!(client_limit(server) - server, CLIENT_GRACE);
    }
}
