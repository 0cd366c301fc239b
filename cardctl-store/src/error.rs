//! Structured error types for cardctl-store.
//!
//! Every store operation returns `Result<T, StoreError>`. Failures are
//! classified at the store boundary so a caller can tell "no such card"
//! apart from "cannot reach the database" without inspecting messages.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CardId, ValidationError};

/// SQLSTATE raised by `CREATE TABLE` when the relation already exists
const DUPLICATE_TABLE: &str = "42P07";

/// SQLSTATE raised when the server is shutting the session down
const ADMIN_SHUTDOWN: &str = "57P01";

/// SQLSTATE raised when `statement_timeout` cancels a statement
const QUERY_CANCELED: &str = "57014";

/// Why a read or write did not complete
#[derive(Debug)]
pub enum FailureCause {
    /// The statement reached the database and was rejected
    Database(sqlx::Error),
    /// The statement did not finish within the configured bound
    TimedOut(Duration),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(err) => write!(f, "database error: {}", err),
            Self::TimedOut(limit) => write!(f, "timed out after {}ms", limit.as_millis()),
        }
    }
}

impl FailureCause {
    /// True for the client bound and for a server-side `statement_timeout`
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::TimedOut(_) => true,
            Self::Database(err) => sqlstate(err).as_deref() == Some(QUERY_CANCELED),
        }
    }
}

impl std::error::Error for FailureCause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            Self::TimedOut(_) => None,
        }
    }
}

/// Main error type for card store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No session could be established, or the session was lost
    #[error("cannot reach card database: {source}")]
    Connection {
        #[source]
        source: sqlx::Error,
    },

    /// Table creation conflict or a live schema that does not match
    #[error("schema error on table '{table}': {reason}")]
    Schema { table: &'static str, reason: String },

    /// A query failed
    #[error("{op} failed: {cause}")]
    Read {
        op: &'static str,
        #[source]
        cause: FailureCause,
    },

    /// An insert or update failed; nothing was applied
    #[error("{op} failed: {cause}")]
    Write {
        op: &'static str,
        #[source]
        cause: FailureCause,
    },

    /// The query was well-formed but no card has this id
    #[error("card {0} not found")]
    NotFound(CardId),

    /// A decrement would leave the total below zero; the total is unchanged
    #[error("card {id} has {available} copies; adjusting by {delta} would go negative")]
    InsufficientQuantity {
        id: CardId,
        available: i32,
        delta: i32,
    },

    /// Input rejected before any statement was issued
    #[error("invalid card: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for card store operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Classify a failed read. Connection-level failures win over the operation kind.
    pub(crate) fn read(op: &'static str, cause: FailureCause) -> Self {
        match cause {
            FailureCause::Database(err) if is_connection_error(&err) => {
                Self::Connection { source: err }
            }
            cause => Self::Read { op, cause },
        }
    }

    /// Classify a failed write.
    pub(crate) fn write(op: &'static str, cause: FailureCause) -> Self {
        match cause {
            FailureCause::Database(err) if is_connection_error(&err) => {
                Self::Connection { source: err }
            }
            cause => Self::Write { op, cause },
        }
    }

    /// Classify a failed `CREATE TABLE` or schema probe.
    pub(crate) fn schema(table: &'static str, cause: FailureCause) -> Self {
        match cause {
            FailureCause::Database(err) if is_connection_error(&err) => {
                Self::Connection { source: err }
            }
            FailureCause::Database(err) if sqlstate(&err).as_deref() == Some(DUPLICATE_TABLE) => {
                Self::Schema {
                    table,
                    reason: "table already exists".to_string(),
                }
            }
            cause => Self::Schema {
                table,
                reason: cause.to_string(),
            },
        }
    }

    /// True when the database could not be reached at all
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// True when the store answered but had no matching card
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True when the failure was a bounded call running out of time.
    /// The statement was cancelled; a timed-out write was not applied.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Read { cause, .. } | Self::Write { cause, .. } => cause.is_timeout(),
            _ => false,
        }
    }
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Errors that mean the session is unusable, not that the statement was wrong.
fn is_connection_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        // Class 08: connection exception
        sqlx::Error::Database(_) => sqlstate(err)
            .map(|code| code.starts_with("08") || code == ADMIN_SHUTDOWN)
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound(CardId::new(7));
        assert_eq!(err.to_string(), "card 7 not found");

        let err = StoreError::InsufficientQuantity {
            id: CardId::new(1),
            available: 5,
            delta: -10,
        };
        assert_eq!(
            err.to_string(),
            "card 1 has 5 copies; adjusting by -10 would go negative"
        );
    }

    #[test]
    fn pool_timeout_is_a_connection_error() {
        let err = StoreError::read("get_by_id", FailureCause::Database(sqlx::Error::PoolTimedOut));
        assert!(err.is_connection());
        assert!(!err.is_not_found());
    }

    #[test]
    fn io_failure_during_write_is_a_connection_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        let err = StoreError::write("insert", FailureCause::Database(sqlx::Error::Io(io_err)));
        assert!(err.is_connection());
    }

    #[test]
    fn statement_errors_keep_their_operation() {
        let err = StoreError::read("find_id", FailureCause::Database(sqlx::Error::RowNotFound));
        assert!(matches!(err, StoreError::Read { op: "find_id", .. }));
        assert!(err.to_string().starts_with("find_id failed"));
    }

    #[test]
    fn timeouts_are_reads_or_writes() {
        let limit = Duration::from_millis(250);

        let read = StoreError::read("get_by_name", FailureCause::TimedOut(limit));
        assert!(matches!(read, StoreError::Read { .. }));
        assert!(read.is_timeout());
        assert!(!read.is_connection());

        let write = StoreError::write("adjust_total", FailureCause::TimedOut(limit));
        assert!(matches!(write, StoreError::Write { .. }));
        assert_eq!(write.to_string(), "adjust_total failed: timed out after 250ms");
    }

    #[test]
    fn schema_error_names_the_table() {
        let err = StoreError::schema("deck", FailureCause::TimedOut(Duration::from_secs(1)));
        assert!(matches!(err, StoreError::Schema { table: "deck", .. }));
        assert!(err.to_string().contains("'deck'"));
    }

    #[test]
    fn validation_converts() {
        let err: StoreError = ValidationError::Empty { field: "card name" }.into();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(err.to_string(), "invalid card: card name cannot be empty");
    }
}
