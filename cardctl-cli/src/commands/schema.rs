//! Schema commands
//!
//! Commands: init, verify

use cardctl_store::CardStore;
use tracing::{info, warn};

use crate::error::AppError;

/// Create the cards, deck and location tables.
///
/// A table that cannot be created is logged and skipped. The command
/// succeeds as long as a usable cards table exists afterwards.
pub async fn run_init(store: &CardStore) -> Result<(), AppError> {
    for (table, outcome) in store.initialize_all().await {
        match outcome {
            Ok(()) => info!(table, "table created"),
            Err(err) if err.is_connection() => return Err(err.into()),
            Err(err) => warn!(table, error = %err, "table not created"),
        }
    }

    store.verify_schema().await?;
    println!("Schema ready");
    Ok(())
}

/// Check the live cards table against the columns cardctl reads.
pub async fn run_verify(store: &CardStore) -> Result<(), AppError> {
    store.verify_schema().await?;
    println!("cards table OK");
    Ok(())
}
