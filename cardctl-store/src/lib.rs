//! cardctl-store: persistence for a trading card collection
//!
//! Owns the `cards` table in PostgreSQL and the operations a card-inventory
//! consumer needs: insert, lookup by identity triple, by id, by name, and
//! atomic total-quantity adjustment. Deck and location tables are created
//! here too but carry no logic.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::StoreConfig;
pub use db::CardStore;
pub use error::{FailureCause, Result, StoreError};
pub use models::{Card, CardId, CardIdentity, CardName, NewCard, ValidationError};
