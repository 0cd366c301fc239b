//! Command implementations for cardctl CLI

pub mod cards;
pub mod schema;

pub use cards::{run_card_command, CardCommand};
pub use schema::{run_init, run_verify};
