//! Card models with validation at construction
//!
//! Caller input is validated when creating `NewCard` and `CardIdentity`.
//! Invalid input returns ValidationError, not panic.

pub mod card;
pub mod validation;

pub use card::{Card, CardId, CardIdentity, CardName, NewCard, MAX_TEXT_LEN};
pub use validation::ValidationError;
