//! Card records, the identity triple, and validated insert input

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// Maximum length of `card_name` and `card_edition` (VARCHAR(255))
pub const MAX_TEXT_LEN: usize = 255;

/// Store-assigned card identifier (`card_id SERIAL`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct CardId(i32);

impl CardId {
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted card, as returned by the store.
///
/// This is a snapshot: changing it does nothing until a write operation
/// is invoked. Columns are mapped by name, so a reordered table still
/// decodes correctly. NULL format labels left by older writers are
/// dropped when the row is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Card {
    #[sqlx(rename = "card_id")]
    pub id: CardId,
    #[sqlx(rename = "card_name")]
    pub name: String,
    #[sqlx(rename = "card_foil")]
    pub is_foil: bool,
    #[sqlx(rename = "card_proxy")]
    pub is_proxy: bool,
    #[sqlx(rename = "card_format")]
    pub formats: Vec<String>,
    #[sqlx(rename = "card_edition")]
    pub edition: String,
    #[sqlx(rename = "card_total")]
    pub total_quantity: i32,
}

impl Card {
    pub fn identity(&self) -> CardIdentity {
        CardIdentity {
            name: CardName(self.name.clone()),
            is_foil: self.is_foil,
            is_proxy: self.is_proxy,
        }
    }
}

/// Validated card name: non-empty, at most 255 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardName(String);

impl CardName {
    /// Create a card name.
    ///
    /// Surrounding whitespace is kept as given; a name that is only
    /// whitespace counts as empty.
    ///
    /// # Example
    /// ```
    /// use cardctl_store::models::CardName;
    ///
    /// assert!(CardName::new("Lightning Bolt").is_ok());
    /// assert!(CardName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "card name" });
        }

        if s.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field: "card name",
                max: MAX_TEXT_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The natural (non-unique) key of a card: name, foil flag, proxy flag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardIdentity {
    pub name: CardName,
    pub is_foil: bool,
    pub is_proxy: bool,
}

impl CardIdentity {
    pub fn new(name: &str, is_foil: bool, is_proxy: bool) -> Result<Self, ValidationError> {
        Ok(Self {
            name: CardName::new(name)?,
            is_foil,
            is_proxy,
        })
    }
}

/// Input for `CardStore::insert`, validated at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub(crate) identity: CardIdentity,
    pub(crate) formats: Vec<String>,
    pub(crate) edition: String,
    pub(crate) quantity: i32,
}

impl NewCard {
    /// Build an insert request.
    ///
    /// # Rules
    /// - name: non-empty, at most 255 characters
    /// - formats: may be empty, but no label may be blank
    /// - edition: at most 255 characters
    /// - quantity: zero or more
    pub fn new(
        name: &str,
        is_foil: bool,
        is_proxy: bool,
        formats: Vec<String>,
        edition: &str,
        quantity: i32,
    ) -> Result<Self, ValidationError> {
        let identity = CardIdentity::new(name, is_foil, is_proxy)?;

        if formats.iter().any(|label| label.trim().is_empty()) {
            return Err(ValidationError::Empty {
                field: "format label",
            });
        }

        if edition.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field: "edition",
                max: MAX_TEXT_LEN,
            });
        }

        if quantity < 0 {
            return Err(ValidationError::Negative {
                field: "quantity",
                value: i64::from(quantity),
            });
        }

        Ok(Self {
            identity,
            formats,
            edition: edition.to_owned(),
            quantity,
        })
    }

    pub fn identity(&self) -> &CardIdentity {
        &self.identity
    }

    pub fn name(&self) -> &CardName {
        &self.identity.name
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn edition(&self) -> &str {
        &self.edition
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }
}
