//! Table definitions for the card collection
//!
//! `cards` is the core table. `deck` and `location` are schema siblings:
//! created once, no behaviour of their own. None of the `CREATE TABLE`
//! statements use `IF NOT EXISTS`; creating an existing table is a
//! `StoreError::Schema`, and callers decide whether that matters.

use std::time::Duration;

use sqlx::{FromRow, PgPool};

use super::{begin_bounded, bounded, client_limit};
use crate::error::{Result, StoreError};

pub const CARDS_TABLE: &str = "cards";
pub const DECK_TABLE: &str = "deck";
pub const LOCATION_TABLE: &str = "location";

const CREATE_CARDS: &str = r#"
    CREATE TABLE cards (
        card_id SERIAL PRIMARY KEY,
        card_name VARCHAR(255) NOT NULL,
        card_foil BOOLEAN NOT NULL,
        card_proxy BOOLEAN NOT NULL,
        card_format TEXT [] NOT NULL,
        card_edition VARCHAR(255) NOT NULL,
        card_total INTEGER DEFAULT 0,
        UNIQUE (card_id)
    )
"#;

// deck_list is an array of the cards row type, so cards must exist first.
const CREATE_DECK: &str = r#"
    CREATE TABLE deck (
        deck_id SERIAL PRIMARY KEY,
        deck_name VARCHAR(255) NOT NULL,
        deck_format VARCHAR(255) NOT NULL,
        deck_list cards [],
        UNIQUE (deck_id)
    )
"#;

const CREATE_LOCATION: &str = r#"
    CREATE TABLE location (
        location_id SERIAL PRIMARY KEY,
        location_name VARCHAR(255) NOT NULL,
        UNIQUE (location_id)
    )
"#;

/// Columns the store reads by name, with the `udt_name`s each may have.
pub const CARD_COLUMNS: &[(&str, &[&str])] = &[
    ("card_id", &["int4"]),
    ("card_name", &["varchar", "text"]),
    ("card_foil", &["bool"]),
    ("card_proxy", &["bool"]),
    ("card_format", &["_text", "_varchar"]),
    ("card_edition", &["varchar", "text"]),
    ("card_total", &["int4"]),
];

/// One row of `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ColumnInfo {
    pub column_name: String,
    pub udt_name: String,
}

impl ColumnInfo {
    pub fn new(column_name: &str, udt_name: &str) -> Self {
        Self {
            column_name: column_name.to_string(),
            udt_name: udt_name.to_string(),
        }
    }
}

pub async fn create_cards_table(pool: &PgPool, limit: Duration) -> Result<()> {
    create_table(pool, limit, CARDS_TABLE, CREATE_CARDS).await
}

pub async fn create_deck_table(pool: &PgPool, limit: Duration) -> Result<()> {
    create_table(pool, limit, DECK_TABLE, CREATE_DECK).await
}

pub async fn create_location_table(pool: &PgPool, limit: Duration) -> Result<()> {
    create_table(pool, limit, LOCATION_TABLE, CREATE_LOCATION).await
}

async fn create_table(
    pool: &PgPool,
    limit: Duration,
    table: &'static str,
    statement: &'static str,
) -> Result<()> {
    bounded(client_limit(limit), async {
        let mut tx = begin_bounded(pool, limit).await?;
        sqlx::query(statement).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok::<_, sqlx::Error>(())
    })
    .await
    .map_err(|cause| StoreError::schema(table, cause))?;

    tracing::debug!(table, "table created");
    Ok(())
}

/// Compare the live `cards` columns against `CARD_COLUMNS`.
pub async fn verify_cards_table(pool: &PgPool, limit: Duration) -> Result<()> {
    let found: Vec<ColumnInfo> = bounded(
        client_limit(limit),
        sqlx::query_as(
            r#"
            SELECT column_name::text AS column_name, udt_name::text AS udt_name
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(CARDS_TABLE)
        .fetch_all(pool),
    )
    .await
    .map_err(|cause| StoreError::schema(CARDS_TABLE, cause))?;

    check_columns(&found).map_err(|problems| StoreError::Schema {
        table: CARDS_TABLE,
        reason: problems.join("; "),
    })
}

/// Check live columns against `CARD_COLUMNS`.
///
/// Extra columns are allowed; missing or retyped ones are reported.
pub fn check_columns(found: &[ColumnInfo]) -> std::result::Result<(), Vec<String>> {
    if found.is_empty() {
        return Err(vec!["table does not exist".to_string()]);
    }

    let problems: Vec<String> = CARD_COLUMNS
        .iter()
        .filter_map(|(name, accepted)| {
            match found.iter().find(|col| col.column_name == *name) {
                None => Some(format!("missing column {}", name)),
                Some(col) if !accepted.contains(&col.udt_name.as_str()) => Some(format!(
                    "column {} has type {}, expected one of {}",
                    name,
                    col.udt_name,
                    accepted.join("/")
                )),
                Some(_) => None,
            }
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> Vec<ColumnInfo> {
        vec![
            ColumnInfo::new("card_id", "int4"),
            ColumnInfo::new("card_name", "varchar"),
            ColumnInfo::new("card_foil", "bool"),
            ColumnInfo::new("card_proxy", "bool"),
            ColumnInfo::new("card_format", "_text"),
            ColumnInfo::new("card_edition", "varchar"),
            ColumnInfo::new("card_total", "int4"),
        ]
    }

    #[test]
    fn declared_schema_passes() {
        assert!(check_columns(&declared()).is_ok());
    }

    #[test]
    fn column_order_does_not_matter() {
        let mut columns = declared();
        columns.reverse();
        assert!(check_columns(&columns).is_ok());
    }

    #[test]
    fn extra_columns_are_allowed() {
        let mut columns = declared();
        columns.push(ColumnInfo::new("card_notes", "text"));
        assert!(check_columns(&columns).is_ok());
    }

    #[test]
    fn missing_table() {
        let problems = check_columns(&[]).unwrap_err();
        assert_eq!(problems, vec!["table does not exist".to_string()]);
    }

    #[test]
    fn reports_missing_and_retyped_columns() {
        let columns: Vec<ColumnInfo> = declared()
            .into_iter()
            .filter(|col| col.column_name != "card_proxy")
            .map(|col| {
                if col.column_name == "card_total" {
                    ColumnInfo::new("card_total", "int8")
                } else {
                    col
                }
            })
            .collect();

        let problems = check_columns(&columns).unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems.contains(&"missing column card_proxy".to_string()));
        assert!(problems[1].starts_with("column card_total has type int8"));
    }
}
