//! Card repository
//!
//! Handles card persistence with:
//! - insert returning the store-assigned id
//! - lookup by identity triple (lowest id wins on duplicates), by id, by name
//! - atomic quantity adjustment that never leaves a negative total

use std::time::Duration;

use sqlx::PgPool;
use tracing::{debug, instrument};

use super::{begin_bounded, bounded, client_limit, create_pool, schema};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::models::{Card, CardId, CardIdentity, NewCard, ValidationError};

/// Card store: the single source of truth for card records and totals.
///
/// Cheap to clone; clones share one pool. Construct once and hand a clone
/// to every consumer.
#[derive(Debug, Clone)]
pub struct CardStore {
    pool: PgPool,
    timeout: Duration,
}

impl CardStore {
    /// Open a pool against the configured database.
    ///
    /// Fails with `StoreError::Connection` if no session can be established.
    #[instrument(skip_all, fields(db = %config.display_target()))]
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = create_pool(config)
            .await
            .map_err(|source| StoreError::Connection { source })?;

        debug!("card store connected");
        Ok(Self::from_pool(pool, config.statement_timeout()))
    }

    /// Wrap an existing pool.
    ///
    /// `timeout` is the server-side limit for every write, applied per
    /// transaction, so it holds even if the pool sets no `statement_timeout`.
    pub fn from_pool(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Create the `cards` table. Not idempotent: a second call fails with
    /// `StoreError::Schema`.
    pub async fn initialize_schema(&self) -> Result<()> {
        schema::create_cards_table(&self.pool, self.timeout).await
    }

    /// Create `cards`, `deck`, `location` in dependency order.
    ///
    /// Every table is attempted; the outcome of each is returned so the
    /// caller can log failures without aborting the rest.
    pub async fn initialize_all(&self) -> Vec<(&'static str, Result<()>)> {
        vec![
            (schema::CARDS_TABLE, self.initialize_schema().await),
            (
                schema::DECK_TABLE,
                schema::create_deck_table(&self.pool, self.timeout).await,
            ),
            (
                schema::LOCATION_TABLE,
                schema::create_location_table(&self.pool, self.timeout).await,
            ),
        ]
    }

    /// Check that the live `cards` table has every column this store maps.
    pub async fn verify_schema(&self) -> Result<()> {
        schema::verify_cards_table(&self.pool, self.timeout).await
    }

    /// Insert a card and return its new id.
    ///
    /// On error nothing was written.
    #[instrument(skip_all, fields(name = %card.name()))]
    pub async fn insert(&self, card: &NewCard) -> Result<CardId> {
        let id: CardId = bounded(client_limit(self.timeout), async {
            let mut tx = begin_bounded(&self.pool, self.timeout).await?;
            let id: CardId = sqlx::query_scalar(
                r#"
                INSERT INTO cards (card_name, card_foil, card_proxy, card_format, card_edition, card_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING card_id
                "#,
            )
            .bind(card.name().as_str())
            .bind(card.identity().is_foil)
            .bind(card.identity().is_proxy)
            .bind(card.formats())
            .bind(card.edition())
            .bind(card.quantity())
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(id)
        })
        .await
        .map_err(|cause| StoreError::write("insert", cause))?;

        debug!(%id, "card inserted");
        Ok(id)
    }

    /// Find the id of a card by its identity triple.
    ///
    /// The triple is not unique in the schema; when several rows share it,
    /// the lowest id is returned.
    #[instrument(skip_all, fields(name = %identity.name))]
    pub async fn find_id(&self, identity: &CardIdentity) -> Result<Option<CardId>> {
        let id: Option<CardId> = bounded(
            client_limit(self.timeout),
            sqlx::query_scalar(
                r#"
                SELECT card_id
                FROM cards
                WHERE card_name = $1 AND card_foil = $2 AND card_proxy = $3
                ORDER BY card_id
                LIMIT 1
                "#,
            )
            .bind(identity.name.as_str())
            .bind(identity.is_foil)
            .bind(identity.is_proxy)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|cause| StoreError::read("find_id", cause))?;

        debug!(found = id.is_some(), "identity lookup");
        Ok(id)
    }

    /// Get a single card by id. `StoreError::NotFound` if no row matches.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: CardId) -> Result<Card> {
        bounded(
            client_limit(self.timeout),
            sqlx::query_as::<_, Card>(
                r#"
                SELECT card_id, card_name, card_foil, card_proxy,
                       COALESCE(array_remove(card_format, NULL), '{}') AS card_format,
                       card_edition, COALESCE(card_total, 0) AS card_total
                FROM cards
                WHERE card_id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|cause| StoreError::read("get_by_id", cause))?
        .ok_or(StoreError::NotFound(id))
    }

    /// All cards with exactly this name, in ascending id order.
    ///
    /// An unknown name yields an empty vector, not an error.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Card>> {
        let cards: Vec<Card> = bounded(
            client_limit(self.timeout),
            sqlx::query_as(
                r#"
                SELECT card_id, card_name, card_foil, card_proxy,
                       COALESCE(array_remove(card_format, NULL), '{}') AS card_format,
                       card_edition, COALESCE(card_total, 0) AS card_total
                FROM cards
                WHERE card_name = $1
                ORDER BY card_id
                "#,
            )
            .bind(name)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|cause| StoreError::read("get_by_name", cause))?;

        debug!(count = cards.len(), "name lookup");
        Ok(cards)
    }

    /// Add `delta` (which may be negative) to a card's total and return the
    /// new total.
    ///
    /// The change is one conditional UPDATE evaluated by the server under
    /// its row lock, so concurrent adjustments never lose an update. A
    /// change that would leave the total below zero is refused with
    /// `StoreError::InsufficientQuantity` and the total is untouched.
    ///
    /// A timed-out adjustment was cancelled by the server and not applied.
    #[instrument(skip(self))]
    pub async fn adjust_total(&self, id: CardId, delta: i32) -> Result<i32> {
        let updated: Option<i32> = bounded(client_limit(self.timeout), async {
            let mut tx = begin_bounded(&self.pool, self.timeout).await?;
            let total: Option<i32> = sqlx::query_scalar(
                r#"
                UPDATE cards
                SET card_total = COALESCE(card_total, 0) + $2
                WHERE card_id = $1 AND COALESCE(card_total, 0) + $2 >= 0
                RETURNING card_total
                "#,
            )
            .bind(id)
            .bind(delta)
            .fetch_optional(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(total)
        })
        .await
        .map_err(|cause| StoreError::write("adjust_total", cause))?;

        if let Some(total) = updated {
            debug!(total, "total adjusted");
            return Ok(total);
        }

        // Nothing was written. Tell a missing card apart from a refused decrement.
        let available: Option<i32> = bounded(
            client_limit(self.timeout),
            sqlx::query_scalar("SELECT COALESCE(card_total, 0) FROM cards WHERE card_id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
        .map_err(|cause| StoreError::read("adjust_total", cause))?;

        match available {
            None => Err(StoreError::NotFound(id)),
            Some(available) => Err(StoreError::InsufficientQuantity {
                id,
                available,
                delta,
            }),
        }
    }

    /// Add `quantity` copies to a card's total.
    pub async fn add_total(&self, id: CardId, quantity: u32) -> Result<i32> {
        self.adjust_total(id, quantity_delta(quantity)?).await
    }

    /// Remove `quantity` copies from a card's total; refused if fewer are held.
    pub async fn sub_total(&self, id: CardId, quantity: u32) -> Result<i32> {
        self.adjust_total(id, -quantity_delta(quantity)?).await
    }

    /// Close the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("card store closed");
    }
}

fn quantity_delta(quantity: u32) -> Result<i32> {
    i32::try_from(quantity).map_err(|_| {
        StoreError::Validation(ValidationError::OutOfRange {
            field: "quantity",
            max: i64::from(i32::MAX),
        })
    })
}
