//! The running "current order" a user assembles before checking out.
//!
//! A cart only holds product identifiers and quantities. Prices are looked up when the
//! total is computed, so the total always reflects the catalogue at checkout time.

use super::ids::{IdKind, IdScheme, next_identifier};
use super::order::{LineItem, NewOrder, insert_order};
use crate::{
    entities::{Product, Validate, order},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::info;

/// Timestamp format used for `orders.order_date`.
pub const ORDER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time formatted for a new order.
#[must_use]
pub fn current_timestamp() -> String {
    chrono::Local::now().format(ORDER_DATE_FORMAT).to_string()
}

/// Line items accumulated for an order that has not been placed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCart {
    items: Vec<LineItem>,
}

impl OrderCart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of a product that must exist in the catalogue.
    ///
    /// A product already in the cart gets its quantity increased instead of a second line.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the product does not exist, and `Error::InvalidNumber`
    /// if the merged quantity would overflow.
    pub async fn add_item(
        &mut self,
        db: &DatabaseConnection,
        product_id: &str,
        quantity: i64,
    ) -> Result<()> {
        if Product::find_by_id(product_id).one(db).await?.is_none() {
            return Err(Error::NotFound {
                entity: "product",
                id: product_id.to_string(),
            });
        }
        self.push(product_id, quantity)
    }

    fn push(&mut self, product_id: &str, quantity: i64) -> Result<()> {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(line) => {
                let Some(merged) = line.quantity.checked_add(quantity) else {
                    return Err(Error::InvalidNumber {
                        field: "quantity",
                        value: format!("{} + {quantity}", line.quantity),
                    });
                };
                line.quantity = merged;
            }
            None => self
                .items
                .push(LineItem::with_quantity(product_id, quantity)),
        }
        Ok(())
    }

    /// Drops the line for `product_id`; returns whether one was present.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// True when nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of current price times quantity; lines whose product vanished count as zero.
    pub async fn total<C: ConnectionTrait>(&self, conn: &C) -> Result<f64> {
        let prices: HashMap<String, f64> = Product::find()
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p.price))
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let total = self
            .items
            .iter()
            .filter_map(|line| prices.get(&line.product_id).map(|price| price * line.quantity as f64))
            .sum();
        Ok(total)
    }
}

/// Turns the cart into a stored order for `client_id` and empties it.
///
/// The identifier, total and rows are all produced on one transaction. The client is not
/// checked for existence.
///
/// # Errors
/// Returns a validation error for an empty cart, an empty client id or an empty date, and
/// a store error if writing fails; the cart is left untouched on error.
pub async fn place_order(
    db: &DatabaseConnection,
    ids: &IdScheme,
    client_id: &str,
    order_date: String,
    cart: &mut OrderCart,
) -> Result<NewOrder> {
    if cart.is_empty() {
        return Err(Error::validation("items", "order has no items"));
    }

    let txn = db.begin().await?;
    let new_order = NewOrder {
        order: order::Model {
            id: next_identifier(&txn, ids, IdKind::Order).await?,
            client_id: client_id.to_string(),
            total_amount: cart.total(&txn).await?,
            order_date,
        },
        items: cart.items().to_vec(),
    };
    new_order.validate_all()?;
    insert_order(&txn, &new_order).await?;
    txn.commit().await?;

    info!(
        "Placed order {} for client {} totalling {}",
        new_order.order.id, client_id, new_order.order.total_amount
    );
    cart.clear();
    Ok(new_order)
}
