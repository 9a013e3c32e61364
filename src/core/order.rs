//! Order business logic - Handles storing, reading and deleting orders with their lines.
//!
//! An order is written as one header row plus one row per line item inside a single
//! transaction, so a partially stored order is never visible. Reads join every line with
//! its product, which means lines pointing at deleted products are left out.

use super::search;
use crate::{
    entities::{OrderItem, Product, Validate, order, order_item},
    errors::Result,
};
use sea_orm::{ConnectionTrait, IntoActiveModel, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// One product line of an order being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Ordered product
    pub product_id: String,
    /// Number of units
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

impl LineItem {
    /// A line for a single unit of `product_id`.
    #[must_use]
    pub fn new(product_id: impl Into<String>) -> Self {
        Self::with_quantity(product_id, default_quantity())
    }

    /// A line for `quantity` units of `product_id`.
    #[must_use]
    pub fn with_quantity(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// An order header together with the lines to store with it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Header row
    pub order: order::Model,
    /// Lines in the order they were added
    pub items: Vec<LineItem>,
}

impl Validate for NewOrder {
    fn validate_all(&self) -> Result<()> {
        self.order.validate_all()
    }
}

/// A stored order line joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemDetail {
    /// Product identifier
    pub product_id: String,
    /// Current product name
    pub product_name: String,
    /// Current product price
    pub product_price: f64,
    /// Number of units
    pub quantity: i64,
}

impl OrderItemDetail {
    /// Current price times quantity.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn line_total(&self) -> f64 {
        self.product_price * self.quantity as f64
    }
}

/// A stored order with its lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithItems {
    /// Header row
    pub order: order::Model,
    /// Lines whose product still exists
    pub items: Vec<OrderItemDetail>,
}

/// Stores an order header and all of its lines atomically.
///
/// The client and products are not checked for existence.
///
/// # Errors
/// Returns `Error::Duplicate` if the order identifier is taken or a product appears on two
/// lines; nothing is stored in that case.
#[instrument(skip(db, new_order), fields(id = %new_order.order.id))]
pub async fn add_order(db: &DatabaseConnection, new_order: &NewOrder) -> Result<()> {
    let txn = db.begin().await?;
    insert_order(&txn, new_order).await?;
    txn.commit().await?;
    Ok(())
}

/// Inserts header and lines on an open connection or transaction.
pub(crate) async fn insert_order<C: ConnectionTrait>(conn: &C, new_order: &NewOrder) -> Result<()> {
    let header = &new_order.order;
    crate::entities::Order::insert(header.clone().into_active_model())
        .exec_without_returning(conn)
        .await?;

    for item in &new_order.items {
        let line = order_item::ActiveModel {
            order_id: Set(header.id.clone()),
            product_id: Set(item.product_id.clone()),
            quantity: Set(item.quantity),
        };
        OrderItem::insert(line).exec_without_returning(conn).await?;
    }

    info!(
        "Stored order {} for client {} with {} lines, total {}",
        header.id,
        header.client_id,
        new_order.items.len(),
        header.total_amount
    );
    Ok(())
}

/// Lists orders in storage order with their lines.
///
/// With a `filter`, an order is kept when the term occurs, ignoring case, in its client's
/// name, its identifier, its date or its amount; orders whose client no longer exists
/// cannot match.
pub async fn get_orders(db: &DatabaseConnection, filter: Option<&str>) -> Result<Vec<OrderWithItems>> {
    let mut orders = crate::entities::Order::find().all(db).await?;

    if let Some(needle) = search::normalize(filter) {
        let client_names: HashMap<String, String> = crate::entities::Client::find()
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        orders.retain(|o| {
            client_names.get(&o.client_id).is_some_and(|client_name| {
                search::matches_any(
                    &needle,
                    &[
                        client_name,
                        &o.id,
                        &o.order_date,
                        &search::amount_text(o.total_amount),
                    ],
                )
            })
        });
        debug!("Order search '{}' matched {} rows", needle, orders.len());
    }

    let mut items_by_order = load_items(db, None).await?;
    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect())
}

/// Lines of one order joined with their products; empty for an unknown order.
pub async fn get_order_items(db: &DatabaseConnection, order_id: &str) -> Result<Vec<OrderItemDetail>> {
    Ok(load_items(db, Some(order_id))
        .await?
        .remove(order_id)
        .unwrap_or_default())
}

async fn load_items(
    db: &DatabaseConnection,
    order_id: Option<&str>,
) -> Result<HashMap<String, Vec<OrderItemDetail>>> {
    let mut query = OrderItem::find();
    if let Some(id) = order_id {
        query = query.filter(order_item::Column::OrderId.eq(id));
    }
    let rows = query
        .find_also_related(Product)
        .all(db)
        .await?;

    let mut grouped: HashMap<String, Vec<OrderItemDetail>> = HashMap::new();
    for (line, product) in rows {
        let Some(product) = product else {
            continue;
        };
        grouped.entry(line.order_id).or_default().push(OrderItemDetail {
            product_id: product.id,
            product_name: product.name,
            product_price: product.price,
            quantity: line.quantity,
        });
    }
    Ok(grouped)
}

/// Deletes an order's lines and then the order itself, in one transaction.
///
/// Returns the number of order rows removed; an unknown identifier removes nothing.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, id: &str) -> Result<u64> {
    let txn = db.begin().await?;
    let lines = OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(id))
        .exec(&txn)
        .await?;
    let header = crate::entities::Order::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted order '{}' ({} lines), rows affected: {}",
        id, lines.rows_affected, header.rows_affected
    );
    Ok(header.rows_affected)
}
