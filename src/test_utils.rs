//! Shared test utilities for `orderdesk`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    config::database,
    core::{
        client,
        order::{LineItem, NewOrder, add_order},
        product,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness; safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    database::init_database("sqlite::memory:", 1).await
}

/// A valid client named `Клиент <id>` with the given email and city.
#[must_use]
pub fn sample_client(id: &str, email: &str, city: &str) -> entities::client::Model {
    entities::client::Model::new(
        id,
        format!("Клиент {id}"),
        email,
        "+79161234567",
        city,
        "ул. Тестовая, 1",
    )
}

/// A product with the given name and price.
#[must_use]
pub fn sample_product(id: &str, name: &str, price: f64) -> entities::product::Model {
    entities::product::Model {
        id: id.to_string(),
        name: name.to_string(),
        price,
    }
}

/// An order header with lines, ready for [`add_order`].
#[must_use]
pub fn sample_order(
    id: &str,
    client_id: &str,
    total_amount: f64,
    order_date: &str,
    items: Vec<LineItem>,
) -> NewOrder {
    NewOrder {
        order: entities::order::Model {
            id: id.to_string(),
            client_id: client_id.to_string(),
            total_amount,
            order_date: order_date.to_string(),
        },
        items,
    }
}

/// Inserts `(id, email, city)` clients built by [`sample_client`].
pub async fn seed_clients(db: &DatabaseConnection, rows: &[(&str, &str, &str)]) -> Result<()> {
    for (id, email, city) in rows {
        client::add_client(db, &sample_client(id, email, city)).await?;
    }
    Ok(())
}

/// Inserts `PRD001` "Ручка" at 10.00 and `PRD002` "Блокнот" at 5.00.
pub async fn seed_catalogue(db: &DatabaseConnection) -> Result<()> {
    product::add_product(db, &sample_product("PRD001", "Ручка", 10.0)).await?;
    product::add_product(db, &sample_product("PRD002", "Блокнот", 5.0)).await?;
    Ok(())
}

/// Stores `count` empty orders for `client_id`, numbered from `first`.
pub async fn seed_orders(
    db: &DatabaseConnection,
    client_id: &str,
    first: u32,
    count: u32,
    order_date: &str,
) -> Result<()> {
    for n in first..first + count {
        let order = sample_order(&format!("ORD{n:03}"), client_id, 10.0, order_date, vec![]);
        add_order(db, &order).await?;
    }
    Ok(())
}
