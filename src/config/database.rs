//! Database configuration module for `orderdesk`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the stored layout always matches the Rust models. Creation is guarded by
//! `IF NOT EXISTS`, which makes bootstrapping safe to repeat on every start.
//!
//! Foreign keys are declared by the entity relations but not enforced on the connection:
//! orders may reference clients or products that were later deleted.

use crate::entities::{Client, Order, OrderItem, Product};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info, instrument};

/// Default location of the store when neither config nor environment name one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://orderdesk.sqlite?mode=rwc";

/// Opens a connection pool to the store at `database_url`.
///
/// `max_connections` of 1 serialises every operation through one connection, which is
/// what a single local writer needs and what an in-memory database requires.
///
/// # Errors
/// Returns an error if the database file cannot be opened.
#[instrument]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection> {
    debug!("Opening database connection to: {}", database_url);
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(max_connections.max(1))
        .sqlx_logging(false);
    options.map_sqlx_sqlite_opts(|sqlite| sqlite.foreign_keys(false));

    Ok(Database::connect(options).await?)
}

/// Creates all four tables if they are missing.
///
/// Running it against an already bootstrapped store changes nothing.
///
/// # Errors
/// Returns an error if any `CREATE TABLE` statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Client).await?;
    create_table(db, Product).await?;
    create_table(db, Order).await?;
    create_table(db, OrderItem).await?;
    info!("Database tables ensured (clients, products, orders, order_items).");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Connects to the store and bootstraps the schema in one step.
///
/// # Errors
/// Returns an error if connecting or creating tables fails.
pub async fn init_database(database_url: &str, max_connections: u32) -> Result<DatabaseConnection> {
    let db = connect(database_url, max_connections).await?;
    create_tables(&db).await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ClientModel, OrderItemModel, OrderModel, ProductModel};
    use sea_orm::{EntityTrait, QuerySelect, Statement};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = connect("sqlite::memory:", 1).await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ClientModel> = Client::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _: Vec<OrderItemModel> = OrderItem::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = connect("sqlite::memory:", 1).await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let rows = db
            .query_all(Statement::from_string(
                db.get_database_backend(),
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            ))
            .await?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row.try_get::<String>("", "name")?);
        }
        assert_eq!(names, vec!["clients", "order_items", "orders", "products"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_init_database_on_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("store.sqlite").display());

        let db = init_database(&url, 1).await?;
        let _: Vec<ClientModel> = Client::find().all(&db).await?;
        drop(db);

        // Reopening an existing store keeps working
        let db = init_database(&url, 1).await?;
        let _: Vec<ClientModel> = Client::find().all(&db).await?;
        Ok(())
    }
}
