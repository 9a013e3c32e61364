//! Report generation business logic.
//!
//! This module provides the aggregate read queries behind the charts: top clients by
//! number of orders, order count and sum per date, and clients linked by a shared city.
//! All functions are read-only and return structured rows that a front end can plot.

use crate::{entities::Client, errors::Result};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, Statement, Value,
};
use serde::Serialize;
use tracing::debug;

/// Number of clients returned by [`top_clients`] when no limit is configured.
pub const DEFAULT_TOP_CLIENTS: u64 = 5;

/// One row of the top-clients report.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct ClientOrderCount {
    /// Client identifier
    pub client_id: String,
    /// Client name
    pub client_name: String,
    /// Number of orders placed by the client
    pub order_count: i64,
}

/// Orders placed under one `order_date` value.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct DailyOrders {
    /// The stored date string, compared as text
    pub order_date: String,
    /// Number of orders with this date
    pub order_count: i64,
    /// Sum of their totals
    pub total_amount: f64,
}

/// Two clients living in the same city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientLink {
    /// Client stored first
    pub first: String,
    /// Client stored later
    pub second: String,
    /// The shared city
    pub city: String,
}

/// Clients with the most orders, most first, at most `limit` rows.
///
/// Equal counts are ordered by client identifier ascending. Clients without orders and
/// orders whose client no longer exists are not counted.
pub async fn top_clients(db: &DatabaseConnection, limit: u64) -> Result<Vec<ClientOrderCount>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = ClientOrderCount::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        "SELECT c.id AS client_id, c.name AS client_name, COUNT(o.id) AS order_count
         FROM clients c
         JOIN orders o ON c.id = o.client_id
         GROUP BY c.id, c.name
         ORDER BY order_count DESC, c.id ASC
         LIMIT ?",
        [Value::from(limit)],
    ))
    .all(db)
    .await?;
    debug!("Top clients report returned {} rows", rows.len());
    Ok(rows)
}

/// Order count and total per distinct `order_date`, in ascending text order.
///
/// Dates are grouped as stored: two timestamps on the same day but at different times are
/// separate rows.
pub async fn orders_dynamics(db: &DatabaseConnection) -> Result<Vec<DailyOrders>> {
    let rows = DailyOrders::find_by_statement(Statement::from_string(
        db.get_database_backend(),
        "SELECT order_date, COUNT(id) AS order_count, SUM(total_amount) AS total_amount
         FROM orders
         GROUP BY order_date
         ORDER BY order_date",
    ))
    .all(db)
    .await?;
    debug!("Orders dynamics report returned {} dates", rows.len());
    Ok(rows)
}

/// Every pair of clients sharing a city, cities in order of first appearance.
pub async fn city_connections(db: &DatabaseConnection) -> Result<Vec<ClientLink>> {
    let clients = Client::find().all(db).await?;

    let mut cities: Vec<(String, Vec<String>)> = Vec::new();
    for client in clients {
        match cities.iter_mut().find(|(city, _)| *city == client.city) {
            Some((_, members)) => members.push(client.id),
            None => cities.push((client.city, vec![client.id])),
        }
    }

    let mut links = Vec::new();
    for (city, members) in &cities {
        for (i, first) in members.iter().enumerate() {
            for second in members.iter().skip(i + 1) {
                links.push(ClientLink {
                    first: first.clone(),
                    second: second.clone(),
                    city: city.clone(),
                });
            }
        }
    }
    Ok(links)
}
