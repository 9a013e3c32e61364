//! Prefix sequence identifiers such as `CLT001`, `PRD014` or `ORD120`.
//!
//! The next number is one past the highest numeric suffix already stored under the prefix.
//! Callers evaluate it on the same transaction that inserts the new row, so two writers
//! are serialised by the store instead of racing on a stale count.

use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, Statement};
use serde::Deserialize;

/// Record kinds that receive a generated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// `clients.id`
    Client,
    /// `products.id`
    Product,
    /// `orders.id`
    Order,
}

impl IdKind {
    pub(crate) const fn table(self) -> &'static str {
        match self {
            Self::Client => "clients",
            Self::Product => "products",
            Self::Order => "orders",
        }
    }
}

/// Prefixes and zero padding used to format identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdScheme {
    /// Prefix of client identifiers
    pub client_prefix: String,
    /// Prefix of product identifiers
    pub product_prefix: String,
    /// Prefix of order identifiers
    pub order_prefix: String,
    /// Minimum number of digits after the prefix
    pub width: usize,
}

impl Default for IdScheme {
    fn default() -> Self {
        Self {
            client_prefix: "CLT".to_string(),
            product_prefix: "PRD".to_string(),
            order_prefix: "ORD".to_string(),
            width: 3,
        }
    }
}

impl IdScheme {
    /// Prefix configured for `kind`.
    #[must_use]
    pub fn prefix(&self, kind: IdKind) -> &str {
        match kind {
            IdKind::Client => &self.client_prefix,
            IdKind::Product => &self.product_prefix,
            IdKind::Order => &self.order_prefix,
        }
    }

    /// Formats sequence number `n` for `kind`, e.g. `format(IdKind::Client, 7)` is `CLT007`.
    #[must_use]
    pub fn format(&self, kind: IdKind, n: u64) -> String {
        let width = self.width;
        format!("{}{n:0width$}", self.prefix(kind))
    }
}

/// Highest sequence number stored for `kind`, or 0 for an empty table.
///
/// Identifiers that do not carry the configured prefix followed by digits are ignored.
pub async fn current_sequence<C: ConnectionTrait>(
    conn: &C,
    scheme: &IdScheme,
    kind: IdKind,
) -> Result<u64> {
    let prefix = scheme.prefix(kind);
    let rows = conn
        .query_all(Statement::from_string(
            conn.get_database_backend(),
            format!("SELECT id FROM {}", kind.table()),
        ))
        .await?;

    let mut highest = 0;
    for row in rows {
        let id: String = row.try_get("", "id")?;
        if let Some(n) = id.strip_prefix(prefix).and_then(|s| s.parse::<u64>().ok()) {
            highest = highest.max(n);
        }
    }
    Ok(highest)
}

/// Identifier for the next record of `kind`.
///
/// # Errors
/// Returns `Error::SequenceExhausted` once the highest stored number is `u64::MAX`.
pub async fn next_identifier<C: ConnectionTrait>(
    conn: &C,
    scheme: &IdScheme,
    kind: IdKind,
) -> Result<String> {
    let n = current_sequence(conn, scheme, kind)
        .await?
        .checked_add(1)
        .ok_or(Error::SequenceExhausted { table: kind.table() })?;
    Ok(scheme.format(kind, n))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::client::{add_client, delete_client};
    use crate::test_utils::{sample_client, setup_test_db};

    #[test]
    fn test_format_pads_to_width() {
        let scheme = IdScheme::default();
        assert_eq!(scheme.format(IdKind::Client, 1), "CLT001");
        assert_eq!(scheme.format(IdKind::Product, 42), "PRD042");
        assert_eq!(scheme.format(IdKind::Order, 1234), "ORD1234");
    }

    #[tokio::test]
    async fn test_next_identifier_on_empty_table() -> Result<()> {
        let db = setup_test_db().await?;
        let scheme = IdScheme::default();
        assert_eq!(next_identifier(&db, &scheme, IdKind::Client).await?, "CLT001");
        assert_eq!(next_identifier(&db, &scheme, IdKind::Order).await?, "ORD001");
        Ok(())
    }

    #[tokio::test]
    async fn test_next_identifier_survives_deletion() -> Result<()> {
        let db = setup_test_db().await?;
        let scheme = IdScheme::default();
        add_client(&db, &sample_client("CLT001", "a@mail.com", "Москва")).await?;
        add_client(&db, &sample_client("CLT002", "b@mail.com", "Казань")).await?;
        delete_client(&db, "CLT001").await?;

        // A count-based id would reuse CLT002 here
        assert_eq!(next_identifier(&db, &scheme, IdKind::Client).await?, "CLT003");
        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_identifiers_ignored() -> Result<()> {
        let db = setup_test_db().await?;
        let scheme = IdScheme::default();
        add_client(&db, &sample_client("LEGACY-9", "a@mail.com", "Москва")).await?;
        add_client(&db, &sample_client("CLT004", "b@mail.com", "Москва")).await?;
        assert_eq!(current_sequence(&db, &scheme, IdKind::Client).await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_exhausted_sequence_is_an_error() -> Result<()> {
        let db = setup_test_db().await?;
        let scheme = IdScheme::default();
        add_client(
            &db,
            &sample_client("CLT18446744073709551615", "max@mail.com", "Москва"),
        )
        .await?;

        let err = next_identifier(&db, &scheme, IdKind::Client).await.unwrap_err();
        assert!(matches!(err, Error::SequenceExhausted { table: "clients" }));
        assert_eq!(next_identifier(&db, &scheme, IdKind::Product).await?, "PRD001");
        Ok(())
    }
}
