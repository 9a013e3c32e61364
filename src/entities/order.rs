//! Order entity - Represents a placed order header.
//!
//! The client reference is a plain column: it is declared as a foreign key in the schema
//! but never checked for existence when written. Line items live in
//! [`order_item`](super::order_item).

use super::{Validate, parse_number, require_filled};
use crate::errors::{self, Error};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Prefix sequence identifier, e.g. `ORD001`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Identifier of the ordering client
    pub client_id: String,
    /// Sum of line price times quantity at the moment the order was placed
    pub total_amount: f64,
    /// Free-form timestamp, `%Y-%m-%d %H:%M:%S` when created by this crate
    pub order_date: String,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one client
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds an order header from raw input, coercing the amount text into a number.
    ///
    /// # Errors
    /// Returns [`Error::InvalidNumber`] if `total_amount` is not a number.
    pub fn from_input(
        id: impl Into<String>,
        client_id: impl Into<String>,
        total_amount: &str,
        order_date: impl Into<String>,
    ) -> errors::Result<Self> {
        Ok(Self {
            id: id.into(),
            client_id: client_id.into(),
            total_amount: parse_number("total_amount", total_amount)?,
            order_date: order_date.into(),
        })
    }
}

impl Validate for Model {
    fn validate_all(&self) -> errors::Result<()> {
        require_filled("client_id", &self.client_id)?;
        require_filled("order_date", &self.order_date)?;

        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            return Err(Error::InvalidAmount {
                field: "total_amount",
                amount: self.total_amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_zero_total_is_valid() {
        let order = Model::from_input("ORD001", "CLT001", "0", "2024-01-15").unwrap();
        assert!(order.validate_all().is_ok());
    }

    #[test]
    fn test_negative_total_rejected() {
        let order = Model::from_input("ORD001", "CLT001", "-1000", "2024-01-15").unwrap();
        assert!(matches!(
            order.validate_all().unwrap_err(),
            Error::InvalidAmount {
                field: "total_amount",
                ..
            }
        ));
    }

    #[test]
    fn test_required_fields() {
        let order = Model::from_input("ORD001", "", "10", "2024-01-15").unwrap();
        assert!(matches!(
            order.validate_all().unwrap_err(),
            Error::Validation {
                field: "client_id",
                ..
            }
        ));

        let order = Model::from_input("ORD001", "CLT001", "10", " ").unwrap();
        assert!(matches!(
            order.validate_all().unwrap_err(),
            Error::Validation {
                field: "order_date",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_amount() {
        let err = Model::from_input("ORD001", "CLT001", "ten", "2024-01-15").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidNumber {
                field: "total_amount",
                ..
            }
        ));
    }
}
