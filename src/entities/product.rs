//! Product entity - Represents a catalogue item with a unit price.
//!
//! Products are referenced by order line items. Prices are read live when an order is
//! placed, so changing a price never rewrites totals of orders already stored.

use super::{Validate, parse_number, require_filled};
use crate::errors::{self, Error};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Prefix sequence identifier, e.g. `PRD001`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Name of the product (e.g., "Телефон", "Coffee")
    pub name: String,
    /// Unit price, strictly positive
    pub price: f64,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears in many order lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds a product from form input, coercing the price text into a number.
    ///
    /// # Errors
    /// Returns [`Error::InvalidNumber`] if `price` is not a number.
    pub fn from_input(
        id: impl Into<String>,
        name: impl Into<String>,
        price: &str,
    ) -> errors::Result<Self> {
        Ok(Self {
            id: id.into(),
            name: name.into(),
            price: parse_number("price", price)?,
        })
    }
}

impl Validate for Model {
    fn validate_all(&self) -> errors::Result<()> {
        require_filled("name", &self.name)?;

        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::InvalidAmount {
                field: "price",
                amount: self.price,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_from_input_coerces_price() {
        let product = Model::from_input("PRD001", "Телефон", " 25000.5 ").unwrap();
        assert_eq!(product.price, 25000.5);
        assert!(product.validate_all().is_ok());
    }

    #[test]
    fn test_from_input_rejects_text() {
        let err = Model::from_input("PRD001", "Телефон", "cheap").unwrap_err();
        assert!(matches!(err, Error::InvalidNumber { field: "price", .. }));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        for price in ["0", "-100", "NaN", "inf"] {
            let product = Model::from_input("PRD001", "Товар", price).unwrap();
            assert!(
                matches!(
                    product.validate_all().unwrap_err(),
                    Error::InvalidAmount { field: "price", .. }
                ),
                "{price} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_name_rejected() {
        let product = Model::from_input("PRD001", " ", "10").unwrap();
        assert!(matches!(
            product.validate_all().unwrap_err(),
            Error::Validation { field: "name", .. }
        ));
    }
}
