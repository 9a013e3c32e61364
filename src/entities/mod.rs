//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.
//!
//! Models double as the domain records: they carry their own field rules through
//! [`Validate::validate_all`], which callers run explicitly before persisting.

pub mod client;
pub mod order;
pub mod order_item;
pub mod product;

use crate::errors::{Error, Result};

// Re-export specific types to avoid conflicts
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};

/// Field-level and cross-field rules of a record.
///
/// Validation never mutates the record and is not run on construction.
pub trait Validate {
    /// Checks every rule of the record, returning the first violation.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for empty or malformed text fields and
    /// [`Error::InvalidAmount`] for out-of-range numbers.
    fn validate_all(&self) -> Result<()>;
}

/// Fails if `value` is empty or whitespace-only.
pub(crate) fn require_filled(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Coerces user-entered text into a number.
pub(crate) fn parse_number(field: &'static str, text: &str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| Error::InvalidNumber {
        field,
        value: text.to_string(),
    })
}
