//! Product business logic - Handles all product-related operations.
//!
//! This module provides functions for creating, retrieving and deleting catalogue products.
//! Deleting a product leaves any order lines that reference it untouched; such lines simply
//! stop appearing when orders are read back.

use super::ids::{IdKind, IdScheme, next_identifier};
use super::search;
use crate::{
    entities::{Product, Validate, parse_number, product},
    errors::Result,
};
use sea_orm::{ConnectionTrait, IntoActiveModel, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// A price as it arrives from a form or a JSON file: a number or numeric text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    /// Already numeric
    Number(f64),
    /// Text still to be coerced
    Text(String),
}

impl PriceInput {
    /// Coerces the price into a number.
    ///
    /// # Errors
    /// Returns `Error::InvalidNumber` if the text is not a number.
    pub fn to_number(&self) -> Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(text) => parse_number("price", text),
        }
    }
}

/// Product fields without an identifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductDraft {
    /// Product name
    pub name: String,
    /// Unit price
    pub price: PriceInput,
}

impl ProductDraft {
    /// Builds a draft from form text.
    #[must_use]
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: PriceInput::Text(price.into()),
        }
    }

    /// Attaches an identifier, coercing the price.
    ///
    /// # Errors
    /// Returns `Error::InvalidNumber` if the price is not a number.
    pub fn into_model(self, id: String) -> Result<product::Model> {
        Ok(product::Model {
            id,
            price: self.price.to_number()?,
            name: self.name,
        })
    }
}

/// Inserts a product row exactly as given.
///
/// # Errors
/// Returns `Error::Duplicate` if the identifier is already taken.
#[instrument(skip(conn, product), fields(id = %product.id))]
pub async fn add_product<C: ConnectionTrait>(conn: &C, product: &product::Model) -> Result<()> {
    Product::insert(product.clone().into_active_model())
        .exec_without_returning(conn)
        .await?;
    info!(
        "Added product '{}' ({}) with price {}",
        product.name, product.id, product.price
    );
    Ok(())
}

/// Validates a draft, assigns the next product identifier and stores it.
///
/// # Errors
/// Returns a validation error for an empty name or a non-positive or malformed price.
pub async fn create_product(
    db: &DatabaseConnection,
    ids: &IdScheme,
    draft: ProductDraft,
) -> Result<product::Model> {
    let mut product = draft.into_model(String::new())?;
    product.validate_all()?;

    let txn = db.begin().await?;
    product.id = next_identifier(&txn, ids, IdKind::Product).await?;
    add_product(&txn, &product).await?;
    txn.commit().await?;
    Ok(product)
}

/// Lists products in storage order, optionally keeping only those whose name or
/// identifier contains `filter`, ignoring case.
pub async fn get_products(
    db: &DatabaseConnection,
    filter: Option<&str>,
) -> Result<Vec<product::Model>> {
    let products = Product::find().all(db).await?;
    let Some(needle) = search::normalize(filter) else {
        return Ok(products);
    };

    let matched: Vec<product::Model> = products
        .into_iter()
        .filter(|p| search::matches_any(&needle, &[&p.name, &p.id]))
        .collect();
    debug!("Product search '{}' matched {} rows", needle, matched.len());
    Ok(matched)
}

/// Retrieves a product by identifier.
pub async fn get_product(db: &DatabaseConnection, id: &str) -> Result<Option<product::Model>> {
    Product::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Deletes a product by identifier and returns the number of rows removed.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, id: &str) -> Result<u64> {
    let result = Product::delete_by_id(id).exec(db).await?;
    info!("Deleted product '{}', rows affected: {}", id, result.rows_affected);
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::{Error, ErrorKind};
    use crate::test_utils::{sample_product, setup_test_db};

    #[tokio::test]
    async fn test_add_and_get_product() -> Result<()> {
        let db = setup_test_db().await?;
        let phone = sample_product("PRD001", "Телефон", 25000.0);
        add_product(&db, &phone).await?;

        assert_eq!(get_product(&db, "PRD001").await?, Some(phone));
        assert_eq!(get_product(&db, "PRD002").await?, None);

        let duplicate = add_product(&db, &sample_product("PRD001", "Другой", 1.0)).await;
        assert!(matches!(duplicate.unwrap_err(), Error::Duplicate { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_by_name_or_id() -> Result<()> {
        let db = setup_test_db().await?;
        add_product(&db, &sample_product("PRD001", "Телефон", 25000.0)).await?;
        add_product(&db, &sample_product("PRD002", "Чехол для телефона", 900.0)).await?;
        add_product(&db, &sample_product("PRD003", "Coffee", 4.5)).await?;

        let phones = get_products(&db, Some("ТЕЛЕФОН")).await?;
        assert_eq!(phones.len(), 2);

        let by_id = get_products(&db, Some("prd003")).await?;
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].name, "Coffee");

        assert_eq!(get_products(&db, None).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_coerces_and_validates() -> Result<()> {
        let db = setup_test_db().await?;
        let ids = IdScheme::default();

        let product = create_product(&db, &ids, ProductDraft::new("Кофе", "4.50")).await?;
        assert_eq!(product.id, "PRD001");
        assert_eq!(product.price, 4.5);

        let malformed = create_product(&db, &ids, ProductDraft::new("Чай", "дёшево")).await;
        assert!(matches!(
            malformed.unwrap_err(),
            Error::InvalidNumber { field: "price", .. }
        ));

        let free = create_product(&db, &ids, ProductDraft::new("Воздух", "0")).await;
        assert_eq!(free.unwrap_err().kind(), ErrorKind::Validation);

        assert_eq!(get_products(&db, None).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product() -> Result<()> {
        let db = setup_test_db().await?;
        add_product(&db, &sample_product("PRD001", "Телефон", 25000.0)).await?;

        assert_eq!(delete_product(&db, "PRD001").await?, 1);
        assert_eq!(delete_product(&db, "PRD001").await?, 0);
        assert!(get_product(&db, "PRD001").await?.is_none());
        Ok(())
    }

    #[test]
    fn test_price_input_from_json() {
        let number: ProductDraft = serde_json::from_str(r#"{"name": "A", "price": 12.5}"#).unwrap();
        assert_eq!(number.price.to_number().unwrap(), 12.5);

        let text: ProductDraft = serde_json::from_str(r#"{"name": "A", "price": "7"}"#).unwrap();
        assert_eq!(text.price.to_number().unwrap(), 7.0);
    }
}
