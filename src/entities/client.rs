//! Client entity - Represents a customer who places orders.
//!
//! Every field is required. The email is unique across clients and must look like
//! `local@domain.tld`; the phone is 10 to 15 digits with an optional leading `+`.

use super::{Validate, require_filled};
use crate::errors::{self, Error};
use regex::Regex;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("Invalid regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("Invalid regex"));

/// Client database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Prefix sequence identifier, e.g. `CLT001`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Full name of the client
    pub name: String,
    /// Contact email, unique across clients
    #[sea_orm(unique)]
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// City used for grouping in reports
    pub city: String,
    /// Street address
    pub address: String,
}

/// Defines relationships between Client and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One client has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds a client record from raw field values.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        city: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            city: city.into(),
            address: address.into(),
        }
    }
}

impl Validate for Model {
    fn validate_all(&self) -> errors::Result<()> {
        require_filled("name", &self.name)?;
        require_filled("email", &self.email)?;
        require_filled("phone", &self.phone)?;
        require_filled("city", &self.city)?;
        require_filled("address", &self.address)?;

        if !EMAIL_RE.is_match(&self.email) {
            return Err(Error::validation("email", "expected local@domain.tld"));
        }
        if !PHONE_RE.is_match(&self.phone) {
            return Err(Error::validation(
                "phone",
                "expected 10 to 15 digits with an optional leading +",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn client(email: &str, phone: &str) -> Model {
        Model::new("CLT001", "Иван", email, phone, "Москва", "ул. Тестовая")
    }

    #[test]
    fn test_valid_client_passes() {
        assert!(client("test@mail.com", "+79161234567").validate_all().is_ok());
        assert!(client("test@mail.com", "79161234567").validate_all().is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut c = client("test@mail.com", "79161234567");
        c.city = "   ".to_string();
        let err = c.validate_all().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "city", .. }));

        let mut c = client("test@mail.com", "79161234567");
        c.name = String::new();
        assert!(matches!(
            c.validate_all().unwrap_err(),
            Error::Validation { field: "name", .. }
        ));
    }

    #[test]
    fn test_email_shape() {
        for bad in ["invalid-email", "a@b", "@b.c", "a@@b.c", "a@b.c@d"] {
            let err = client(bad, "79161234567").validate_all().unwrap_err();
            assert!(
                matches!(err, Error::Validation { field: "email", .. }),
                "{bad} should be rejected"
            );
        }
        assert!(client("first.last@sub.example.org", "79161234567")
            .validate_all()
            .is_ok());
    }

    #[test]
    fn test_phone_shape() {
        for bad in ["123456789", "1234567890123456", "+7 916 123 45 67", "++79161234567", "phone"] {
            let err = client("test@mail.com", bad).validate_all().unwrap_err();
            assert!(
                matches!(err, Error::Validation { field: "phone", .. }),
                "{bad} should be rejected"
            );
        }
        assert!(client("test@mail.com", "1234567890").validate_all().is_ok());
        assert!(client("test@mail.com", "+123456789012345").validate_all().is_ok());
    }
}
