//! Client business logic - Handles all client-related operations.
//!
//! Clients are hard-deleted and nothing cascades: orders that reference a removed client
//! stay in place. All functions are async and return Result types for error handling.

use super::ids::{IdKind, IdScheme, next_identifier};
use super::search;
use crate::{
    entities::{Client, Validate, client},
    errors::Result,
};
use sea_orm::{ConnectionTrait, IntoActiveModel, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Client fields as entered in a form or read from a JSON import, without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientDraft {
    /// Full name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// City
    pub city: String,
    /// Street address
    pub address: String,
}

impl ClientDraft {
    /// Attaches an identifier, producing a storable record.
    #[must_use]
    pub fn into_model(self, id: String) -> client::Model {
        client::Model {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            city: self.city,
            address: self.address,
        }
    }
}

/// Inserts a client row exactly as given.
///
/// The record is not validated here; run [`Validate::validate_all`] first.
///
/// # Errors
/// Returns `Error::Duplicate` if the identifier or email is already taken.
#[instrument(skip(conn, client), fields(id = %client.id))]
pub async fn add_client<C: ConnectionTrait>(conn: &C, client: &client::Model) -> Result<()> {
    Client::insert(client.clone().into_active_model())
        .exec_without_returning(conn)
        .await?;
    info!("Added client '{}' ({})", client.name, client.id);
    Ok(())
}

/// Validates a draft, assigns the next client identifier and stores it.
///
/// The identifier is computed on the inserting transaction.
///
/// # Errors
/// Returns a validation error for bad input, or `Error::Duplicate` for a taken email.
pub async fn create_client(
    db: &DatabaseConnection,
    ids: &IdScheme,
    draft: ClientDraft,
) -> Result<client::Model> {
    let mut client = draft.into_model(String::new());
    client.validate_all()?;

    let txn = db.begin().await?;
    client.id = next_identifier(&txn, ids, IdKind::Client).await?;
    add_client(&txn, &client).await?;
    txn.commit().await?;
    Ok(client)
}

/// Lists clients in storage order, optionally keeping only those where `filter` occurs,
/// ignoring case, in the name, email, phone, city or address.
pub async fn get_clients(db: &DatabaseConnection, filter: Option<&str>) -> Result<Vec<client::Model>> {
    let clients = Client::find().all(db).await?;
    let Some(needle) = search::normalize(filter) else {
        return Ok(clients);
    };

    let matched: Vec<client::Model> = clients
        .into_iter()
        .filter(|c| {
            search::matches_any(&needle, &[&c.name, &c.email, &c.phone, &c.city, &c.address])
        })
        .collect();
    debug!("Client search '{}' matched {} rows", needle, matched.len());
    Ok(matched)
}

/// Retrieves a client by identifier.
pub async fn get_client(db: &DatabaseConnection, id: &str) -> Result<Option<client::Model>> {
    Client::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Deletes a client by identifier and returns the number of rows removed.
///
/// Deleting an unknown identifier removes nothing and is not an error.
#[instrument(skip(db))]
pub async fn delete_client(db: &DatabaseConnection, id: &str) -> Result<u64> {
    let result = Client::delete_by_id(id).exec(db).await?;
    info!("Deleted client '{}', rows affected: {}", id, result.rows_affected);
    Ok(result.rows_affected)
}
