//! Core business logic, independent of any front end.
//!
//! Every operation takes a `&DatabaseConnection` (or any `ConnectionTrait` when it must
//! also run inside a caller's transaction) and returns [`crate::errors::Result`].

/// The in-progress order assembled before checkout
pub mod cart;
/// Client records: create, search, delete
pub mod client;
/// Prefixed sequential identifiers
pub mod ids;
/// Orders and their line items, written atomically
pub mod order;
/// Product catalogue
pub mod product;
/// Aggregate queries for charts
pub mod report;
mod search;
/// Bulk CSV and JSON import/export
pub mod transfer;
