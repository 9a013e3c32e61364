//! Unified error types for `orderdesk`.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants are grouped into the
//! broad classes reported by [`Error::kind`], so a front end can tell a rejected input apart
//! from a store failure or a broken import file without matching every variant.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before it reached the store.
    Validation,
    /// The store refused or failed the operation.
    Store,
    /// Reading or writing an import/export file failed.
    Io,
    /// A referenced record does not exist.
    Lookup,
    /// Configuration or caller arguments are unusable.
    Config,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is empty or does not match its expected shape.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// A numeric field is outside its allowed range.
    #[error("Invalid {field}: {amount}")]
    InvalidAmount {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        amount: f64,
    },

    /// Text could not be coerced into a number.
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber {
        /// Name of the offending field
        field: &'static str,
        /// The raw input text
        value: String,
    },

    /// A unique constraint (identifier or client email) was violated.
    #[error("Duplicate record: {detail}")]
    Duplicate {
        /// Store-provided description of the violated constraint
        detail: String,
    },

    /// Any other store failure.
    #[error("Database error: {0}")]
    Database(DbErr),

    /// Every number of an identifier sequence is already in use.
    #[error("Identifier sequence of {table} is exhausted")]
    SequenceExhausted {
        /// Table whose identifiers ran out
        table: &'static str,
    },

    /// A record looked up by identifier does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"product"`
        entity: &'static str,
        /// The identifier that was looked up
        id: String,
    },

    /// The named table is not one of the managed tables.
    #[error("Unknown table: {name}")]
    UnknownTable {
        /// The rejected table name
        name: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// An import file does not have one value per table column.
    #[error("Table {table} has {expected} columns but {found} values were supplied")]
    ColumnCount {
        /// Target table
        table: &'static str,
        /// Columns of the table
        expected: usize,
        /// Values found in the file
        found: usize,
    },

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON content.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the broad class this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidAmount { .. } | Self::InvalidNumber { .. } => {
                ErrorKind::Validation
            }
            Self::Duplicate { .. } | Self::SequenceExhausted { .. } | Self::Database(_) => {
                ErrorKind::Store
            }
            Self::NotFound { .. } => ErrorKind::Lookup,
            Self::UnknownTable { .. } | Self::Config { .. } => ErrorKind::Config,
            Self::ColumnCount { .. } | Self::Io(_) | Self::Csv(_) | Self::Json(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Duplicate { detail },
            _ => Self::Database(err),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
