//! Store error types

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::models::AmountError;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Failures surfaced by the ledger store.
///
/// A missing row is not an error: point lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached, opened, or released
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// The handle was closed before the call
    #[error("store is closed")]
    Closed,

    /// A write violated a uniqueness, NOT NULL, or CHECK constraint
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A fetched row could not be decoded into its entity
    #[error("row for table {table} does not match its schema: {reason}")]
    Mapping { table: &'static str, reason: String },

    /// Any other statement execution fault
    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),

    /// A batch contained the same primary key more than once
    #[error("batch for table {table} contains primary key {key} more than once")]
    DuplicateKey { table: &'static str, key: String },

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn mapping(table: &'static str, reason: impl ToString) -> Self {
        StoreError::Mapping {
            table,
            reason: reason.to_string(),
        }
    }

    /// True for failures where the store itself was unavailable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StoreError::Connectivity(_) | StoreError::Closed)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _) => match code.code {
                ErrorCode::ConstraintViolation => StoreError::Constraint(err.to_string()),
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly => StoreError::Connectivity(err.to_string()),
                _ => StoreError::Query(err),
            },
            rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::Mapping {
                table: "?",
                reason: err.to_string(),
            },
            _ => StoreError::Query(err),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Connectivity(err.to_string())
    }
}
