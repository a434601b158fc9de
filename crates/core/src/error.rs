//! Error types for sdsdb
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Taxonomy
//!
//! - [`DecodeError`]: a stored row could not be turned back into a model
//! - [`EncodeError`]: a model could not be flattened into a record
//! - [`WriteError`]: an insert/update/delete did not reach the store
//! - [`Error::NotFound`]: an overwrite targeted a row that no longer exists
//! - [`Error::Precondition`]: programmer error (empty identifier, double insert)
//! - [`Error::StorageCorrupted`]: the underlying file is damaged; fatal to the store
//!
//! Point lookups that find nothing are not errors: they return `Ok(None)`.

use std::io;
use thiserror::Error;

/// Result type alias for sdsdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to reconstruct a model from a stored record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The discriminator column holds a value no known variant declares
    #[error("Unrecognized record type {record_type} in table {table}")]
    UnrecognizedVariant {
        /// Table the row was read from
        table: String,
        /// Raw discriminator value found in the row
        record_type: i64,
    },

    /// A column could not be read or un-archived
    #[error("Malformed field {column}: {reason}")]
    MalformedField {
        /// Column name
        column: String,
        /// What went wrong
        reason: String,
    },

    /// A timestamp column held NaN or an infinity
    #[error("Invalid timestamp in {column}: {value}")]
    InvalidTimestamp {
        /// Column name
        column: String,
        /// Offending value
        value: f64,
    },

    /// A row was read without a primary key
    #[error("Row in table {table} has no row id")]
    MissingRowId {
        /// Table the row was read from
        table: String,
    },
}

impl DecodeError {
    /// Build a `MalformedField` error for a column
    pub fn malformed(column: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::MalformedField {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Failure to flatten a model into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A complex field could not be archived into a storable value
    #[error("Failed to archive field {column}: {reason}")]
    FieldArchiveFailed {
        /// Column name
        column: String,
        /// What went wrong
        reason: String,
    },
}

/// Failure of a write that never reached, or was refused by, the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The model could not be encoded; nothing was written
    #[error("Encode failed: {0}")]
    EncodeFailed(#[from] EncodeError),

    /// The store refused the statement (constraint violation, I/O, ...)
    #[error("Store rejected write: {0}")]
    StoreRejected(String),
}

/// Error types for sdsdb
#[derive(Debug, Error)]
pub enum Error {
    /// Row decode failure
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Model encode failure outside of a write
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Write failure
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// The row targeted by an overwrite does not exist
    #[error("No row with unique id {unique_id:?} in table {table}")]
    NotFound {
        /// Table name
        table: String,
        /// Unique id that was looked up
        unique_id: String,
    },

    /// Programmer error: the caller broke an operation's precondition
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// The underlying store file is damaged
    #[error("Storage corrupted: {0}")]
    StorageCorrupted(String),

    /// Any other store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (data directory, config file)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the caller should stop using the whole store, not just retry
    pub fn is_fatal_to_store(&self) -> bool {
        matches!(self, Error::StorageCorrupted(_))
    }

    /// Whether this is a row decode failure
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Whether this is a missing-row failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Check a caller precondition
///
/// Debug builds panic. Release builds return `Error::Precondition` so the
/// caller can degrade to an absent result.
pub fn precondition(holds: bool, message: &str) -> Result<()> {
    debug_assert!(holds, "{}", message);
    if holds {
        Ok(())
    } else {
        Err(Error::Precondition(message.to_string()))
    }
}
