//! Storage corruption tracking
//!
//! When SQLite reports that the database file is damaged, the store flags
//! itself so callers can treat the whole store as unusable rather than
//! retrying the one operation that noticed. The flags are owned by a
//! [`crate::Store`]; there is no process-wide state.

use rusqlite::ErrorCode;
use sds_core::{Error, WriteError};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::error;

/// Whether an SQLite error means the database file itself is damaged
pub fn is_corruption_error(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseCorrupt) | Some(ErrorCode::NotADatabase)
    )
}

/// Map an SQLite error raised while reading
pub fn read_error(err: rusqlite::Error) -> Error {
    if is_corruption_error(&err) {
        Error::StorageCorrupted(err.to_string())
    } else {
        Error::Store(err.to_string())
    }
}

/// Map an SQLite error raised while writing
pub fn write_error(err: rusqlite::Error) -> Error {
    if is_corruption_error(&err) {
        Error::StorageCorrupted(err.to_string())
    } else {
        Error::Write(WriteError::StoreRejected(err.to_string()))
    }
}

/// Corruption flags for one store
#[derive(Debug, Default)]
pub struct CorruptionState {
    read_corrupted: AtomicBool,
    write_corrupted: AtomicBool,
}

impl CorruptionState {
    /// Create a clean state
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag read corruption if `err` indicates a damaged file
    ///
    /// Returns whether the flag was set by this call.
    pub fn flag_read_corruption_if_necessary(&self, err: &rusqlite::Error) -> bool {
        if !is_corruption_error(err) {
            return false;
        }
        if !self.read_corrupted.swap(true, Ordering::SeqCst) {
            error!(target: "sds::store", error = %err, "Flagging database read corruption");
        }
        true
    }

    /// Flag write corruption if `err` indicates a damaged file
    pub fn flag_write_corruption_if_necessary(&self, err: &rusqlite::Error) -> bool {
        if !is_corruption_error(err) {
            return false;
        }
        if !self.write_corrupted.swap(true, Ordering::SeqCst) {
            error!(target: "sds::store", error = %err, "Flagging database write corruption");
        }
        true
    }

    /// Whether a read observed corruption
    pub fn is_read_corrupted(&self) -> bool {
        self.read_corrupted.load(Ordering::SeqCst)
    }

    /// Whether a write observed corruption
    pub fn is_write_corrupted(&self) -> bool {
        self.write_corrupted.load(Ordering::SeqCst)
    }

    /// Whether any corruption has been observed
    pub fn is_corrupted(&self) -> bool {
        self.is_read_corrupted() || self.is_write_corrupted()
    }
}
