//! Complex-field archival
//!
//! Structured model fields are stored in `BLOB` columns. The archive format is
//! a one-byte format version followed by a bincode payload (fixed-width
//! integers, length-prefixed sequences, trailing bytes rejected), so
//! `unarchive(archive(v)) == v` for every serde value.
//!
//! Failures name the column they belong to so decode errors point at the
//! offending field.

use crate::error::{DecodeError, EncodeError};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Current archive format version
pub const ARCHIVE_FORMAT_VERSION: u8 = 1;

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Archive a required complex field into bytes
pub fn required_archive<T: Serialize>(value: &T, column: &str) -> Result<Vec<u8>, EncodeError> {
    let payload = codec()
        .serialize(value)
        .map_err(|e| EncodeError::FieldArchiveFailed {
            column: column.to_string(),
            reason: e.to_string(),
        })?;
    let mut bytes = Vec::with_capacity(payload.len() + 1);
    bytes.push(ARCHIVE_FORMAT_VERSION);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Un-archive a required complex field
pub fn unarchive<T: DeserializeOwned>(bytes: &[u8], column: &str) -> Result<T, DecodeError> {
    let (version, payload) = bytes
        .split_first()
        .ok_or_else(|| DecodeError::malformed(column, "empty archive"))?;
    if *version != ARCHIVE_FORMAT_VERSION {
        return Err(DecodeError::malformed(
            column,
            format!("unsupported archive version {}", version),
        ));
    }
    codec()
        .deserialize(payload)
        .map_err(|e| DecodeError::malformed(column, e.to_string()))
}
