//! Core types for sdsdb
//!
//! This crate defines the foundational, store-independent pieces of the
//! model persistence layer:
//! - Error: the error taxonomy shared by every crate
//! - TableMetadata / ColumnMetadata: static column schema descriptors
//! - RecordType: the stored discriminator selecting a model variant
//! - Timestamp: finite seconds-since-epoch dates and their column archival
//! - archive: reversible encoding of complex fields into blob columns

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod error;
pub mod record_type;
pub mod schema;
pub mod timestamp;

pub use archive::{required_archive, unarchive, ARCHIVE_FORMAT_VERSION};
pub use error::{precondition, DecodeError, EncodeError, Error, Result, WriteError};
pub use record_type::RecordType;
pub use schema::{
    ColumnMetadata, ColumnType, TableMetadata, ID_COLUMN, RECORD_TYPE_COLUMN, UNIQUE_ID_COLUMN,
};
pub use timestamp::{archive_date, required_double_as_date, Timestamp};

/// Generate a fresh unique identifier for a newly constructed model
///
/// Model families that derive their unique id from domain data (a pack id,
/// a phone number) do not need this.
pub fn new_unique_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
