//! Record and model traits
//!
//! Every persisted model family has two faces:
//!
//! - a **record** ([`SdsRecord`]): the flat, column-for-column row shape,
//!   holding only primitive column values (integers, doubles, text, bytes).
//! - a **model** ([`SdsModel`]): the domain value callers work with, where
//!   dates are [`Timestamp`](sds_core::Timestamp)s and complex fields are
//!   structured types rather than archived bytes.
//!
//! The codec between them is `as_record` (encode) and `from_record`
//! (decode). Decoding always goes through the family's
//! [`Dispatcher`](crate::Dispatcher), so an unknown discriminator is a
//! [`DecodeError::UnrecognizedVariant`], never a partially built model.

use crate::dispatcher::Dispatcher;
use sds_core::{DecodeError, EncodeError, RecordType, TableMetadata, RECORD_TYPE_COLUMN};
use sds_storage::{ColumnValue, RowReader};

/// Flat row representation of one model family
pub trait SdsRecord: Sized {
    /// Schema of the table this record is stored in
    fn table() -> &'static TableMetadata;

    /// Read a full row, columns in on-disk order
    fn from_row(row: &RowReader<'_>) -> Result<Self, DecodeError>;

    /// Row id, `None` before the first insert
    fn id(&self) -> Option<i64>;

    /// Stored discriminator value
    fn record_type(&self) -> i64;

    /// Unique identifier column
    fn unique_id(&self) -> &str;

    /// Values of every non-primary-key column, in on-disk order
    fn data_values(&self) -> Vec<ColumnValue>;

    /// Values of every column, in on-disk order
    fn column_values(&self) -> Vec<ColumnValue> {
        let mut values = Vec::with_capacity(Self::table().columns().len());
        values.push(ColumnValue::from(self.id()));
        values.extend(self.data_values());
        values
    }
}

/// A persistable domain model
pub trait SdsModel: Sized + 'static {
    /// Flat row form of this family
    type Record: SdsRecord;

    /// Schema of the table this family is stored in
    fn table() -> &'static TableMetadata {
        Self::Record::table()
    }

    /// Row id assigned by the store, `None` until the first insert
    fn row_id(&self) -> Option<i64>;

    /// Record the row id the store assigned on first insert
    ///
    /// Called exactly once per model, by the write coordinator.
    fn update_row_id(&mut self, row_id: i64);

    /// Stable unique identifier
    fn unique_id(&self) -> &str;

    /// Discriminator for this model's variant
    fn record_type(&self) -> RecordType;

    /// Encode to the flat record form
    fn as_record(&self) -> Result<Self::Record, EncodeError>;

    /// Variants stored in this family's table
    fn dispatcher() -> &'static Dispatcher<Self>;

    /// Decode from the flat record form
    fn from_record(record: Self::Record) -> Result<Self, DecodeError> {
        Self::dispatcher().decode(record)
    }

    /// Decode straight from a row
    ///
    /// The discriminator column is read and resolved before any other
    /// column, so a row written by an unknown variant is reported as
    /// [`DecodeError::UnrecognizedVariant`] whatever its other columns hold.
    fn decode_row(row: &RowReader<'_>) -> Result<Self, DecodeError> {
        let table = Self::table();
        let index = table
            .column_index(RECORD_TYPE_COLUMN)
            .ok_or_else(|| DecodeError::malformed(RECORD_TYPE_COLUMN, "column not in table"))?;
        let record_type: i64 = row.get(index, RECORD_TYPE_COLUMN)?;
        let decode = Self::dispatcher().resolve(record_type)?;
        decode(Self::Record::from_row(row)?)
    }
}

/// Field-by-field copy sharing no mutable state with `self`
pub trait DeepCopy: Sized {
    /// Copy every field, including the row id
    ///
    /// Only persisted models can be deep-copied; a model with no row id yields
    /// [`sds_core::Error::Precondition`].
    fn deep_copy(&self) -> sds_core::Result<Self>;
}
