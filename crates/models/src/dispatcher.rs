//! Record-type dispatch
//!
//! One table can hold several model variants; the `recordType` column says
//! which one a row is. A [`Dispatcher`] maps each known discriminator to the
//! function that builds that variant from a record. Resolution is total:
//! every discriminator either resolves or yields
//! [`DecodeError::UnrecognizedVariant`].
//!
//! ```rust,ignore
//! static DISPATCHER: Lazy<Dispatcher<Shape>> = Lazy::new(|| {
//!     Dispatcher::new("model_Shape")
//!         .register(CIRCLE, decode_circle)
//!         .register(SQUARE, decode_square)
//! });
//!
//! let shape = DISPATCHER.decode(record)?;
//! ```

use crate::record::{SdsModel, SdsRecord};
use sds_core::{DecodeError, RecordType};
use std::collections::BTreeMap;
use std::fmt;

/// Builds one variant of `M` from its record
pub type DecodeFn<M> = fn(<M as SdsModel>::Record) -> Result<M, DecodeError>;

/// Registry of the variants stored in one table
pub struct Dispatcher<M: SdsModel> {
    table_name: &'static str,
    variants: BTreeMap<RecordType, DecodeFn<M>>,
}

impl<M: SdsModel> Dispatcher<M> {
    /// Empty registry for `table_name`
    pub fn new(table_name: &'static str) -> Self {
        Self {
            table_name,
            variants: BTreeMap::new(),
        }
    }

    /// Register the decoder for one discriminator
    ///
    /// Registering a discriminator twice replaces the earlier decoder.
    pub fn register(mut self, record_type: RecordType, decode: DecodeFn<M>) -> Self {
        self.variants.insert(record_type, decode);
        self
    }

    /// Decoder for a stored discriminator value
    pub fn resolve(&self, record_type: i64) -> Result<DecodeFn<M>, DecodeError> {
        self.variants
            .get(&RecordType::new(record_type))
            .copied()
            .ok_or(DecodeError::UnrecognizedVariant {
                table: self.table_name.to_string(),
                record_type,
            })
    }

    /// Whether a stored discriminator value is known
    pub fn knows(&self, record_type: i64) -> bool {
        self.variants.contains_key(&RecordType::new(record_type))
    }

    /// Registered discriminators, ascending
    pub fn record_types(&self) -> Vec<RecordType> {
        self.variants.keys().copied().collect()
    }

    /// Table this registry serves
    pub fn table_name(&self) -> &'static str {
        self.table_name
    }

    /// Check the discriminator, then build the matching variant
    pub fn decode(&self, record: M::Record) -> Result<M, DecodeError> {
        let decode = self.resolve(record.record_type())?;
        decode(record)
    }
}

impl<M: SdsModel> fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table_name", &self.table_name)
            .field("record_types", &self.record_types())
            .finish()
    }
}
