//! sdsdb - typed model persistence over an embedded relational store
//!
//! sdsdb maps domain models to rows of an embedded SQLite database and back.
//! Each model family owns one table, described by a static column schema; a
//! discriminator column selects the variant a row decodes to.
//!
//! # Quick Start
//!
//! ```ignore
//! use sdsdb::{AnyModel, Database, KnownStickerPack, StickerPackInfo};
//!
//! let db = Database::open("/data/stickers")?;
//! let mut pack = KnownStickerPack::new(StickerPackInfo::new(pack_id, pack_key));
//! db.write(|tx| pack.any_insert(tx))?;
//!
//! let count = db.read(|tx| KnownStickerPack::any_count(tx))?;
//! ```
//!
//! # Architecture
//!
//! - `sds-core`: errors, schema descriptors, discriminators, timestamps,
//!   field archival
//! - `sds-storage`: the store, transactions, row streams, batching, config
//! - `sds-models`: record codec, dispatch, cursors, enumeration, write
//!   coordination and the model families themselves

mod database;

pub use database::{Database, MODEL_TABLES};
pub use sds_core::{
    DecodeError, EncodeError, Error, RecordType, Result, TableMetadata, Timestamp, WriteError,
};
pub use sds_models::{
    AnyModel, CursorState, DeepCopy, Dispatcher, KnownStickerPack, ModelCursor, SdsModel,
    SdsRecord, StickerPackInfo, UpsertOutcome,
};
pub use sds_storage::{
    Query, ReadTransaction, Store, StoreConfig, WriteTransaction, CONFIG_FILE_NAME,
    DATABASE_FILE_NAME,
};
