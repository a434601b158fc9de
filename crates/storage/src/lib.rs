//! Storage layer for sdsdb
//!
//! This crate wraps the embedded relational store (SQLite via `rusqlite`):
//! - Store: owns the connection, opens data directories, runs transactions
//! - ReadTransaction / WriteTransaction: scoped handles passed to every operation
//! - RowStream / RowReader: lending access to result rows
//! - ColumnValue / Query: storable values and raw parameterised SQL
//! - StoreConfig: `sds.toml` settings
//! - CorruptionState: per-store "file is damaged" flags
//! - loop_batched: the batched loop primitive behind every full-table scan

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batching;
pub mod config;
pub mod corruption;
pub mod store;
pub mod transaction;
pub mod value;

pub use batching::{loop_batched, BatchingStats, ReleaseScope};
pub use config::{
    StoreConfig, CONFIG_FILE_NAME, DATABASE_FILE_NAME, DEFAULT_ENUMERATION_BATCH_SIZE,
};
pub use corruption::{is_corruption_error, CorruptionState};
pub use store::Store;
pub use transaction::{ReadTransaction, RowReader, RowStream, WriteTransaction};
pub use value::{ColumnValue, Query};
