//! Database facade
//!
//! `Database` opens a store and makes sure every model table exists before
//! handing out transactions.

use once_cell::sync::Lazy;
use sds_core::{Result, TableMetadata};
use sds_models::KNOWN_STICKER_PACK_TABLE;
use sds_storage::{ReadTransaction, Store, StoreConfig, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Every model table this crate knows how to persist
pub static MODEL_TABLES: Lazy<Vec<&'static TableMetadata>> =
    Lazy::new(|| vec![&*KNOWN_STICKER_PACK_TABLE]);

/// A store with every model table in place
///
/// Cheap to clone; clones share the store.
#[derive(Debug, Clone)]
pub struct Database {
    store: Arc<Store>,
}

impl Database {
    /// Open (or create) a database in a data directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_store(Store::open(dir)?)
    }

    /// Open (or create) a database with explicit settings
    pub fn open_with_config(dir: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        Self::with_store(Store::open_with_config(dir, config)?)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::with_store(Store::in_memory()?)
    }

    fn with_store(store: Store) -> Result<Self> {
        for table in MODEL_TABLES.iter() {
            store.ensure_table(table)?;
        }
        info!(target: "sds::store", tables = MODEL_TABLES.len(), "Model tables ready");
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run `f` with a read handle
    pub fn read<R>(&self, f: impl FnOnce(&ReadTransaction<'_>) -> Result<R>) -> Result<R> {
        self.store.read(f)
    }

    /// Run `f` with a write handle, committing on `Ok`
    pub fn write<R>(&self, f: impl FnOnce(&mut WriteTransaction<'_>) -> Result<R>) -> Result<R> {
        self.store.write(f)
    }
}
