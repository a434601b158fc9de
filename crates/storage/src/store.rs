//! The embedded relational store
//!
//! `Store` owns a single SQLite connection. All access goes through scoped
//! transactions:
//!
//! - [`Store::read`] runs a closure inside a deferred transaction that is
//!   always rolled back, giving it a consistent snapshot.
//! - [`Store::write`] runs a closure inside an immediate transaction that is
//!   committed when the closure returns `Ok` and rolled back otherwise.
//!
//! Transactions serialize on the connection mutex. Do not open a second
//! transaction from inside a transaction closure; use the handle you have.
//!
//! ```ignore
//! let store = Store::open("/data/stickers")?;
//! store.write(|tx| {
//!     pack.any_insert(tx)?;
//!     Ok(())
//! })?;
//! ```

use crate::config::{StoreConfig, CONFIG_FILE_NAME, DATABASE_FILE_NAME};
use crate::corruption::{read_error, write_error, CorruptionState};
use crate::transaction::{ReadTransaction, WriteTransaction};
use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use sds_core::{Result, TableMetadata};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A SQLite-backed store of model tables
pub struct Store {
    conn: Mutex<Connection>,
    corruption: CorruptionState,
    config: StoreConfig,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) a store in a data directory
    ///
    /// Writes a default `sds.toml` on first open and reads settings from it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let config_path = dir.join(CONFIG_FILE_NAME);
        StoreConfig::write_default_if_missing(&config_path)?;
        let config = StoreConfig::from_file(&config_path)?;
        Self::open_with_config(dir, config)
    }

    /// Open (or create) a store in a data directory with explicit settings
    ///
    /// The config file in the directory, if any, is ignored.
    pub fn open_with_config(dir: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DATABASE_FILE_NAME);
        let conn = Connection::open(&path).map_err(read_error)?;
        let store = Self::from_connection(conn, config, Some(path))?;
        info!(target: "sds::store", path = ?store.path, "Store opened");
        Ok(store)
    }

    /// Open a private in-memory store (tests, scratch data)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(read_error)?;
        Self::from_connection(conn, StoreConfig::default(), None)
    }

    fn from_connection(conn: Connection, config: StoreConfig, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(read_error)?;
        if path.is_some() {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", config.journal_mode.as_str(), |row| {
                    row.get(0)
                })
                .map_err(read_error)?;
            debug!(target: "sds::store", journal_mode = %mode, "Journal mode set");
        }
        conn.pragma_update(None, "synchronous", config.synchronous.as_str())
            .map_err(read_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
            corruption: CorruptionState::new(),
            config,
            path,
        })
    }

    /// Settings this store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Corruption flags raised by operations on this store
    pub fn corruption(&self) -> &CorruptionState {
        &self.corruption
    }

    /// Run `f` with a read handle
    pub fn read<R>(&self, f: impl FnOnce(&ReadTransaction<'_>) -> Result<R>) -> Result<R> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(|e| {
                self.corruption.flag_read_corruption_if_necessary(&e);
                read_error(e)
            })?;
        let result = {
            let handle =
                ReadTransaction::new(&tx, &self.corruption, self.config.enumeration_batch_size);
            f(&handle)
        };
        if let Err(e) = tx.rollback() {
            warn!(target: "sds::txn", error = %e, "Failed to close read transaction");
        }
        result
    }

    /// Run `f` with a write handle, committing on `Ok`
    pub fn write<R>(&self, f: impl FnOnce(&mut WriteTransaction<'_>) -> Result<R>) -> Result<R> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| {
                self.corruption.flag_write_corruption_if_necessary(&e);
                write_error(e)
            })?;
        let result = {
            let mut handle =
                WriteTransaction::new(&tx, &self.corruption, self.config.enumeration_batch_size);
            f(&mut handle)
        };
        match result {
            Ok(value) => {
                tx.commit().map_err(|e| {
                    self.corruption.flag_write_corruption_if_necessary(&e);
                    write_error(e)
                })?;
                debug!(target: "sds::txn", "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    warn!(target: "sds::txn", error = %rollback, "Rollback failed");
                }
                warn!(target: "sds::txn", error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }

    /// Create the table described by `table` if it does not exist
    pub fn ensure_table(&self, table: &TableMetadata) -> Result<()> {
        table.validate()?;
        self.write(|tx| tx.execute_batch(table.create_table_sql()))?;
        debug!(target: "sds::store", table = table.table_name(), "Table ensured");
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("corrupted", &self.corruption.is_corrupted())
            .finish()
    }
}
