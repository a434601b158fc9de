//! Store configuration via `sds.toml`
//!
//! On first open of a data directory, a default `sds.toml` is created next to
//! the database file. To change settings, edit the file and reopen the store.

use sds_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the store's data directory.
pub const CONFIG_FILE_NAME: &str = "sds.toml";

/// Database file name placed in the store's data directory.
pub const DATABASE_FILE_NAME: &str = "store.sqlite";

/// Rows per release scope when a caller asks for batched enumeration
pub const DEFAULT_ENUMERATION_BATCH_SIZE: usize = 10_000;

/// Store configuration loaded from `sds.toml`.
///
/// # Example
///
/// ```toml
/// journal_mode = "wal"
/// synchronous = "normal"
/// busy_timeout_ms = 5000
/// enumeration_batch_size = 10000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite journal mode: `"wal"` or `"delete"`.
    #[serde(default = "default_journal_mode")]
    pub journal_mode: String,
    /// SQLite synchronous mode: `"normal"` or `"full"`.
    #[serde(default = "default_synchronous")]
    pub synchronous: String,
    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Batch size used by batched enumeration.
    #[serde(default = "default_enumeration_batch_size")]
    pub enumeration_batch_size: usize,
}

fn default_journal_mode() -> String {
    "wal".to_string()
}

fn default_synchronous() -> String {
    "normal".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_enumeration_batch_size() -> usize {
    DEFAULT_ENUMERATION_BATCH_SIZE
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            journal_mode: default_journal_mode(),
            synchronous: default_synchronous(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enumeration_batch_size: default_enumeration_batch_size(),
        }
    }
}

impl StoreConfig {
    /// Check every field has a supported value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        match self.journal_mode.as_str() {
            "wal" | "delete" => {}
            other => {
                return Err(Error::Config(format!(
                    "Invalid journal_mode '{}' in {}. Expected \"wal\" or \"delete\".",
                    other, CONFIG_FILE_NAME
                )))
            }
        }
        match self.synchronous.as_str() {
            "normal" | "full" => {}
            other => {
                return Err(Error::Config(format!(
                    "Invalid synchronous '{}' in {}. Expected \"normal\" or \"full\".",
                    other, CONFIG_FILE_NAME
                )))
            }
        }
        if self.enumeration_batch_size == 0 {
            return Err(Error::Config(format!(
                "enumeration_batch_size in {} must be greater than zero",
                CONFIG_FILE_NAME
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# sdsdb store configuration
#
# Journal mode: "wal" (default) or "delete"
journal_mode = "wal"

# Synchronous mode: "normal" (default) or "full"
#   "normal" = fsync at checkpoints, fast, safe with WAL
#   "full"   = fsync every commit
synchronous = "normal"

# Milliseconds a statement waits on a locked database before failing.
busy_timeout_ms = 5000

# Rows per release scope for batched enumeration.
enumeration_batch_size = 10000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
