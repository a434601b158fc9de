//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

pub use sdsdb::{
    AnyModel, Database, Error, KnownStickerPack, Query, SdsModel, StickerPackInfo, StoreConfig,
    Timestamp,
};
use tempfile::TempDir;

// ============================================================================
// TestDb - file-backed database in a temp directory
// ============================================================================

/// File-backed database that can be closed and reopened
pub struct TestDb {
    pub db: Database,
    pub dir: TempDir,
}

impl TestDb {
    /// Fresh database in a new temp directory
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open(dir.path()).expect("open database");
        Self { db, dir }
    }

    /// Fresh database with explicit settings
    pub fn with_config(config: StoreConfig) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open_with_config(dir.path(), config).expect("open database");
        Self { db, dir }
    }

    /// Close and reopen from the same directory
    pub fn reopen(self) -> Self {
        let TestDb { db, dir } = self;
        drop(db);
        let db = Database::open(dir.path()).expect("reopen database");
        Self { db, dir }
    }
}

// ============================================================================
// Model builders
// ============================================================================

/// Valid pack identity derived from `seed`
pub fn pack_info(seed: u32) -> StickerPackInfo {
    let mut key = vec![0u8; 32];
    key[..4].copy_from_slice(&seed.to_le_bytes());
    StickerPackInfo::new(seed.to_be_bytes().to_vec(), key)
}

/// Fresh, unsaved pack
pub fn new_pack(seed: u32) -> KnownStickerPack {
    KnownStickerPack::new(pack_info(seed))
}

/// Insert `count` packs (seeds `0..count`) in one transaction
pub fn insert_packs(db: &Database, count: u32) -> Vec<KnownStickerPack> {
    db.write(|tx| {
        let mut packs = Vec::with_capacity(count as usize);
        for seed in 0..count {
            let mut pack = new_pack(seed);
            pack.any_insert(tx)?;
            packs.push(pack);
        }
        Ok(packs)
    })
    .expect("insert packs")
}

/// Unique ids in the order a full scan visits them
pub fn scanned_ids(db: &Database, batch_size: usize) -> Vec<String> {
    let mut ids = Vec::new();
    db.read(|tx| {
        KnownStickerPack::any_enumerate(tx, batch_size, |pack, _| {
            ids.push(pack.unique_id().to_string())
        })
    })
    .expect("enumerate");
    ids
}
