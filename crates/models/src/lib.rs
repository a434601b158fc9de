//! Model persistence for sdsdb
//!
//! This crate turns domain models into rows and back, and coordinates every
//! read and write of a model family:
//! - SdsRecord / SdsModel: the flat row form and the record codec
//! - Dispatcher: discriminator -> variant decoder registry
//! - ModelCursor: forward-only decoding cursor scoped to a transaction
//! - enumerate: batched scans over a cursor
//! - AnyModel: insert, update, upsert, remove, fetch and scan operations
//! - sticker_pack: the known sticker pack family

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod cursor;
pub mod dispatcher;
pub mod enumerate;
pub mod record;
pub mod sticker_pack;

pub use coordinator::{AnyModel, UpsertOutcome};
pub use cursor::{CursorState, ModelCursor};
pub use dispatcher::{DecodeFn, Dispatcher};
pub use enumerate::enumerate;
pub use record::{DeepCopy, SdsModel, SdsRecord};
pub use sticker_pack::{
    known_sticker_pack_dispatcher, KnownStickerPack, KnownStickerPackRecord, StickerPackInfo,
    KNOWN_STICKER_PACK_TABLE, PACK_KEY_LENGTH,
};
