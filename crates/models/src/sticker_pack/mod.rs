//! Sticker pack model families

mod info;
mod known;

pub use info::{StickerPackInfo, PACK_KEY_LENGTH};
pub use known::{
    known_sticker_pack_dispatcher, KnownStickerPack, KnownStickerPackRecord,
    KNOWN_STICKER_PACK_TABLE,
};
