//! Sticker pack identity

use serde::{Deserialize, Serialize};

/// Length in bytes of a valid pack key
pub const PACK_KEY_LENGTH: usize = 32;

/// Public identity of a sticker pack: its id plus the key that decrypts it
///
/// Archived into the `info` blob column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StickerPackInfo {
    /// Pack id as issued by the sticker service
    pub pack_id: Vec<u8>,
    /// Symmetric key for the pack's manifest and stickers
    pub pack_key: Vec<u8>,
}

impl StickerPackInfo {
    /// Pack identity from raw id and key bytes
    pub fn new(pack_id: impl Into<Vec<u8>>, pack_key: impl Into<Vec<u8>>) -> Self {
        Self {
            pack_id: pack_id.into(),
            pack_key: pack_key.into(),
        }
    }

    /// Lowercase hex of the pack id; the pack's unique id in every table
    pub fn as_key(&self) -> String {
        hex::encode(&self.pack_id)
    }

    /// Non-empty id and a full-length key
    pub fn is_valid(&self) -> bool {
        !self.pack_id.is_empty() && self.pack_key.len() == PACK_KEY_LENGTH
    }

    /// Link that installs this pack
    pub fn share_url(&self) -> String {
        format!(
            "https://signal.art/addstickers/#pack_id={}&pack_key={}",
            hex::encode(&self.pack_id),
            hex::encode(&self.pack_key)
        )
    }
}
