//! Record-type discriminators
//!
//! Every row carries a `recordType` column naming the concrete model variant
//! that wrote it. A table may be shared by a whole model family; the
//! discriminator is what lets the decoder pick the right variant.
//!
//! ## Values
//!
//! These values are part of the on-disk format and MUST NOT change.
//! New variants get new values; retired values are never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored discriminator selecting which codec variant decodes a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordType(i64);

impl RecordType {
    /// Installed sticker
    pub const INSTALLED_STICKER: RecordType = RecordType(24);
    /// Installed sticker pack
    pub const STICKER_PACK: RecordType = RecordType(25);
    /// Sticker pack known from a message but not installed
    pub const KNOWN_STICKER_PACK: RecordType = RecordType(29);

    /// Wrap a raw discriminator value
    pub const fn new(raw: i64) -> Self {
        RecordType(raw)
    }

    /// Raw value as stored in the `recordType` column
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Human-readable name for the built-in discriminators
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            RecordType::INSTALLED_STICKER => Some("InstalledSticker"),
            RecordType::STICKER_PACK => Some("StickerPack"),
            RecordType::KNOWN_STICKER_PACK => Some("KnownStickerPack"),
            _ => None,
        }
    }
}

impl From<RecordType> for i64 {
    fn from(record_type: RecordType) -> i64 {
        record_type.0
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "RecordType({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_values_are_stable() {
        assert_eq!(RecordType::INSTALLED_STICKER.as_i64(), 24);
        assert_eq!(RecordType::STICKER_PACK.as_i64(), 25);
        assert_eq!(RecordType::KNOWN_STICKER_PACK.as_i64(), 29);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RecordType::KNOWN_STICKER_PACK.to_string(),
            "KnownStickerPack(29)"
        );
        assert_eq!(RecordType::new(7000).to_string(), "RecordType(7000)");
    }

    #[test]
    fn test_serde_is_transparent_number() {
        let json = serde_json::to_string(&RecordType::KNOWN_STICKER_PACK).unwrap();
        assert_eq!(json, "29");
    }
}
