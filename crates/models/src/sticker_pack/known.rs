//! Known sticker packs
//!
//! A known sticker pack is a pack the client has seen referenced (in a
//! message, a link, a contact's share) but has not necessarily installed.
//! `referenceCount` tracks how many places still refer to it.

use super::info::StickerPackInfo;
use crate::coordinator::AnyModel;
use crate::dispatcher::Dispatcher;
use crate::record::{DeepCopy, SdsModel, SdsRecord};
use once_cell::sync::Lazy;
use sds_core::{
    archive_date, required_archive, required_double_as_date, unarchive, ColumnMetadata,
    ColumnType, DecodeError, EncodeError, Error, RecordType, Result, TableMetadata, Timestamp,
    ID_COLUMN, RECORD_TYPE_COLUMN, UNIQUE_ID_COLUMN,
};
use sds_storage::{ColumnValue, RowReader, WriteTransaction};

const TABLE_NAME: &str = "model_KnownStickerPack";
const DATE_CREATED_COLUMN: &str = "dateCreated";
const INFO_COLUMN: &str = "info";
const REFERENCE_COUNT_COLUMN: &str = "referenceCount";

/// Schema of `model_KnownStickerPack`
pub static KNOWN_STICKER_PACK_TABLE: Lazy<TableMetadata> = Lazy::new(|| {
    TableMetadata::new(
        TABLE_NAME,
        vec![
            ColumnMetadata::new(ID_COLUMN, ColumnType::PrimaryKey),
            ColumnMetadata::new(RECORD_TYPE_COLUMN, ColumnType::Int64),
            ColumnMetadata::unique(UNIQUE_ID_COLUMN, ColumnType::UnicodeString),
            ColumnMetadata::new(DATE_CREATED_COLUMN, ColumnType::Double),
            ColumnMetadata::new(INFO_COLUMN, ColumnType::Blob),
            ColumnMetadata::new(REFERENCE_COUNT_COLUMN, ColumnType::Int64),
        ],
    )
});

static DISPATCHER: Lazy<Dispatcher<KnownStickerPack>> = Lazy::new(|| {
    Dispatcher::new(TABLE_NAME)
        .register(RecordType::KNOWN_STICKER_PACK, decode_known_sticker_pack)
});

/// Variants stored in `model_KnownStickerPack`
pub fn known_sticker_pack_dispatcher() -> &'static Dispatcher<KnownStickerPack> {
    &DISPATCHER
}

/// Flat row form of a [`KnownStickerPack`]
#[derive(Debug, Clone, PartialEq)]
pub struct KnownStickerPackRecord {
    /// Row id
    pub id: Option<i64>,
    /// Discriminator
    pub record_type: i64,
    /// Unique id
    pub unique_id: String,
    /// Seconds since the Unix epoch
    pub date_created: f64,
    /// Archived [`StickerPackInfo`]
    pub info: Vec<u8>,
    /// Reference count
    pub reference_count: i64,
}

impl SdsRecord for KnownStickerPackRecord {
    fn table() -> &'static TableMetadata {
        &KNOWN_STICKER_PACK_TABLE
    }

    fn from_row(row: &RowReader<'_>) -> std::result::Result<Self, DecodeError> {
        Ok(Self {
            id: row.get(0, ID_COLUMN)?,
            record_type: row.get(1, RECORD_TYPE_COLUMN)?,
            unique_id: row.get(2, UNIQUE_ID_COLUMN)?,
            date_created: row.get(3, DATE_CREATED_COLUMN)?,
            info: row.get(4, INFO_COLUMN)?,
            reference_count: row.get(5, REFERENCE_COUNT_COLUMN)?,
        })
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn record_type(&self) -> i64 {
        self.record_type
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn data_values(&self) -> Vec<ColumnValue> {
        vec![
            self.record_type.into(),
            self.unique_id.as_str().into(),
            self.date_created.into(),
            self.info.as_slice().into(),
            self.reference_count.into(),
        ]
    }
}

fn decode_known_sticker_pack(
    record: KnownStickerPackRecord,
) -> std::result::Result<KnownStickerPack, DecodeError> {
    let row_id = record.id.ok_or_else(|| DecodeError::MissingRowId {
        table: TABLE_NAME.to_string(),
    })?;
    let date_created = required_double_as_date(record.date_created, DATE_CREATED_COLUMN)?;
    let info: StickerPackInfo = unarchive(&record.info, INFO_COLUMN)?;
    Ok(KnownStickerPack::from_parts(
        Some(row_id),
        record.unique_id,
        date_created,
        info,
        record.reference_count,
    ))
}

/// A sticker pack the client knows about
#[derive(Debug, Clone, PartialEq)]
pub struct KnownStickerPack {
    row_id: Option<i64>,
    unique_id: String,
    date_created: Timestamp,
    info: StickerPackInfo,
    reference_count: i64,
}

impl KnownStickerPack {
    /// A pack seen for the first time: not yet persisted, no references
    pub fn new(info: StickerPackInfo) -> Self {
        Self {
            row_id: None,
            unique_id: Self::unique_id_for(&info),
            date_created: Timestamp::now(),
            info,
            reference_count: 0,
        }
    }

    /// Rebuild a pack from stored fields
    pub fn from_parts(
        row_id: Option<i64>,
        unique_id: String,
        date_created: Timestamp,
        info: StickerPackInfo,
        reference_count: i64,
    ) -> Self {
        Self {
            row_id,
            unique_id,
            date_created,
            info,
            reference_count,
        }
    }

    /// Unique id a pack with `info` is stored under
    pub fn unique_id_for(info: &StickerPackInfo) -> String {
        info.as_key()
    }

    /// When the pack first became known
    pub fn date_created(&self) -> Timestamp {
        self.date_created
    }

    /// Pack identity
    pub fn info(&self) -> &StickerPackInfo {
        &self.info
    }

    /// Number of places still referring to the pack
    pub fn reference_count(&self) -> i64 {
        self.reference_count
    }

    /// Set the reference count in memory; persist with `any_update`
    pub fn set_reference_count(&mut self, reference_count: i64) {
        self.reference_count = reference_count;
    }

    /// Add `delta` to the reference count in memory, saturating
    pub fn adjust_reference_count(&mut self, delta: i64) {
        self.reference_count = self.reference_count.saturating_add(delta);
    }

    /// Adjust the reference count here and in the store
    ///
    /// Uses the read-modify-write path, so a concurrent change to the stored
    /// count is added to rather than overwritten. Returns whether the stored
    /// row still existed.
    pub fn update_with_reference_count_delta(
        &mut self,
        tx: &mut WriteTransaction<'_>,
        delta: i64,
    ) -> Result<bool> {
        self.any_update(tx, |pack| pack.adjust_reference_count(delta))
    }
}

impl SdsModel for KnownStickerPack {
    type Record = KnownStickerPackRecord;

    fn row_id(&self) -> Option<i64> {
        self.row_id
    }

    fn update_row_id(&mut self, row_id: i64) {
        debug_assert!(self.row_id.is_none(), "row id assigned twice");
        self.row_id = Some(row_id);
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn record_type(&self) -> RecordType {
        RecordType::KNOWN_STICKER_PACK
    }

    fn as_record(&self) -> std::result::Result<KnownStickerPackRecord, EncodeError> {
        Ok(KnownStickerPackRecord {
            id: self.row_id,
            record_type: self.record_type().as_i64(),
            unique_id: self.unique_id.clone(),
            date_created: archive_date(self.date_created),
            info: required_archive(&self.info, INFO_COLUMN)?,
            reference_count: self.reference_count,
        })
    }

    fn dispatcher() -> &'static Dispatcher<Self> {
        &DISPATCHER
    }
}

impl DeepCopy for KnownStickerPack {
    fn deep_copy(&self) -> Result<Self> {
        if self.row_id.is_none() {
            return Err(Error::Precondition(format!(
                "cannot copy {}: {:?} was never inserted",
                TABLE_NAME, self.unique_id
            )));
        }
        Ok(Self {
            row_id: self.row_id,
            unique_id: self.unique_id.clone(),
            date_created: self.date_created,
            info: self.info.clone(),
            reference_count: self.reference_count,
        })
    }
}
