//! Data, row ids and settings survive close and reopen

use crate::common::*;
use sdsdb::{RecordType, UpsertOutcome};

#[test]
fn test_example_pack_is_stored_column_for_column() {
    let test_db = TestDb::new();
    let mut pack = KnownStickerPack::from_parts(
        None,
        "abc".to_string(),
        Timestamp::from_secs_f64(1_700_000_000.0).unwrap(),
        StickerPackInfo::new(vec![], vec![]),
        1,
    );
    test_db.db.write(|tx| pack.any_insert(tx)).unwrap();
    let row_id = pack.row_id().unwrap();

    let (record_type, date_created, info_len, reference_count) = test_db
        .db
        .read(|tx| {
            let query = Query::new(
                "SELECT recordType, dateCreated, length(info), referenceCount \
                 FROM model_KnownStickerPack WHERE id = ?1",
            )
            .bind(row_id);
            tx.query_row(&query, |row| {
                Ok((
                    row.get::<i64>(0, "recordType")?,
                    row.get::<f64>(1, "dateCreated")?,
                    row.get::<i64>(2, "info")?,
                    row.get::<i64>(3, "referenceCount")?,
                ))
            })
        })
        .unwrap()
        .unwrap();
    assert_eq!(record_type, RecordType::KNOWN_STICKER_PACK.as_i64());
    assert_eq!(date_created, 1_700_000_000.0);
    assert_eq!(info_len, 17);
    assert_eq!(reference_count, 1);

    let test_db = test_db.reopen();
    let fetched = test_db
        .db
        .read(|tx| KnownStickerPack::any_fetch("abc", tx))
        .unwrap()
        .unwrap();
    assert_eq!(fetched, pack);
}

#[test]
fn test_packs_survive_reopen() {
    let test_db = TestDb::new();
    let packs = insert_packs(&test_db.db, 10);

    let test_db = test_db.reopen();
    let all = test_db
        .db
        .read(|tx| KnownStickerPack::any_fetch_all(tx))
        .unwrap();
    assert_eq!(all, packs);
}

#[test]
fn test_row_ids_are_never_reused_after_reopen() {
    let test_db = TestDb::new();
    let packs = insert_packs(&test_db.db, 3);
    let last_id = packs[2].row_id().unwrap();
    test_db.db.write(|tx| packs[2].any_remove(tx)).unwrap();

    let test_db = test_db.reopen();
    let mut pack = new_pack(100);
    test_db.db.write(|tx| pack.any_insert(tx)).unwrap();
    assert!(pack.row_id().unwrap() > last_id);
}

#[test]
fn test_reference_counting_across_sessions() {
    let test_db = TestDb::new();
    let mut pack = new_pack(1);
    let outcome = test_db.db.write(|tx| pack.any_upsert(tx)).unwrap();
    assert_eq!(outcome, UpsertOutcome::Inserted);

    for _ in 0..3 {
        test_db
            .db
            .write(|tx| pack.update_with_reference_count_delta(tx, 1))
            .unwrap();
    }

    let test_db = test_db.reopen();
    let mut stored = test_db
        .db
        .read(|tx| KnownStickerPack::any_fetch(pack.unique_id(), tx))
        .unwrap()
        .unwrap();
    assert_eq!(stored.reference_count(), 3);

    test_db
        .db
        .write(|tx| stored.update_with_reference_count_delta(tx, -3))
        .unwrap();
    let count = test_db
        .db
        .read(|tx| KnownStickerPack::any_fetch(pack.unique_id(), tx))
        .unwrap()
        .unwrap()
        .reference_count();
    assert_eq!(count, 0);
}

#[test]
fn test_config_file_is_written_and_honoured() {
    let test_db = TestDb::new();
    let config_path = test_db.dir.path().join(sdsdb::CONFIG_FILE_NAME);
    assert!(config_path.exists());

    let edited = StoreConfig {
        enumeration_batch_size: 3,
        ..StoreConfig::default()
    };
    edited.write_to_file(&config_path).unwrap();

    let test_db = test_db.reopen();
    assert_eq!(test_db.db.store().config().enumeration_batch_size, 3);
    let batch_size = test_db.db.read(|tx| Ok(tx.default_batch_size())).unwrap();
    assert_eq!(batch_size, 3);
}
