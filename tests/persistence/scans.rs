//! Batched scans over larger tables

use crate::common::*;

#[test]
fn test_batched_and_unbatched_scans_agree() {
    let test_db = TestDb::new();
    let packs = insert_packs(&test_db.db, 2_500);
    let expected: Vec<String> = packs.iter().map(|p| p.unique_id().to_string()).collect();

    assert_eq!(scanned_ids(&test_db.db, 0), expected);
    for batch_size in [1, 7, 1_000, 2_500, 10_000] {
        assert_eq!(scanned_ids(&test_db.db, batch_size), expected, "batch size {batch_size}");
    }
}

#[test]
fn test_configured_batch_size_drives_batched_scans() {
    let test_db = TestDb::with_config(StoreConfig {
        enumeration_batch_size: 16,
        ..StoreConfig::default()
    });
    let packs = insert_packs(&test_db.db, 100);

    let mut seen = 0usize;
    test_db
        .db
        .read(|tx| KnownStickerPack::any_enumerate_batched(tx, true, |_, _| seen += 1))
        .unwrap();
    assert_eq!(seen, packs.len());
}

#[test]
fn test_early_stop_in_large_scan() {
    let test_db = TestDb::new();
    insert_packs(&test_db.db, 500);

    let mut seen = Vec::new();
    test_db
        .db
        .read(|tx| {
            KnownStickerPack::any_enumerate(tx, 64, |pack, stop| {
                seen.push(pack.unique_id().to_string());
                *stop = seen.len() == 130;
            })
        })
        .unwrap();
    assert_eq!(seen.len(), 130);
    assert_eq!(seen, scanned_ids(&test_db.db, 0)[..130].to_vec());
}

#[test]
fn test_remove_all_then_scan_is_empty() {
    let test_db = TestDb::new();
    insert_packs(&test_db.db, 300);

    let removed = test_db
        .db
        .write(|tx| KnownStickerPack::any_remove_all_with_instantiation(tx))
        .unwrap();
    assert_eq!(removed, 300);
    assert!(scanned_ids(&test_db.db, 10).is_empty());
    assert_eq!(
        test_db.db.read(|tx| KnownStickerPack::any_count(tx)).unwrap(),
        0
    );
}
