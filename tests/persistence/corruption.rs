//! Damaged database files surface as storage corruption

use crate::common::*;
use sdsdb::DATABASE_FILE_NAME;
use tempfile::TempDir;

#[test]
fn test_garbage_database_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(DATABASE_FILE_NAME), vec![0x5Au8; 16 * 1024]).unwrap();

    let err = Database::open(dir.path()).unwrap_err();
    assert!(err.is_fatal_to_store(), "unexpected error: {err}");
    assert!(matches!(err, Error::StorageCorrupted(_)));
}

#[test]
fn test_healthy_database_reports_no_corruption() {
    let test_db = TestDb::new();
    insert_packs(&test_db.db, 5);
    scanned_ids(&test_db.db, 2);
    assert!(!test_db.db.store().corruption().is_corrupted());
}

#[test]
fn test_unreadable_config_refuses_to_open() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(sdsdb::CONFIG_FILE_NAME), "enumeration_batch_size = \"lots\"").unwrap();
    assert!(matches!(Database::open(dir.path()), Err(Error::Config(_))));
}
