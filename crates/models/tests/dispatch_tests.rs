//! Record-type dispatch across a table holding several variants
//!
//! `Shape` is a two-variant family (circles and squares) sharing one table.
//! These tests check that every row decodes to the variant its discriminator
//! names, and that an unknown discriminator is a loud, row-local failure:
//! skipped by scans, an error for point fetches.

use once_cell::sync::Lazy;
use sds_core::{
    ColumnMetadata, ColumnType, DecodeError, EncodeError, Error, RecordType, TableMetadata,
    ID_COLUMN, RECORD_TYPE_COLUMN, UNIQUE_ID_COLUMN,
};
use sds_models::{AnyModel, CursorState, Dispatcher, SdsModel, SdsRecord};
use sds_storage::{ColumnValue, Query, RowReader, Store, WriteTransaction};

const CIRCLE: RecordType = RecordType::new(9001);
const SQUARE: RecordType = RecordType::new(9002);

static SHAPE_TABLE: Lazy<TableMetadata> = Lazy::new(|| {
    TableMetadata::new(
        "model_Shape",
        vec![
            ColumnMetadata::new(ID_COLUMN, ColumnType::PrimaryKey),
            ColumnMetadata::new(RECORD_TYPE_COLUMN, ColumnType::Int64),
            ColumnMetadata::unique(UNIQUE_ID_COLUMN, ColumnType::UnicodeString),
            ColumnMetadata::new("measure", ColumnType::Double),
        ],
    )
});

static SHAPES: Lazy<Dispatcher<Shape>> = Lazy::new(|| {
    Dispatcher::new("model_Shape")
        .register(CIRCLE, |r| Shape::decode(r, Kind::Circle))
        .register(SQUARE, |r| Shape::decode(r, Kind::Square))
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Circle,
    Square,
}

#[derive(Debug, Clone, PartialEq)]
struct Shape {
    row_id: Option<i64>,
    unique_id: String,
    kind: Kind,
    measure: f64,
}

impl Shape {
    fn circle(unique_id: &str, radius: f64) -> Self {
        Self {
            row_id: None,
            unique_id: unique_id.to_string(),
            kind: Kind::Circle,
            measure: radius,
        }
    }

    fn square(unique_id: &str, side: f64) -> Self {
        Self {
            row_id: None,
            unique_id: unique_id.to_string(),
            kind: Kind::Square,
            measure: side,
        }
    }

    fn decode(record: ShapeRecord, kind: Kind) -> Result<Self, DecodeError> {
        let row_id = record.id.ok_or_else(|| DecodeError::MissingRowId {
            table: "model_Shape".to_string(),
        })?;
        Ok(Self {
            row_id: Some(row_id),
            unique_id: record.unique_id,
            kind,
            measure: record.measure,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ShapeRecord {
    id: Option<i64>,
    record_type: i64,
    unique_id: String,
    measure: f64,
}

impl SdsRecord for ShapeRecord {
    fn table() -> &'static TableMetadata {
        &SHAPE_TABLE
    }

    fn from_row(row: &RowReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.get(0, ID_COLUMN)?,
            record_type: row.get(1, RECORD_TYPE_COLUMN)?,
            unique_id: row.get(2, UNIQUE_ID_COLUMN)?,
            measure: row.get(3, "measure")?,
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
            self.measure.into(),
        ]
    }
}

impl SdsModel for Shape {
    type Record = ShapeRecord;

    fn row_id(&self) -> Option<i64> {
        self.row_id
    }

    fn update_row_id(&mut self, row_id: i64) {
        self.row_id = Some(row_id);
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn record_type(&self) -> RecordType {
        match self.kind {
            Kind::Circle => CIRCLE,
            Kind::Square => SQUARE,
        }
    }

    fn as_record(&self) -> Result<ShapeRecord, EncodeError> {
        Ok(ShapeRecord {
            id: self.row_id,
            record_type: self.record_type().as_i64(),
            unique_id: self.unique_id.clone(),
            measure: self.measure,
        })
    }

    fn dispatcher() -> &'static Dispatcher<Self> {
        &SHAPES
    }
}

fn store() -> Store {
    let store = Store::in_memory().unwrap();
    store.ensure_table(&SHAPE_TABLE).unwrap();
    store
}

fn insert_raw(
    tx: &mut WriteTransaction<'_>,
    record_type: i64,
    unique_id: &str,
) -> sds_core::Result<usize> {
    tx.execute(
        &Query::new(SHAPE_TABLE.insert_sql())
            .bind(ColumnValue::Null)
            .bind(record_type)
            .bind(unique_id)
            .bind(1.0),
    )
}

/// circle "c", unknown variant "x", square "s", in that order
fn mixed_store() -> Store {
    let store = store();
    store
        .write(|tx| {
            Shape::circle("c", 2.0).any_insert(tx)?;
            insert_raw(tx, 4242, "x")?;
            Shape::square("s", 3.0).any_insert(tx)?;
            Ok(())
        })
        .unwrap();
    store
}

#[test]
fn test_each_row_decodes_to_its_variant() {
    let store = store();
    store
        .write(|tx| {
            Shape::circle("c1", 1.0).any_insert(tx)?;
            Shape::square("s1", 2.0).any_insert(tx)?;
            Shape::circle("c2", 3.0).any_insert(tx)
        })
        .unwrap();

    let shapes = store.read(|tx| Shape::any_fetch_all(tx)).unwrap();
    let kinds: Vec<(String, Kind)> = shapes
        .into_iter()
        .map(|s| (s.unique_id, s.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("c1".to_string(), Kind::Circle),
            ("s1".to_string(), Kind::Square),
            ("c2".to_string(), Kind::Circle),
        ]
    );
}

#[test]
fn test_dispatcher_resolution_is_total() {
    assert!(SHAPES.knows(9001));
    assert!(SHAPES.knows(9002));
    assert!(!SHAPES.knows(0));
    assert_eq!(SHAPES.record_types(), vec![CIRCLE, SQUARE]);
    assert_eq!(
        SHAPES.resolve(-1).err(),
        Some(DecodeError::UnrecognizedVariant {
            table: "model_Shape".to_string(),
            record_type: -1,
        })
    );
}

#[test]
fn test_unknown_variant_fetch_is_an_error() {
    let store = mixed_store();
    let err = store.read(|tx| Shape::any_fetch("x", tx)).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(DecodeError::UnrecognizedVariant { record_type: 4242, .. })
    ));
}

#[test]
fn test_unknown_variant_is_skipped_by_scans() {
    let store = mixed_store();

    let all = store.read(|tx| Shape::any_fetch_all(tx)).unwrap();
    assert_eq!(
        all.iter().map(|s| s.unique_id.as_str()).collect::<Vec<_>>(),
        vec!["c", "s"]
    );

    let mut visited = Vec::new();
    store
        .read(|tx| Shape::any_enumerate(tx, 1, |shape, _| visited.push(shape.unique_id)))
        .unwrap();
    assert_eq!(visited, vec!["c", "s"]);

    // Counting and id listing never decode, so they see all three rows.
    assert_eq!(store.read(|tx| Shape::any_count(tx)).unwrap(), 3);
    assert_eq!(
        store.read(|tx| Shape::any_all_unique_ids(tx)).unwrap(),
        vec!["c", "x", "s"]
    );
}

#[test]
fn test_cursor_reports_bad_row_and_continues() {
    let store = mixed_store();
    store
        .read(|tx| {
            Shape::with_cursor(tx, |cursor| {
                assert_eq!(cursor.next().unwrap().unwrap().unique_id, "c");
                assert!(cursor.next().unwrap_err().is_decode_error());
                assert_eq!(cursor.state(), CursorState::Open);
                assert_eq!(cursor.next().unwrap().unwrap().unique_id, "s");
                assert!(cursor.next().unwrap().is_none());
                assert_eq!(cursor.state(), CursorState::Exhausted);
                assert!(cursor.next().unwrap().is_none());
                assert_eq!(cursor.rows_read(), 3);
                assert_eq!(cursor.decode_failures(), 1);
            });
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_unknown_variant_wins_over_mistyped_columns() {
    let store = store();
    store
        .write(|tx| {
            tx.execute(
                &Query::new(SHAPE_TABLE.insert_sql())
                    .bind(ColumnValue::Null)
                    .bind(7000i64)
                    .bind("future")
                    .bind("not-a-number"),
            )
        })
        .unwrap();

    let err = store.read(|tx| Shape::any_fetch("future", tx)).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(DecodeError::UnrecognizedVariant { record_type: 7000, .. })
    ));

    store
        .read(|tx| {
            Shape::with_cursor(tx, |cursor| {
                assert!(matches!(
                    cursor.next(),
                    Err(Error::Decode(DecodeError::UnrecognizedVariant { record_type: 7000, .. }))
                ));
                assert_eq!(cursor.state(), CursorState::Open);
            });
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_known_variant_with_mistyped_column_is_malformed() {
    let store = store();
    store
        .write(|tx| {
            tx.execute(
                &Query::new(SHAPE_TABLE.insert_sql())
                    .bind(ColumnValue::Null)
                    .bind(CIRCLE.as_i64())
                    .bind("bent")
                    .bind("not-a-number"),
            )
        })
        .unwrap();

    let err = store.read(|tx| Shape::any_fetch("bent", tx)).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(DecodeError::MalformedField { ref column, .. }) if column == "measure"
    ));
}

#[test]
fn test_remove_all_clears_undecodable_rows_too() {
    let store = mixed_store();
    let removed = store
        .write(|tx| Shape::any_remove_all_with_instantiation(tx))
        .unwrap();
    assert_eq!(removed, 3);
    assert_eq!(store.read(|tx| Shape::any_count(tx)).unwrap(), 0);
}
