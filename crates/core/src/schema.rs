//! Column schema descriptors
//!
//! A [`TableMetadata`] is the static description of the table one model
//! family is persisted to: its name plus an ordered column list. Column order
//! and names are part of the on-disk format and MUST NOT change without a
//! migration.
//!
//! Descriptors are plain data. Model crates build them once (typically in a
//! `once_cell::sync::Lazy`) and hand out `&'static TableMetadata`.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fmt;

/// Name of the auto-assigned row id column every table starts with
pub const ID_COLUMN: &str = "id";
/// Name of the variant discriminator column
pub const RECORD_TYPE_COLUMN: &str = "recordType";
/// Name of the unique identifier column
pub const UNIQUE_ID_COLUMN: &str = "uniqueId";

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Auto-assigned integer row id
    PrimaryKey,
    /// 64-bit signed integer
    Int64,
    /// IEEE 754 double
    Double,
    /// UTF-8 text
    UnicodeString,
    /// Raw bytes
    Blob,
}

impl ColumnType {
    /// Column definition fragment for `CREATE TABLE`
    pub fn sql_definition(&self) -> &'static str {
        match self {
            ColumnType::PrimaryKey => "INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL",
            ColumnType::Int64 => "INTEGER NOT NULL",
            ColumnType::Double => "DOUBLE NOT NULL",
            ColumnType::UnicodeString => "TEXT NOT NULL",
            ColumnType::Blob => "BLOB NOT NULL",
        }
    }
}

/// One column of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name, unique within the table
    pub column_name: &'static str,
    /// Storage type
    pub column_type: ColumnType,
    /// Whether a UNIQUE constraint applies
    pub is_unique: bool,
}

impl ColumnMetadata {
    /// Non-unique column
    pub const fn new(column_name: &'static str, column_type: ColumnType) -> Self {
        Self {
            column_name,
            column_type,
            is_unique: false,
        }
    }

    /// Column with a UNIQUE constraint
    pub const fn unique(column_name: &'static str, column_type: ColumnType) -> Self {
        Self {
            column_name,
            column_type,
            is_unique: true,
        }
    }

    fn sql_definition(&self) -> String {
        if self.is_unique {
            format!(
                "\"{}\" {} UNIQUE ON CONFLICT FAIL",
                self.column_name,
                self.column_type.sql_definition()
            )
        } else {
            format!(
                "\"{}\" {}",
                self.column_name,
                self.column_type.sql_definition()
            )
        }
    }
}

/// Table name plus ordered columns for one model family
///
/// The statement text for every standard operation is rendered once, when
/// the descriptor is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    table_name: &'static str,
    columns: Vec<ColumnMetadata>,
    sql: StatementCache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatementCache {
    select: String,
    create_table: String,
    insert: String,
    update_by_id: String,
    delete_by_id: String,
    delete_by_unique_id: String,
    select_by_unique_id: String,
    select_unique_ids: String,
    exists: String,
    count: String,
}

impl StatementCache {
    fn render(table_name: &str, columns: &[ColumnMetadata]) -> Self {
        let column_list = columns
            .iter()
            .map(|c| format!("\"{}\"", c.column_name))
            .collect::<Vec<_>>()
            .join(", ");
        let definitions = columns
            .iter()
            .map(|c| c.sql_definition())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let assignments: Vec<String> = columns
            .iter()
            .filter(|c| c.column_type != ColumnType::PrimaryKey)
            .enumerate()
            .map(|(i, c)| format!("\"{}\" = ?{}", c.column_name, i + 1))
            .collect();
        let id_column = columns
            .iter()
            .find(|c| c.column_type == ColumnType::PrimaryKey)
            .map(|c| c.column_name)
            .unwrap_or(ID_COLUMN);

        let select = format!("SELECT {} FROM \"{}\"", column_list, table_name);
        Self {
            select_by_unique_id: format!("{} WHERE \"{}\" = ?1", select, UNIQUE_ID_COLUMN),
            select,
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
                table_name, definitions
            ),
            insert: format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                table_name, column_list, placeholders
            ),
            update_by_id: format!(
                "UPDATE \"{}\" SET {} WHERE \"{}\" = ?{}",
                table_name,
                assignments.join(", "),
                id_column,
                assignments.len() + 1
            ),
            delete_by_id: format!(
                "DELETE FROM \"{}\" WHERE \"{}\" = ?1",
                table_name, id_column
            ),
            delete_by_unique_id: format!(
                "DELETE FROM \"{}\" WHERE \"{}\" = ?1",
                table_name, UNIQUE_ID_COLUMN
            ),
            select_unique_ids: format!(
                "SELECT \"{}\" FROM \"{}\"",
                UNIQUE_ID_COLUMN, table_name
            ),
            exists: format!(
                "SELECT EXISTS(SELECT 1 FROM \"{}\" WHERE \"{}\" = ?1)",
                table_name, UNIQUE_ID_COLUMN
            ),
            count: format!("SELECT COUNT(*) FROM \"{}\"", table_name),
        }
    }
}

impl TableMetadata {
    /// Create a descriptor
    pub fn new(table_name: &'static str, columns: Vec<ColumnMetadata>) -> Self {
        let sql = StatementCache::render(table_name, &columns);
        Self {
            table_name,
            columns,
            sql,
        }
    }

    /// Table name
    pub fn table_name(&self) -> &'static str {
        self.table_name
    }

    /// Columns in on-disk order; the primary key comes first
    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    /// Check the structural invariants of the descriptor
    ///
    /// - at least one column
    /// - exactly one primary key, and it is the first column
    /// - column names are unique
    /// - an integer `recordType` column and a unique text `uniqueId` column
    pub fn validate(&self) -> Result<()> {
        if self.table_name.is_empty() {
            return Err(Error::Precondition("table name must not be empty".into()));
        }
        let Some(first) = self.columns.first() else {
            return Err(Error::Precondition(format!(
                "table {} has no columns",
                self.table_name
            )));
        };
        if first.column_type != ColumnType::PrimaryKey {
            return Err(Error::Precondition(format!(
                "first column of {} must be the primary key",
                self.table_name
            )));
        }
        let primary_keys = self
            .columns
            .iter()
            .filter(|c| c.column_type == ColumnType::PrimaryKey)
            .count();
        if primary_keys != 1 {
            return Err(Error::Precondition(format!(
                "table {} declares {} primary keys",
                self.table_name, primary_keys
            )));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.column_name) {
                return Err(Error::Precondition(format!(
                    "duplicate column {} in {}",
                    column.column_name, self.table_name
                )));
            }
        }
        match self.column(RECORD_TYPE_COLUMN) {
            Some(c) if c.column_type == ColumnType::Int64 => {}
            _ => {
                return Err(Error::Precondition(format!(
                    "table {} needs an Int64 {} column",
                    self.table_name, RECORD_TYPE_COLUMN
                )))
            }
        }
        match self.column(UNIQUE_ID_COLUMN) {
            Some(c) if c.column_type == ColumnType::UnicodeString && c.is_unique => {}
            _ => {
                return Err(Error::Precondition(format!(
                    "table {} needs a unique {} column",
                    self.table_name, UNIQUE_ID_COLUMN
                )))
            }
        }
        Ok(())
    }

    /// Column names in on-disk order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.column_name).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    /// Index of a column in on-disk order
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.column_name == name)
    }

    /// The primary-key column
    pub fn primary_key(&self) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|c| c.column_type == ColumnType::PrimaryKey)
    }

    /// Name of the column at `index`, or `"?"` when out of range
    pub fn column_name_at(&self, index: usize) -> &'static str {
        self.columns.get(index).map(|c| c.column_name).unwrap_or("?")
    }

    /// `table.column`
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.table_name, column)
    }

    /// `SELECT <all columns> FROM <table>`
    pub fn select_sql(&self) -> &str {
        &self.sql.select
    }

    /// `CREATE TABLE IF NOT EXISTS ...`
    pub fn create_table_sql(&self) -> &str {
        &self.sql.create_table
    }

    /// `INSERT` over every column, in on-disk order
    ///
    /// The row id binds to `?1` (NULL lets the store assign one); data values
    /// bind to `?2..?N`.
    pub fn insert_sql(&self) -> &str {
        &self.sql.insert
    }

    /// `UPDATE` of every non-primary-key column, matched on the primary key
    ///
    /// Data values bind to `?1..?N`; the row id binds to `?N+1`.
    pub fn update_by_id_sql(&self) -> &str {
        &self.sql.update_by_id
    }

    /// `DELETE` matched on the primary key (`?1`)
    pub fn delete_by_id_sql(&self) -> &str {
        &self.sql.delete_by_id
    }

    /// `DELETE` matched on the unique id (`?1`)
    pub fn delete_by_unique_id_sql(&self) -> &str {
        &self.sql.delete_by_unique_id
    }

    /// Full-row `SELECT` matched on the unique id (`?1`)
    pub fn select_by_unique_id_sql(&self) -> &str {
        &self.sql.select_by_unique_id
    }

    /// `SELECT uniqueId FROM <table>`
    pub fn select_unique_ids_sql(&self) -> &str {
        &self.sql.select_unique_ids
    }

    /// `SELECT EXISTS(...)` matched on the unique id (`?1`)
    pub fn exists_sql(&self) -> &str {
        &self.sql.exists
    }

    /// `SELECT COUNT(*) FROM <table>`
    pub fn count_sql(&self) -> &str {
        &self.sql.count
    }
}

impl fmt::Display for TableMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.table_name, self.column_names().join(", "))
    }
}
