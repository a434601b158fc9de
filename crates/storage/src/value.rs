//! Storable column values and raw queries
//!
//! [`ColumnValue`] is the primitive form every record column is flattened
//! to before it reaches the store: fixed-width integer, double, text or raw
//! bytes. [`Query`] pairs raw SQL with its ordered arguments for callers that
//! need custom predicates.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

/// A single storable column value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL NULL (only the unassigned primary key uses this)
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// Double
    Real(f64),
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Blob(Vec<u8>),
}

impl ColumnValue {
    /// Whether this is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Short type name, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Null => "null",
            ColumnValue::Integer(_) => "integer",
            ColumnValue::Real(_) => "real",
            ColumnValue::Text(_) => "text",
            ColumnValue::Blob(_) => "blob",
        }
    }
}

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            ColumnValue::Null => ValueRef::Null,
            ColumnValue::Integer(i) => ValueRef::Integer(*i),
            ColumnValue::Real(f) => ValueRef::Real(*f),
            ColumnValue::Text(s) => ValueRef::Text(s.as_bytes()),
            ColumnValue::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

impl From<ValueRef<'_>> for ColumnValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => ColumnValue::Null,
            ValueRef::Integer(i) => ColumnValue::Integer(i),
            ValueRef::Real(f) => ColumnValue::Real(f),
            ValueRef::Text(t) => ColumnValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => ColumnValue::Blob(b.to_vec()),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Real(value)
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(value: Vec<u8>) -> Self {
        ColumnValue::Blob(value)
    }
}

impl From<&[u8]> for ColumnValue {
    fn from(value: &[u8]) -> Self {
        ColumnValue::Blob(value.to_vec())
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

/// Raw SQL plus ordered arguments
///
/// ```
/// use sds_storage::Query;
///
/// let query = Query::new("SELECT * FROM model_KnownStickerPack WHERE referenceCount > ?1")
///     .bind(0i64);
/// assert_eq!(query.arguments().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    arguments: Vec<ColumnValue>,
}

impl Query {
    /// Query without arguments
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            arguments: Vec::new(),
        }
    }

    /// Append the next positional argument
    pub fn bind(mut self, value: impl Into<ColumnValue>) -> Self {
        self.arguments.push(value.into());
        self
    }

    /// Query with a prepared argument list
    pub fn with_arguments(sql: impl Into<String>, arguments: Vec<ColumnValue>) -> Self {
        Self {
            sql: sql.into(),
            arguments,
        }
    }

    /// SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Positional arguments
    pub fn arguments(&self) -> &[ColumnValue] {
        &self.arguments
    }
}
