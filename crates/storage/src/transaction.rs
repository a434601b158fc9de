//! Read and write transaction handles
//!
//! A [`ReadTransaction`] grants read-only access for the duration of a
//! [`crate::Store::read`] closure; a [`WriteTransaction`] grants exclusive
//! read-write access for the duration of a [`crate::Store::write`] closure.
//! Write handles dereference to read handles, so every read operation
//! accepts either kind while write operations only accept a write handle.
//!
//! Handles borrow the store's connection: nothing derived from a handle
//! (rows, streams, cursors) can outlive it.

use crate::corruption::{read_error, write_error, CorruptionState};
use crate::value::{ColumnValue, Query};
use rusqlite::types::FromSql;
use rusqlite::{params_from_iter, CachedStatement, Connection, Row, Rows};
use sds_core::{DecodeError, Result};
use std::ops::Deref;
use tracing::error;

/// Scoped read-only access to the store
pub struct ReadTransaction<'conn> {
    conn: &'conn Connection,
    corruption: &'conn CorruptionState,
    batch_size: usize,
}

impl<'conn> ReadTransaction<'conn> {
    pub(crate) fn new(
        conn: &'conn Connection,
        corruption: &'conn CorruptionState,
        batch_size: usize,
    ) -> Self {
        Self {
            conn,
            corruption,
            batch_size,
        }
    }

    /// Batch size batched enumeration uses when the caller gives none
    pub fn default_batch_size(&self) -> usize {
        self.batch_size
    }

    /// The underlying connection, for callers that need raw SQLite access
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// The owning store's corruption flags
    pub fn corruption(&self) -> &'conn CorruptionState {
        self.corruption
    }

    fn read_failure(&self, err: rusqlite::Error) -> sds_core::Error {
        self.corruption.flag_read_corruption_if_necessary(&err);
        read_error(err)
    }

    /// Prepare (or fetch from the statement cache) a statement
    pub fn prepare(&self, sql: &str) -> Result<CachedStatement<'conn>> {
        self.conn
            .prepare_cached(sql)
            .map_err(|e| self.read_failure(e))
    }

    /// Run `query` and decode its first row, if any
    pub fn query_row<T>(
        &self,
        query: &Query,
        decode: impl FnOnce(&RowReader<'_>) -> Result<T>,
    ) -> Result<Option<T>> {
        let mut statement = self.prepare(query.sql())?;
        let mut rows = statement
            .query(params_from_iter(query.arguments().iter()))
            .map_err(|e| self.read_failure(e))?;
        match rows.next().map_err(|e| self.read_failure(e))? {
            Some(row) => Ok(Some(decode(&RowReader::new(row))?)),
            None => Ok(None),
        }
    }

    /// Run a query returning one integer (`COUNT(*)`, `EXISTS(...)`)
    pub fn query_i64(&self, query: &Query) -> Result<i64> {
        let value = self.query_row(query, |row| Ok(row.get::<i64>(0, "?")?))?;
        Ok(value.unwrap_or(0))
    }

    /// Run `query` and hand its rows to `visit` as a lending stream
    ///
    /// If the statement cannot be prepared or executed, the failure is logged,
    /// corruption is flagged when applicable, and `visit` receives a failed
    /// stream that yields no rows.
    pub fn with_row_stream<R>(&self, query: &Query, visit: impl FnOnce(&mut RowStream<'_>) -> R) -> R {
        let mut statement = match self.conn.prepare_cached(query.sql()) {
            Ok(statement) => Some(statement),
            Err(e) => {
                self.report_query_failure(query, &e);
                None
            }
        };
        let rows = match statement.as_mut() {
            Some(statement) => match statement.query(params_from_iter(query.arguments().iter())) {
                Ok(rows) => Some(rows),
                Err(e) => {
                    self.report_query_failure(query, &e);
                    None
                }
            },
            None => None,
        };
        let mut stream = RowStream {
            rows,
            corruption: self.corruption,
        };
        visit(&mut stream)
    }

    fn report_query_failure(&self, query: &Query, err: &rusqlite::Error) {
        self.corruption.flag_read_corruption_if_necessary(err);
        error!(target: "sds::store", sql = query.sql(), error = %err, "Read failed");
    }
}

/// Scoped exclusive read-write access to the store
pub struct WriteTransaction<'conn> {
    read: ReadTransaction<'conn>,
}

impl<'conn> WriteTransaction<'conn> {
    pub(crate) fn new(
        conn: &'conn Connection,
        corruption: &'conn CorruptionState,
        batch_size: usize,
    ) -> Self {
        Self {
            read: ReadTransaction::new(conn, corruption, batch_size),
        }
    }

    fn write_failure(&self, err: rusqlite::Error) -> sds_core::Error {
        self.read
            .corruption
            .flag_write_corruption_if_necessary(&err);
        write_error(err)
    }

    /// Execute a statement, returning the number of rows changed
    pub fn execute(&mut self, query: &Query) -> Result<usize> {
        let mut statement = self
            .read
            .conn
            .prepare_cached(query.sql())
            .map_err(|e| self.write_failure(e))?;
        statement
            .execute(params_from_iter(query.arguments().iter()))
            .map_err(|e| self.write_failure(e))
    }

    /// Execute several `;`-separated statements without arguments
    pub fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.read
            .conn
            .execute_batch(sql)
            .map_err(|e| self.write_failure(e))
    }

    /// Row id assigned by the most recent successful INSERT on this connection
    pub fn last_insert_rowid(&self) -> i64 {
        self.read.conn.last_insert_rowid()
    }
}

impl<'conn> Deref for WriteTransaction<'conn> {
    type Target = ReadTransaction<'conn>;

    fn deref(&self) -> &Self::Target {
        &self.read
    }
}

/// One row of a result set, with column-aware decode errors
pub struct RowReader<'row> {
    row: &'row Row<'row>,
}

impl<'row> RowReader<'row> {
    fn new(row: &'row Row<'row>) -> Self {
        Self { row }
    }

    /// Read column `index`, reporting failures against `column`
    pub fn get<T: FromSql>(&self, index: usize, column: &str) -> std::result::Result<T, DecodeError> {
        self.row
            .get(index)
            .map_err(|e| DecodeError::malformed(column, e.to_string()))
    }

    /// Read column `index` as an untyped value
    pub fn value(&self, index: usize, column: &str) -> std::result::Result<ColumnValue, DecodeError> {
        self.row
            .get_ref(index)
            .map(ColumnValue::from)
            .map_err(|e| DecodeError::malformed(column, e.to_string()))
    }

    /// Number of columns in the row
    pub fn column_count(&self) -> usize {
        self.row.as_ref().column_count()
    }
}

/// Lending stream over the rows of an executing statement
///
/// Created by [`ReadTransaction::with_row_stream`]. A stream whose statement
/// failed to execute is "failed" and yields no rows.
pub struct RowStream<'stmt> {
    rows: Option<Rows<'stmt>>,
    corruption: &'stmt CorruptionState,
}

impl<'stmt> RowStream<'stmt> {
    /// Whether the underlying statement could not be executed
    pub fn is_failed(&self) -> bool {
        self.rows.is_none()
    }

    /// Step to the next row
    ///
    /// Returns `Ok(None)` once the result set is exhausted (and on every call
    /// after that), or immediately for a failed stream.
    pub fn next_row(&mut self) -> Result<Option<RowReader<'_>>> {
        let corruption = self.corruption;
        let Some(rows) = self.rows.as_mut() else {
            return Ok(None);
        };
        match rows.next() {
            Ok(Some(row)) => Ok(Some(RowReader::new(row))),
            Ok(None) => Ok(None),
            Err(e) => {
                corruption.flag_read_corruption_if_necessary(&e);
                Err(read_error(e))
            }
        }
    }
}
