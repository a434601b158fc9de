//! Write coordination and whole-table operations
//!
//! [`AnyModel`] is an extension trait implemented for every [`SdsModel`]. It
//! provides the persistence operations of a model family:
//!
//! - writes: `any_insert`, `any_overwriting_update`, `any_update`,
//!   `any_upsert`, `any_remove`, `any_remove_all_with_instantiation`
//! - point reads: `any_fetch`, `any_exists`, `any_reload`, `fetch_one`
//! - scans: `any_enumerate`, `any_enumerate_batched`,
//!   `any_enumerate_unique_ids`, `any_fetch_all`, `any_all_unique_ids`,
//!   `any_count`, `with_cursor`, `with_query_cursor`
//!
//! Writes take a [`WriteTransaction`]; reads take a [`ReadTransaction`], which
//! a write handle dereferences to.
//!
//! ```rust,ignore
//! store.write(|tx| {
//!     let mut pack = KnownStickerPack::new(info);
//!     pack.any_insert(tx)?;
//!     pack.any_update(tx, |p| p.adjust_reference_count(1))?;
//!     Ok(())
//! })?;
//! ```

use crate::cursor::ModelCursor;
use crate::enumerate::enumerate;
use crate::record::{SdsModel, SdsRecord};
use sds_core::{precondition, Error, Result, WriteError, UNIQUE_ID_COLUMN};
use sds_storage::{loop_batched, Query, ReadTransaction, WriteTransaction};
use tracing::{debug, error, warn};

/// Which path an upsert took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row with the unique id existed; the model was inserted
    Inserted,
    /// A row existed and was overwritten
    Updated,
}

fn unique_id_is_valid(unique_id: &str) -> bool {
    precondition(!unique_id.is_empty(), "unique id must not be empty").is_ok()
}

fn not_persisted<M: SdsModel>(model: &M, operation: &str) -> Error {
    Error::Precondition(format!(
        "cannot {} {}: {:?} was never inserted",
        operation,
        M::table().table_name(),
        model.unique_id()
    ))
}

/// Persistence operations available on every model family
pub trait AnyModel: SdsModel {
    /// Insert a new row and record the assigned row id on the model
    ///
    /// A model that already carries a row id is re-inserted under that id.
    /// Fails with [`WriteError::EncodeFailed`] if a field cannot be archived
    /// (nothing is written) or [`WriteError::StoreRejected`] on a constraint
    /// violation such as a duplicate unique id.
    fn any_insert(&mut self, tx: &mut WriteTransaction<'_>) -> Result<()> {
        precondition(!self.unique_id().is_empty(), "unique id must not be empty")?;
        let table = Self::table();
        let record = self.as_record().map_err(WriteError::EncodeFailed)?;
        tx.execute(&Query::with_arguments(
            table.insert_sql(),
            record.column_values(),
        ))?;
        let row_id = tx.last_insert_rowid();
        match self.row_id() {
            None => self.update_row_id(row_id),
            Some(existing) => debug_assert_eq!(existing, row_id),
        }
        debug!(target: "sds::write", table = table.table_name(), unique_id = self.unique_id(), row_id, "Inserted");
        Ok(())
    }

    /// Replace every column of the existing row with this model's values
    ///
    /// The row is matched on row id. Fails with [`Error::NotFound`] if it no
    /// longer exists.
    fn any_overwriting_update(&self, tx: &mut WriteTransaction<'_>) -> Result<()> {
        let table = Self::table();
        let Some(row_id) = self.row_id() else {
            return Err(not_persisted(self, "update"));
        };
        let record = self.as_record().map_err(WriteError::EncodeFailed)?;
        let mut arguments = record.data_values();
        arguments.push(row_id.into());
        let changed = tx.execute(&Query::with_arguments(table.update_by_id_sql(), arguments))?;
        if changed == 0 {
            warn!(target: "sds::write", table = table.table_name(), unique_id = self.unique_id(), "Overwrite of missing row");
            return Err(Error::NotFound {
                table: table.table_name().to_string(),
                unique_id: self.unique_id().to_string(),
            });
        }
        debug!(target: "sds::write", table = table.table_name(), unique_id = self.unique_id(), row_id, "Updated");
        Ok(())
    }

    /// Read-modify-write update
    ///
    /// `mutate` is applied to `self` unconditionally, then the latest stored
    /// copy is fetched by unique id. If it is gone, nothing is written and
    /// `Ok(false)` is returned. Otherwise `mutate` is applied to the stored
    /// copy, which is written back, and `Ok(true)` is returned. Changes made by
    /// other writers to fields `mutate` does not touch are preserved.
    fn any_update<F>(&mut self, tx: &mut WriteTransaction<'_>, mut mutate: F) -> Result<bool>
    where
        F: FnMut(&mut Self),
    {
        mutate(self);
        let Some(mut db_copy) = Self::any_fetch(self.unique_id(), tx)? else {
            debug!(target: "sds::write", table = Self::table().table_name(), unique_id = self.unique_id(), "Skipping update of missing row");
            return Ok(false);
        };
        debug_assert!(!std::ptr::eq(self, &db_copy));
        mutate(&mut db_copy);
        db_copy.any_overwriting_update(tx)?;
        Ok(true)
    }

    /// Insert, or overwrite the row with the same unique id
    ///
    /// On the update path a model with no row id adopts the stored row's id.
    fn any_upsert(&mut self, tx: &mut WriteTransaction<'_>) -> Result<UpsertOutcome> {
        match Self::any_fetch(self.unique_id(), tx)? {
            None => {
                self.any_insert(tx)?;
                Ok(UpsertOutcome::Inserted)
            }
            Some(existing) => {
                if self.row_id().is_none() {
                    if let Some(row_id) = existing.row_id() {
                        self.update_row_id(row_id);
                    }
                }
                self.any_overwriting_update(tx)?;
                Ok(UpsertOutcome::Updated)
            }
        }
    }

    /// Delete this model's row
    ///
    /// Returns whether a row was deleted. Removing a missing row, or a model
    /// that was never inserted, is a no-op.
    fn any_remove(&self, tx: &mut WriteTransaction<'_>) -> Result<bool> {
        let table = Self::table();
        let Some(row_id) = self.row_id() else {
            return Ok(false);
        };
        let changed = tx.execute(&Query::new(table.delete_by_id_sql()).bind(row_id))?;
        debug!(target: "sds::write", table = table.table_name(), unique_id = self.unique_id(), removed = changed > 0, "Remove");
        Ok(changed > 0)
    }

    /// Replace this model with the latest stored copy
    ///
    /// Returns whether a reload happened. A missing row leaves the model
    /// untouched; it is logged unless `ignore_missing` is set.
    fn any_reload(&mut self, tx: &ReadTransaction<'_>, ignore_missing: bool) -> Result<bool> {
        match Self::any_fetch(self.unique_id(), tx)? {
            Some(latest) => {
                *self = latest;
                Ok(true)
            }
            None => {
                if !ignore_missing {
                    warn!(target: "sds::write", table = Self::table().table_name(), unique_id = self.unique_id(), "Could not reload missing row");
                }
                Ok(false)
            }
        }
    }

    /// Fetch one model by unique id
    ///
    /// An empty unique id is a caller bug: debug builds panic, release builds
    /// return `Ok(None)`. A row that exists but fails to decode is an error.
    fn any_fetch(unique_id: &str, tx: &ReadTransaction<'_>) -> Result<Option<Self>> {
        if !unique_id_is_valid(unique_id) {
            return Ok(None);
        }
        let query = Query::new(Self::table().select_by_unique_id_sql()).bind(unique_id);
        Self::fetch_one(tx, &query)
    }

    /// Whether a row with this unique id exists, without decoding it
    fn any_exists(unique_id: &str, tx: &ReadTransaction<'_>) -> Result<bool> {
        if !unique_id_is_valid(unique_id) {
            return Ok(false);
        }
        let query = Query::new(Self::table().exists_sql()).bind(unique_id);
        Ok(tx.query_i64(&query)? != 0)
    }

    /// Number of rows in the table
    fn any_count(tx: &ReadTransaction<'_>) -> Result<u64> {
        let count = tx.query_i64(&Query::new(Self::table().count_sql()))?;
        u64::try_from(count).map_err(|_| Error::Store(format!("negative row count {}", count)))
    }

    /// Decode the first row of an arbitrary full-row query
    fn fetch_one(tx: &ReadTransaction<'_>, query: &Query) -> Result<Option<Self>> {
        tx.query_row(query, |row| Ok(Self::decode_row(row)?))
    }

    /// Run `visit` with a cursor over the whole table
    fn with_cursor<R, F>(tx: &ReadTransaction<'_>, visit: F) -> R
    where
        F: FnOnce(&mut ModelCursor<'_, '_, Self>) -> R,
    {
        Self::with_query_cursor(tx, &Query::new(Self::table().select_sql()), visit)
    }

    /// Run `visit` with a cursor over an arbitrary full-row query
    ///
    /// `query` must select every column of the table in on-disk order.
    fn with_query_cursor<R, F>(tx: &ReadTransaction<'_>, query: &Query, visit: F) -> R
    where
        F: FnOnce(&mut ModelCursor<'_, '_, Self>) -> R,
    {
        tx.with_row_stream(query, |stream| {
            let mut cursor = ModelCursor::new(stream);
            visit(&mut cursor)
        })
    }

    /// Visit every model until `visit` sets stop
    ///
    /// `batch_size` 0 scans in one pass; otherwise transient state is released
    /// every `batch_size` rows. Undecodable rows are logged and skipped.
    fn any_enumerate<F>(tx: &ReadTransaction<'_>, batch_size: usize, visit: F) -> Result<()>
    where
        F: FnMut(Self, &mut bool),
    {
        Self::with_cursor(tx, |cursor| enumerate(cursor, batch_size, visit)).map(|_| ())
    }

    /// [`AnyModel::any_enumerate`] with the store's configured batch size, or
    /// unbatched
    fn any_enumerate_batched<F>(tx: &ReadTransaction<'_>, batched: bool, visit: F) -> Result<()>
    where
        F: FnMut(Self, &mut bool),
    {
        let batch_size = if batched { tx.default_batch_size() } else { 0 };
        Self::any_enumerate(tx, batch_size, visit)
    }

    /// Visit every unique id without decoding models
    fn any_enumerate_unique_ids<F>(
        tx: &ReadTransaction<'_>,
        batch_size: usize,
        mut visit: F,
    ) -> Result<()>
    where
        F: FnMut(String, &mut bool),
    {
        let table = Self::table();
        let query = Query::new(table.select_unique_ids_sql());
        tx.with_row_stream(&query, |stream| {
            let mut failure = None;
            loop_batched(batch_size, |stop| match stream.next_row() {
                Ok(Some(row)) => match row.get::<String>(0, UNIQUE_ID_COLUMN) {
                    Ok(unique_id) => visit(unique_id, stop),
                    Err(e) => {
                        warn!(target: "sds::enumerate", table = table.table_name(), error = %e, "Skipping unreadable unique id");
                    }
                },
                Ok(None) => *stop = true,
                Err(e) => {
                    error!(target: "sds::enumerate", table = table.table_name(), error = %e, "Unique id enumeration aborted");
                    failure = Some(e);
                    *stop = true;
                }
            });
            match failure {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }

    /// Every decodable model in the table, in store order
    fn any_fetch_all(tx: &ReadTransaction<'_>) -> Result<Vec<Self>> {
        Self::with_cursor(tx, |cursor| cursor.drain_all())
    }

    /// Every unique id in the table, in store order
    fn any_all_unique_ids(tx: &ReadTransaction<'_>) -> Result<Vec<String>> {
        let mut unique_ids = Vec::new();
        Self::any_enumerate_unique_ids(tx, 0, |unique_id, _| unique_ids.push(unique_id))?;
        Ok(unique_ids)
    }

    /// Remove every row, one model at a time
    ///
    /// Unique ids are collected first, then each model is fetched and removed
    /// individually. Rows that vanish meanwhile are logged and skipped; rows
    /// that no longer decode are deleted by unique id. Returns the number of
    /// rows removed.
    fn any_remove_all_with_instantiation(tx: &mut WriteTransaction<'_>) -> Result<usize> {
        let table = Self::table();
        let unique_ids = Self::any_all_unique_ids(tx)?;
        let mut removed = 0;
        for unique_id in &unique_ids {
            match Self::any_fetch(unique_id, tx) {
                Ok(Some(model)) => {
                    if model.any_remove(tx)? {
                        removed += 1;
                    }
                }
                Ok(None) => {
                    warn!(target: "sds::write", table = table.table_name(), unique_id = unique_id.as_str(), "Missing instance");
                }
                Err(e) if e.is_decode_error() => {
                    warn!(target: "sds::write", table = table.table_name(), unique_id = unique_id.as_str(), error = %e, "Removing undecodable row");
                    let query = Query::new(table.delete_by_unique_id_sql()).bind(unique_id.as_str());
                    removed += tx.execute(&query)?;
                }
                Err(e) => return Err(e),
            }
        }
        debug!(target: "sds::write", table = table.table_name(), removed, "Removed all");
        Ok(removed)
    }

    /// Copy through the record codec
    ///
    /// Yields a value equal to a field-by-field deep copy for any persisted
    /// model; a model with no row id is [`Error::Precondition`].
    fn deep_copy_using_record(&self) -> Result<Self> {
        if self.row_id().is_none() {
            return Err(not_persisted(self, "copy"));
        }
        let record = self.as_record()?;
        Ok(Self::from_record(record)?)
    }
}

impl<M: SdsModel> AnyModel for M {}
