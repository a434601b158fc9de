//! Forward-only model cursor
//!
//! A [`ModelCursor`] wraps a [`RowStream`] and decodes each row into a model
//! of family `M`. It lives inside the closure that created it, so it can
//! never outlive the transaction handle it reads from.
//!
//! States:
//!
//! - `Open`: rows may remain
//! - `Exhausted`: the result set ended; `next` keeps returning `Ok(None)`
//! - `Failed`: the query never ran or the store failed mid-scan; `next`
//!   returns `Ok(None)` from then on
//!
//! A row that fails to decode is reported as `Err` from `next` for that row
//! only; the cursor stays open and the following call moves on.

use crate::record::SdsModel;
use sds_core::Result;
use sds_storage::RowStream;
use std::marker::PhantomData;
use tracing::{error, warn};

/// Lifecycle state of a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// More rows may follow
    Open,
    /// The result set has ended
    Exhausted,
    /// The underlying query could not run or broke off
    Failed,
}

/// Forward-only sequence of models decoded from a row stream
pub struct ModelCursor<'c, 'stmt, M> {
    stream: &'c mut RowStream<'stmt>,
    state: CursorState,
    rows_read: usize,
    decode_failures: usize,
    _model: PhantomData<fn() -> M>,
}

impl<'c, 'stmt, M: SdsModel> ModelCursor<'c, 'stmt, M> {
    /// Wrap a row stream; a failed stream gives a failed cursor
    pub fn new(stream: &'c mut RowStream<'stmt>) -> Self {
        let state = if stream.is_failed() {
            CursorState::Failed
        } else {
            CursorState::Open
        };
        Self {
            stream,
            state,
            rows_read: 0,
            decode_failures: 0,
            _model: PhantomData,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Rows stepped over so far, decoded or not
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Rows that failed to decode so far
    pub fn decode_failures(&self) -> usize {
        self.decode_failures
    }

    /// Decode the next row
    ///
    /// `Ok(None)` once the cursor is exhausted or failed, on every call.
    pub fn next(&mut self) -> Result<Option<M>> {
        if self.state != CursorState::Open {
            return Ok(None);
        }
        let decoded = match self.stream.next_row() {
            Ok(Some(row)) => M::decode_row(&row),
            Ok(None) => {
                self.state = CursorState::Exhausted;
                return Ok(None);
            }
            Err(e) => {
                self.state = CursorState::Failed;
                error!(target: "sds::cursor", table = M::table().table_name(), error = %e, "Cursor step failed");
                return Err(e);
            }
        };
        self.rows_read += 1;
        match decoded {
            Ok(model) => Ok(Some(model)),
            Err(e) => {
                self.decode_failures += 1;
                Err(e.into())
            }
        }
    }

    /// Collect every remaining model
    ///
    /// Rows that fail to decode are logged and skipped; store failures
    /// propagate.
    pub fn drain_all(&mut self) -> Result<Vec<M>> {
        let mut models = Vec::new();
        loop {
            match self.next() {
                Ok(Some(model)) => models.push(model),
                Ok(None) => return Ok(models),
                Err(e) if e.is_decode_error() => {
                    warn!(target: "sds::cursor", table = M::table().table_name(), error = %e, "Skipping undecodable row");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
