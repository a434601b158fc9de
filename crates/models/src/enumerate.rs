//! Batched enumeration over a cursor
//!
//! Scans run through [`loop_batched`], so transient per-row state is released
//! every `batch_size` rows. Batch size never changes which models are
//! visited or their order.

use crate::cursor::ModelCursor;
use crate::record::SdsModel;
use sds_core::Result;
use sds_storage::{loop_batched, BatchingStats};
use tracing::{debug, error, warn};

/// Visit every model the cursor yields until it ends or `visit` sets stop
///
/// Rows that fail to decode are logged and skipped. A store failure mid-scan
/// ends the scan and is returned.
pub fn enumerate<M, F>(
    cursor: &mut ModelCursor<'_, '_, M>,
    batch_size: usize,
    mut visit: F,
) -> Result<BatchingStats>
where
    M: SdsModel,
    F: FnMut(M, &mut bool),
{
    let table = M::table().table_name();
    let mut failure = None;
    let stats = loop_batched(batch_size, |stop| match cursor.next() {
        Ok(Some(model)) => visit(model, stop),
        Ok(None) => *stop = true,
        Err(e) if e.is_decode_error() => {
            warn!(target: "sds::enumerate", table, error = %e, "Couldn't decode model; skipping");
        }
        Err(e) => {
            error!(target: "sds::enumerate", table, error = %e, "Enumeration aborted");
            failure = Some(e);
            *stop = true;
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }
    debug!(
        target: "sds::enumerate",
        table,
        rows = cursor.rows_read(),
        skipped = cursor.decode_failures(),
        releases = stats.releases,
        "Enumeration finished"
    );
    Ok(stats)
}
