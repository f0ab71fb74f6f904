//! Batch writer
//!
//! Validated records are written in bounded-size batches, in file order. A
//! failed batch is reported as one aggregate error naming the source-row
//! range it covered; later batches still run, so partial success is the
//! normal outcome of a bad batch, not a special case.

use tracing::{info, warn};

use super::store::CaseStore;
use crate::types::NewCase;

/// Rows per insert batch.
pub const BATCH_SIZE: usize = 500;

/// A validated record plus the spreadsheet row it came from, kept so batch
/// errors can point back at source rows.
#[derive(Debug)]
pub struct PendingCase {
    pub row_number: usize,
    pub record: NewCase,
}

/// Insert `pending` in batches of `batch_size`, appending one aggregate
/// error per failed batch. Returns the number of rows actually written.
pub async fn write_batches(
    store: &dyn CaseStore,
    pending: &[PendingCase],
    batch_size: usize,
    errors: &mut Vec<String>,
) -> u32 {
    let mut imported = 0u32;

    for batch in pending.chunks(batch_size) {
        let first_row = batch[0].row_number;
        let last_row = batch[batch.len() - 1].row_number;
        let records: Vec<NewCase> = batch.iter().map(|p| p.record.clone()).collect();

        match store.insert_batch(&records).await {
            Ok(()) => {
                imported += batch.len() as u32;
                info!(
                    "Inserted batch of {} cases (rows {} to {})",
                    batch.len(),
                    first_row,
                    last_row
                );
            }
            Err(e) => {
                warn!(
                    "Batch insert failed for rows {} to {}: {}",
                    first_row, last_row, e
                );
                errors.push(format!("Batch error (rows {first_row} to {last_row}): {e}"));
            }
        }
    }

    imported
}
