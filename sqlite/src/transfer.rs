//! Single-table transfer from a source into the destination.

use dbmerge_core::{TableDescriptor, TableFilter, TransferOutcome};
use tracing::{debug, error, info};

use crate::destination::Destination;
use crate::error::Result;
use crate::source::SourceDatabase;

/// Copies one table from `source` into `destination`.
///
/// Tables rejected by `filter` are skipped without touching the destination.
/// Otherwise the schema is replayed idempotently and all rows are inserted
/// with duplicates ignored. Failures are logged and returned as
/// [`TransferOutcome::Failed`]; they never propagate, so sibling tables are
/// unaffected.
pub fn transfer_table(
    source: &SourceDatabase,
    destination: &Destination,
    table: &TableDescriptor,
    filter: &TableFilter,
    max_params: usize,
) -> TransferOutcome {
    if !filter.admits(&table.name) {
        debug!(
            table = table.name.as_str(),
            source = %source.path().display(),
            "Skipping table not in allowlist"
        );
        return TransferOutcome::Skipped;
    }

    info!(
        table = table.name.as_str(),
        source = %source.path().display(),
        "Copying table"
    );

    match copy_rows(source, destination, table, max_params) {
        Ok((rows_read, rows_inserted)) => TransferOutcome::Copied {
            rows_read,
            rows_inserted,
        },
        Err(err) => {
            error!(
                table = table.name.as_str(),
                source = %source.path().display(),
                error = %err,
                "Failed to copy table"
            );
            TransferOutcome::Failed {
                reason: err.to_string(),
            }
        }
    }
}

fn copy_rows(
    source: &SourceDatabase,
    destination: &Destination,
    table: &TableDescriptor,
    max_params: usize,
) -> Result<(usize, usize)> {
    let rows = source.read_rows(&table.name)?;
    let inserted = destination.write_table(table, &rows, max_params)?;
    Ok((rows.rows.len(), inserted))
}
