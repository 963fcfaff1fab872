//! Row batching under a bind-parameter ceiling.
//!
//! A multi-row `INSERT` carries one bind parameter per value, so the number
//! of rows per statement is bounded by `max_params / column_count`. The
//! planner splits a table's rows into contiguous slices that respect this
//! bound without reordering or dropping anything.

use thiserror::Error;

/// SQLite's default `SQLITE_MAX_VARIABLE_NUMBER` since 3.32.0.
pub const DEFAULT_MAX_BIND_PARAMETERS: usize = 32_766;

/// Errors raised while planning batches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// The parameter ceiling was zero.
    #[error("bind parameter limit must be at least 1")]
    InvalidLimit,

    /// Rows were supplied without any columns.
    #[error("rows have no columns")]
    NoColumns,

    /// A single row needs more parameters than one statement may carry.
    #[error("row has {columns} columns but a statement may bind at most {max_params} parameters")]
    RowTooWide { columns: usize, max_params: usize },

    /// A row's value count differs from the table's column count.
    #[error("row {index} has {found} values, expected {expected}")]
    RaggedRow {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Number of rows that fit in one statement, or an error if not even one does.
///
/// # Examples
///
/// ```
/// use dbmerge_core::batch::{batch_size, BatchError};
///
/// assert_eq!(batch_size(3, 10), Ok(3));
/// assert_eq!(batch_size(10, 10), Ok(1));
/// assert!(matches!(batch_size(11, 10), Err(BatchError::RowTooWide { .. })));
/// ```
pub fn batch_size(column_count: usize, max_params: usize) -> Result<usize, BatchError> {
    if max_params == 0 {
        return Err(BatchError::InvalidLimit);
    }
    if column_count == 0 {
        return Err(BatchError::NoColumns);
    }
    if column_count > max_params {
        return Err(BatchError::RowTooWide {
            columns: column_count,
            max_params,
        });
    }
    Ok(max_params / column_count)
}

/// Splits `rows` into order-preserving batches of at most
/// `max_params / column_count` rows each.
///
/// Every row must hold exactly `column_count` values. An empty input yields
/// no batches.
///
/// # Errors
///
/// - [`BatchError::RowTooWide`] if `column_count > max_params`.
/// - [`BatchError::RaggedRow`] if any row's length differs from `column_count`.
/// - [`BatchError::InvalidLimit`] / [`BatchError::NoColumns`] for degenerate
///   limits.
///
/// # Examples
///
/// ```
/// use dbmerge_core::batch::plan_batches;
///
/// let rows = vec![vec![1, 2], vec![3, 4], vec![5, 6]];
/// let batches = plan_batches(&rows, 2, 4).unwrap();
/// assert_eq!(batches.len(), 2);
/// assert_eq!(batches[0], &rows[..2]);
/// assert_eq!(batches[1], &rows[2..]);
/// ```
pub fn plan_batches<T>(
    rows: &[Vec<T>],
    column_count: usize,
    max_params: usize,
) -> Result<Vec<&[Vec<T>]>, BatchError> {
    let size = batch_size(column_count, max_params)?;

    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != column_count)
    {
        return Err(BatchError::RaggedRow {
            index,
            expected: column_count,
            found: row.len(),
        });
    }

    Ok(rows.chunks(size).collect())
}
