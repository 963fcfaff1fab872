//! Per-table, per-source and run-level reporting.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::TransferOutcome;

/// Outcome of a single table within a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    /// Table name.
    pub table: String,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: TransferOutcome,
}

/// Everything that happened to one source database.
///
/// `error` is set when the source could not be opened or its catalog could
/// not be read; in that case `tables` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Path of the source database.
    pub path: PathBuf,
    /// Per-table outcomes, in catalog order.
    pub tables: Vec<TableReport>,
    /// Source-level failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceReport {
    /// Creates a report for a source that could not be read at all.
    pub fn unreadable(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tables: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Number of tables copied from this source.
    pub fn tables_copied(&self) -> usize {
        self.tables.iter().filter(|t| t.outcome.is_copied()).count()
    }

    /// Number of tables that failed.
    pub fn tables_failed(&self) -> usize {
        self.tables.iter().filter(|t| t.outcome.is_failed()).count()
    }

    /// Rows inserted from this source.
    pub fn rows_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.outcome.rows_inserted()).sum()
    }
}

/// Run-level summary returned by the consolidation engine.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use dbmerge_core::{SourceReport, Summary, TableReport, TransferOutcome};
///
/// let source = SourceReport {
///     path: PathBuf::from("a.db"),
///     tables: vec![TableReport {
///         table: "users".into(),
///         outcome: TransferOutcome::Copied { rows_read: 3, rows_inserted: 2 },
///     }],
///     error: None,
/// };
/// let summary = Summary::from_sources(PathBuf::from("result.db"), vec![source], 0.5, "2024-01-15T10:30:00Z");
/// assert_eq!(summary.databases_found, 1);
/// assert_eq!(summary.tables_copied, 1);
/// assert_eq!(summary.rows_inserted, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Number of source databases processed.
    pub databases_found: usize,
    /// Tables successfully copied, summed over all sources.
    pub tables_copied: usize,
    /// Tables that failed, summed over all sources.
    pub tables_failed: usize,
    /// Rows inserted into the destination.
    pub rows_inserted: usize,
    /// Destination database path.
    pub destination: PathBuf,
    /// Wall-clock duration of the run.
    pub elapsed_seconds: f64,
    /// ISO-8601 timestamp of when the run finished.
    pub generated_at: String,
    /// Per-source detail.
    pub sources: Vec<SourceReport>,
}

impl Summary {
    /// Aggregates per-source reports into a summary.
    pub fn from_sources(
        destination: PathBuf,
        sources: Vec<SourceReport>,
        elapsed_seconds: f64,
        generated_at: impl Into<String>,
    ) -> Self {
        Self {
            databases_found: sources.len(),
            tables_copied: sources.iter().map(SourceReport::tables_copied).sum(),
            tables_failed: sources.iter().map(SourceReport::tables_failed).sum(),
            rows_inserted: sources.iter().map(SourceReport::rows_inserted).sum(),
            destination,
            elapsed_seconds,
            generated_at: generated_at.into(),
            sources,
        }
    }
}
