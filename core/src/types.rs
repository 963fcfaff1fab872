//! Table-level type definitions shared by the reader, writer and engine.

use serde::{Deserialize, Serialize};

/// Name prefix SQLite reserves for its internal catalog tables
/// (`sqlite_sequence`, `sqlite_stat1`, ...). Tables with this prefix are
/// never consolidated.
pub const RESERVED_TABLE_PREFIX: &str = "sqlite_";

/// A user table found in a source database's catalog.
///
/// `create_statement` is the DDL text exactly as the source stored it in
/// `sqlite_master`; it must be made idempotent before being replayed against
/// the destination.
///
/// # Examples
///
/// ```
/// use dbmerge_core::TableDescriptor;
///
/// let table = TableDescriptor::new("users", "CREATE TABLE users (id INTEGER PRIMARY KEY)");
/// assert_eq!(table.name, "users");
/// assert!(!table.is_reserved());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name as recorded in the catalog.
    pub name: String,
    /// Verbatim `CREATE TABLE` statement.
    pub create_statement: String,
}

impl TableDescriptor {
    /// Creates a descriptor from a name and its DDL.
    pub fn new(name: impl Into<String>, create_statement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_statement: create_statement.into(),
        }
    }

    /// Returns `true` for SQLite-internal tables.
    pub fn is_reserved(&self) -> bool {
        self.name.starts_with(RESERVED_TABLE_PREFIX)
    }
}

/// Optional allowlist restricting which tables are transferred.
///
/// An empty filter admits every table. Matching is exact and
/// case-sensitive.
///
/// # Examples
///
/// ```
/// use dbmerge_core::TableFilter;
///
/// let all = TableFilter::default();
/// assert!(all.admits("LOGS"));
///
/// let some = TableFilter::new(["USERS", "POSTS"]);
/// assert!(some.admits("USERS"));
/// assert!(!some.admits("LOGS"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    tables: Vec<String>,
}

impl TableFilter {
    /// Builds a filter from the given table names.
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if no tables were named.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns `true` if `table` should be transferred.
    pub fn admits(&self, table: &str) -> bool {
        self.tables.is_empty() || self.tables.iter().any(|name| name == table)
    }
}

/// Result of transferring one table from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// Excluded by the table filter; the destination was not touched.
    Skipped,
    /// Schema replayed and rows written.
    Copied {
        /// Rows read from the source table.
        rows_read: usize,
        /// Rows actually inserted; the rest were ignored as duplicates.
        rows_inserted: usize,
    },
    /// The transfer failed and was rolled back.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

impl TransferOutcome {
    /// Returns `true` for [`TransferOutcome::Copied`].
    pub fn is_copied(&self) -> bool {
        matches!(self, Self::Copied { .. })
    }

    /// Returns `true` for [`TransferOutcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Rows inserted into the destination, zero unless copied.
    pub fn rows_inserted(&self) -> usize {
        match self {
            Self::Copied { rows_inserted, .. } => *rows_inserted,
            _ => 0,
        }
    }
}
