//! Error types for source reading and destination writing.
//!
//! Provides a unified error type covering unreadable sources, destination
//! write failures, unsupported DDL, and batch planning failures.

use std::path::PathBuf;

use dbmerge_core::BatchError;
use thiserror::Error;

/// Errors that can occur while reading a source or writing the destination.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// A candidate file could not be opened or its catalog read.
    #[error("cannot read source database '{}': {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The destination database could not be opened.
    #[error("cannot open destination database '{}': {source}", path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite operation failure (reads, schema replay, inserts).
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The stored DDL is not a `CREATE TABLE` statement.
    #[error("unsupported table definition: {0}")]
    UnsupportedDdl(String),

    /// Rows could not be split into statements under the parameter limit.
    #[error("batch error: {0}")]
    BatchError(#[from] BatchError),

    /// Another writer panicked while holding the destination lock.
    #[error("destination lock poisoned by a panicked writer")]
    DestinationPoisoned,
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
