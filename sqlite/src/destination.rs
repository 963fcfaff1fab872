//! The shared, serialized destination database.
//!
//! [`Destination`] owns the only writable connection of a run. Every schema
//! replay and insert goes through its mutex, so any number of source
//! workers can hold a `&Destination` while writes reach SQLite one table at
//! a time.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use dbmerge_core::TableDescriptor;
use dbmerge_core::batch::plan_batches;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use tracing::debug;

use crate::ddl::{idempotent_create, insert_or_ignore_sql};
use crate::error::{Result, SqliteError};
use crate::source::TableRows;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Writable destination database behind a write-serialization lock.
///
/// # Examples
///
/// ```no_run
/// use dbmerge_sqlite::{Destination, SourceDatabase};
///
/// let destination = Destination::open("result.db").unwrap();
/// let source = SourceDatabase::open("a.db").unwrap();
/// for table in source.list_tables().unwrap() {
///     let rows = source.read_rows(&table.name).unwrap();
///     let inserted = destination.write_table(&table, &rows, 32_766).unwrap();
///     println!("{}: {inserted} new rows", table.name);
/// }
/// destination.close().unwrap();
/// ```
pub struct Destination {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Destination {
    /// Opens (or creates) the destination database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Destination`] if the file cannot be opened or
    /// created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let to_error = |source: rusqlite::Error| SqliteError::Destination {
            path: path.clone(),
            source,
        };
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags).map_err(to_error)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(to_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Path of the destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replays `table`'s schema and inserts `rows`, ignoring rows that
    /// violate a uniqueness constraint.
    ///
    /// Runs in a single transaction while holding the destination lock: on
    /// error nothing from this call is kept, including the table creation.
    /// Returns the number of rows actually inserted.
    ///
    /// # Errors
    ///
    /// - [`SqliteError::UnsupportedDdl`] if the stored DDL is not a table.
    /// - [`SqliteError::BatchError`] if a row is too wide for `max_params`.
    /// - [`SqliteError::DatabaseError`] for any SQLite failure.
    /// - [`SqliteError::DestinationPoisoned`] if a previous writer panicked.
    pub fn write_table(
        &self,
        table: &TableDescriptor,
        rows: &TableRows,
        max_params: usize,
    ) -> Result<usize> {
        let create = idempotent_create(&table.create_statement)?;
        let batches = if rows.is_empty() {
            Vec::new()
        } else {
            plan_batches(&rows.rows, rows.columns.len(), max_params)?
        };

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch(&create)?;

        let mut inserted = 0;
        for batch in batches {
            let sql = insert_or_ignore_sql(&table.name, &rows.columns, batch.len());
            let mut stmt = tx.prepare_cached(&sql)?;
            let affected = stmt.execute(params_from_iter(batch.iter().flatten()))?;
            debug!(
                table = table.name.as_str(),
                rows = batch.len(),
                inserted = affected,
                "Inserted batch"
            );
            inserted += affected;
        }

        tx.commit()?;
        Ok(inserted)
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| SqliteError::DestinationPoisoned)?;
        conn.close().map_err(|(_, err)| SqliteError::DatabaseError(err))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SqliteError::DestinationPoisoned)
    }
}
