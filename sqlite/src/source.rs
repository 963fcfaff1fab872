//! Read-only access to a source database.
//!
//! [`SourceDatabase`] opens a candidate file without write access, lists
//! its user tables from `sqlite_master`, and reads a table's rows in full.
//! Shadow tables owned by a virtual table (FTS5 `_data`, `_idx`, ...) are
//! not listed; they are rebuilt when the virtual table is replayed. The
//! connection closes when the value is dropped.

use std::path::{Path, PathBuf};

use dbmerge_core::{RESERVED_TABLE_PREFIX, TableDescriptor};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};

use crate::ddl::quote_ident;
use crate::error::{Result, SqliteError};

/// All rows of one table, with the column order shared by every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRows {
    /// Writable column names in declaration order. Generated and hidden
    /// columns are left out.
    pub columns: Vec<String>,
    /// Row values, each exactly `columns.len()` long.
    pub rows: Vec<Vec<Value>>,
}

impl TableRows {
    /// Returns `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A source database opened read-only.
///
/// # Examples
///
/// ```no_run
/// use dbmerge_sqlite::SourceDatabase;
///
/// let source = SourceDatabase::open("archive/2023.db").unwrap();
/// for table in source.list_tables().unwrap() {
///     let rows = source.read_rows(&table.name).unwrap();
///     println!("{}: {} rows", table.name, rows.rows.len());
/// }
/// ```
pub struct SourceDatabase {
    conn: Connection,
    path: PathBuf,
}

impl SourceDatabase {
    /// Opens `path` read-only.
    ///
    /// SQLite defers header validation until the first query, so a file that
    /// is not a database may open successfully and only fail in
    /// [`list_tables`](Self::list_tables).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::SourceUnreadable`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags).map_err(|source| {
            SqliteError::SourceUnreadable {
                path: path.clone(),
                source,
            }
        })?;
        Ok(Self { conn, path })
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lists user tables, excluding SQLite's internal `sqlite_*` tables and
    /// the shadow tables of virtual tables.
    ///
    /// Order follows the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::SourceUnreadable`] if the catalog cannot be
    /// read (not a database, corrupt, or locked).
    pub fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.query_catalog()
            .map_err(|source| SqliteError::SourceUnreadable {
                path: self.path.clone(),
                source,
            })
    }

    fn query_catalog(&self) -> rusqlite::Result<Vec<TableDescriptor>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.name, m.sql FROM sqlite_master AS m \
             JOIN pragma_table_list AS l ON l.schema = 'main' AND l.name = m.name \
             WHERE m.type = 'table' AND l.type != 'shadow' \
             AND substr(m.name, 1, ?1) != ?2 \
             ORDER BY m.rowid",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![RESERVED_TABLE_PREFIX.len() as i64, RESERVED_TABLE_PREFIX],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
        )?;

        let mut tables = Vec::new();
        for row in rows {
            // Tables without stored DDL cannot be replayed.
            if let (name, Some(sql)) = row? {
                tables.push(TableDescriptor::new(name, sql));
            }
        }
        Ok(tables)
    }

    /// Reads every row of `table`, restricted to its writable columns.
    ///
    /// Generated columns are recomputed by the destination and cannot be
    /// inserted, so they are not read. The whole table is materialised in
    /// memory.
    pub fn read_rows(&self, table: &str) -> Result<TableRows> {
        let columns = self.writable_columns(table)?;
        let width = columns.len();
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {column_list} FROM {}",
            quote_ident(table)
        ))?;

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TableRows { columns, rows })
    }

    /// Columns with `hidden = 0` in `table_xinfo`: neither generated
    /// (`2` virtual, `3` stored) nor hidden virtual-table columns (`1`).
    fn writable_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM pragma_table_xinfo(?1) WHERE hidden = 0 ORDER BY cid",
        )?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}
