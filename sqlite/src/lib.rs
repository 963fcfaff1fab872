//! SQLite reading and writing for table consolidation.
//!
//! This crate provides the database-facing half of dbmerge: reading tables
//! out of source databases and replaying them into one shared destination.
//!
//! # Architecture
//!
//! The crate is organized into four modules:
//!
//! - **`source`**: read-only [`SourceDatabase`]: catalog listing and row reads
//! - **`destination`**: [`Destination`], the single writable connection
//!   behind a mutex
//! - **`ddl`**: identifier quoting, idempotent `CREATE TABLE`, and
//!   `INSERT OR IGNORE` generation
//! - **`transfer`**: [`transfer_table`], the per-table copy with failure
//!   isolation
//!
//! # Quick start
//!
//! ```no_run
//! use dbmerge_core::TableFilter;
//! use dbmerge_sqlite::{Destination, SourceDatabase, transfer_table};
//!
//! let destination = Destination::open("result.db").unwrap();
//! let source = SourceDatabase::open("archive/2023.db").unwrap();
//!
//! for table in source.list_tables().unwrap() {
//!     let outcome = transfer_table(&source, &destination, &table, &TableFilter::default(), 32_766);
//!     println!("{}: {outcome:?}", table.name);
//! }
//!
//! drop(source);
//! destination.close().unwrap();
//! ```
//!
//! # Duplicate handling
//!
//! Rows are written with SQLite's `INSERT OR IGNORE`. A row that would
//! violate a PRIMARY KEY, UNIQUE, NOT NULL or CHECK constraint in the
//! destination is dropped silently; foreign key violations are not covered
//! by `OR IGNORE`.

mod ddl;
mod destination;
mod error;
mod source;
mod transfer;

pub use ddl::idempotent_create;
pub use destination::Destination;
pub use error::{Result, SqliteError};
pub use source::{SourceDatabase, TableRows};
pub use transfer::transfer_table;
