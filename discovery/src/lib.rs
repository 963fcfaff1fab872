//! Discovery of SQLite database files on disk.
//!
//! Walks one or more roots and returns every file whose extension marks it
//! as a candidate database. Directory listings fan out over the rayon pool,
//! so a wide tree is scanned concurrently.
//!
//! # Main entry points
//!
//! - [`discover_databases`]: recursive walk over a set of roots.
//! - [`classify`]: decides whether a single path is a directory, a
//!   candidate file, or irrelevant.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use dbmerge_discovery::discover_databases;
//!
//! let found = discover_databases(
//!     &[PathBuf::from("./databases")],
//!     &["db".to_string(), "sqlite".to_string()],
//! )
//! .unwrap();
//! println!("found {} databases", found.len());
//! ```

mod classify;
mod discover;

pub use classify::{PathKind, classify};
pub use discover::{DiscoverError, discover_databases};
