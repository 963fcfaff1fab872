//! Consolidation of many SQLite databases into one.
//!
//! [`ConsolidationEngine`] ties the workspace together: it discovers source
//! databases, opens the shared [`Destination`](dbmerge_sqlite::Destination),
//! and transfers every source concurrently on a rayon pool. Destination
//! writes are serialized by the destination's lock; reads from distinct
//! sources run in parallel.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use dbmerge_core::MergeConfig;
//! use dbmerge_engine::ConsolidationEngine;
//!
//! let config = MergeConfig {
//!     sources: vec![PathBuf::from("./databases"), PathBuf::from("./download")],
//!     destination: PathBuf::from("./result.db"),
//!     tables: vec!["USERS".into(), "POSTS".into()],
//!     ..MergeConfig::default()
//! };
//!
//! let summary = ConsolidationEngine::new(config).unwrap().run().unwrap();
//! println!(
//!     "Copied {} tables from {} databases",
//!     summary.tables_copied, summary.databases_found
//! );
//! ```

mod engine;
mod error;

pub use engine::{ConsolidationEngine, transfer_source};
pub use error::EngineError;
