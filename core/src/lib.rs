//! Core types shared across the dbmerge workspace.
//!
//! This crate holds everything that does not touch the filesystem or a
//! database connection:
//!
//! - [`TableDescriptor`]: a source table's name and original DDL.
//! - [`TableFilter`]: the optional table allowlist.
//! - [`TransferOutcome`], [`TableReport`], [`SourceReport`], [`Summary`]:
//!   per-table results and their run-level aggregation.
//! - [`MergeConfig`]: run configuration, loadable from YAML.
//! - [`batch`]: splitting rows into statements under a bind-parameter
//!   ceiling.
//!
//! # Example
//!
//! ```
//! use dbmerge_core::batch::{plan_batches, DEFAULT_MAX_BIND_PARAMETERS};
//! use dbmerge_core::MergeConfig;
//!
//! let config = MergeConfig::default().validate().unwrap();
//! assert_eq!(config.max_bind_parameters, DEFAULT_MAX_BIND_PARAMETERS);
//!
//! let rows = vec![vec!["a"; 4]; 10_000];
//! let batches = plan_batches(&rows, 4, config.max_bind_parameters).unwrap();
//! assert_eq!(batches.len(), 2);
//! ```

pub mod batch;
mod config;
mod report;
mod types;

pub use batch::BatchError;
pub use config::{
    ConfigError, DEFAULT_DESTINATION, DEFAULT_EXTENSIONS, MergeConfig, normalize_extensions,
};
pub use report::{SourceReport, Summary, TableReport};
pub use types::*;
