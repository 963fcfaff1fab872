//! Run-level errors.
//!
//! Only failures that end a run live here. Per-table and per-source
//! failures are recorded in the [`Summary`](dbmerge_core::Summary) instead.

use thiserror::Error;

/// Errors that abort a consolidation run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] dbmerge_core::ConfigError),

    /// Discovery could not stat a root or list a directory.
    #[error("discovery failed: {0}")]
    Discovery(#[from] dbmerge_discovery::DiscoverError),

    /// The destination could not be opened or closed.
    #[error(transparent)]
    Destination(#[from] dbmerge_sqlite::SqliteError),

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
