//! The consolidation run: discover, fan out per source, aggregate.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use dbmerge_core::{MergeConfig, SourceReport, Summary, TableFilter, TableReport};
use dbmerge_discovery::discover_databases;
use dbmerge_sqlite::{Destination, SourceDatabase, transfer_table};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::EngineError;

/// Runs a consolidation described by a [`MergeConfig`].
#[derive(Debug, Clone)]
pub struct ConsolidationEngine {
    config: MergeConfig,
}

impl ConsolidationEngine {
    /// Validates `config` and builds an engine for it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is invalid.
    pub fn new(config: MergeConfig) -> Result<Self, EngineError> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Discovers sources and copies all their tables into the destination.
    ///
    /// Sources are processed concurrently; within a source, tables are
    /// copied one after another. A table or source that fails is recorded
    /// in the returned [`Summary`] and does not stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Discovery`] if discovery fails,
    /// [`EngineError::Destination`] if the destination cannot be opened or
    /// closed, and [`EngineError::ThreadPool`] if the worker pool cannot be
    /// built.
    pub fn run(&self) -> Result<Summary, EngineError> {
        let started = Instant::now();

        let discovered = discover_databases(&self.config.sources, &self.config.extensions)?;
        let mut sources = dedup_sources(discovered);
        exclude_destination(&mut sources, &self.config.destination);
        info!(count = sources.len(), "Found databases");

        let destination = Destination::open(&self.config.destination)?;
        let filter = self.config.table_filter();
        let max_params = self.config.max_bind_parameters;

        let jobs = self
            .config
            .jobs
            .unwrap_or_else(|| default_parallel_jobs(sources.len()));
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

        let reports: Vec<SourceReport> = pool.install(|| {
            sources
                .par_iter()
                .map(|path| transfer_source(path, &destination, &filter, max_params))
                .collect()
        });

        // Every source connection is gone by now; the destination goes last.
        destination.close()?;

        let destination_path = std::path::absolute(&self.config.destination)
            .unwrap_or_else(|_| self.config.destination.clone());
        let summary = Summary::from_sources(
            destination_path,
            reports,
            started.elapsed().as_secs_f64(),
            Utc::now().to_rfc3339(),
        );

        info!(
            databases = summary.databases_found,
            tables_copied = summary.tables_copied,
            tables_failed = summary.tables_failed,
            rows_inserted = summary.rows_inserted,
            elapsed_seconds = summary.elapsed_seconds,
            "Consolidation finished"
        );

        Ok(summary)
    }
}

/// Copies every table of the database at `path` into `destination`.
///
/// A source that cannot be opened or whose catalog cannot be read is
/// reported with its error and no tables. The source connection is closed
/// before this returns.
pub fn transfer_source(
    path: &Path,
    destination: &Destination,
    filter: &TableFilter,
    max_params: usize,
) -> SourceReport {
    let opened = SourceDatabase::open(path).and_then(|source| {
        let tables = source.list_tables()?;
        Ok((source, tables))
    });

    let (source, tables) = match opened {
        Ok(opened) => opened,
        Err(err) => {
            warn!(source = %path.display(), error = %err, "Skipping unreadable database");
            return SourceReport::unreadable(path, err.to_string());
        }
    };

    let tables = tables
        .iter()
        .map(|table| TableReport {
            table: table.name.clone(),
            outcome: transfer_table(&source, destination, table, filter, max_params),
        })
        .collect();

    SourceReport {
        path: path.to_path_buf(),
        tables,
        error: None,
    }
}

/// Sorts sources and removes files reached through more than one root.
///
/// Paths are compared after `fs::canonicalize`, so `a/x.db` and
/// `a/../a/x.db` are the same source. A path that cannot be canonicalised
/// is kept as discovered.
fn dedup_sources(sources: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = sources
        .into_iter()
        .map(|path| fs::canonicalize(&path).unwrap_or(path))
        .collect();
    sources.sort();
    sources.dedup();
    sources
}

/// Drops any discovered source that is the destination file itself.
fn exclude_destination(sources: &mut Vec<PathBuf>, destination: &Path) {
    let Ok(target) = fs::canonicalize(destination) else {
        return;
    };
    sources.retain(|path| {
        let is_destination = fs::canonicalize(path).is_ok_and(|p| p == target);
        if is_destination {
            warn!(path = %path.display(), "Ignoring destination found among sources");
        }
        !is_destination
    });
}

fn default_parallel_jobs(source_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(source_count.max(1))
}
