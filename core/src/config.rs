//! Run configuration for a consolidation.
//!
//! The configuration can be built in code, loaded from a YAML file, or
//! assembled by the CLI from flags layered on top of a file.
//!
//! # Example YAML
//!
//! ```yaml
//! sources:
//!   - ./databases
//!   - ./download
//! destination: ./result.db
//! extensions:
//!   - db
//!   - sqlite
//! tables:
//!   - USERS
//!   - POSTS
//! jobs: 4
//! max_bind_parameters: 32766
//! ```

use std::collections::BTreeSet;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::DEFAULT_MAX_BIND_PARAMETERS;
use crate::TableFilter;

/// Destination used when none is configured.
pub const DEFAULT_DESTINATION: &str = "./result.db";

/// File extensions treated as SQLite databases when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["db", "sqlite"];

/// Errors raised while loading or validating a [`MergeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for this schema.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A field holds a value the engine cannot run with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one consolidation run.
///
/// # Examples
///
/// ```
/// use dbmerge_core::MergeConfig;
///
/// let config = MergeConfig {
///     extensions: vec![".DB".into(), "sqlite".into(), "db".into()],
///     ..MergeConfig::default()
/// }
/// .validate()
/// .unwrap();
///
/// assert_eq!(config.extensions, vec!["db".to_string(), "sqlite".to_string()]);
/// assert!(config.table_filter().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Files or directories to search for databases.
    pub sources: Vec<PathBuf>,
    /// Database that receives every table; created if absent.
    pub destination: PathBuf,
    /// Extensions (without dot) identifying candidate database files.
    pub extensions: Vec<String>,
    /// Tables to transfer; empty transfers all tables.
    pub tables: Vec<String>,
    /// Worker threads for per-source transfers (`None` = adaptive default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Maximum bind parameters per `INSERT` statement.
    pub max_bind_parameters: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            sources: vec![PathBuf::from(".")],
            destination: PathBuf::from(DEFAULT_DESTINATION),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            tables: Vec::new(),
            jobs: None,
            max_bind_parameters: DEFAULT_MAX_BIND_PARAMETERS,
        }
    }
}

impl MergeConfig {
    /// Loads configuration from a YAML file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Checks the configuration and returns it with normalised extensions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty source list, an empty
    /// extension set, `jobs: 0`, or a zero parameter ceiling.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one source path is required".to_string(),
            ));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "destination path must not be empty".to_string(),
            ));
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::Invalid("jobs must be at least 1".to_string()));
        }
        if self.max_bind_parameters == 0 {
            return Err(ConfigError::Invalid(
                "max_bind_parameters must be at least 1".to_string(),
            ));
        }

        self.extensions = normalize_extensions(&self.extensions);
        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one file extension is required".to_string(),
            ));
        }

        Ok(self)
    }

    /// Table allowlist as a [`TableFilter`].
    pub fn table_filter(&self) -> TableFilter {
        TableFilter::new(self.tables.iter().cloned())
    }
}

/// Strips leading dots, lower-cases, and de-duplicates extensions,
/// preserving first-seen order. Blank entries are dropped.
///
/// # Examples
///
/// ```
/// use dbmerge_core::normalize_extensions;
///
/// let exts = normalize_extensions(&[".db".into(), "SQLite".into(), " ".into(), "db".into()]);
/// assert_eq!(exts, vec!["db".to_string(), "sqlite".to_string()]);
/// ```
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .filter(|ext| seen.insert(ext.clone()))
        .collect()
}
