//! Recursive discovery of candidate database files.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::classify::{PathKind, classify};

/// Typed error for database discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    /// A configured root does not exist.
    #[error("source path '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// A root could not be stat'ed or a directory could not be listed.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Walks every root and returns the files whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively and must be given without a
/// leading dot. Directories are listed and their children walked in
/// parallel on the current rayon pool. The result order is unspecified.
///
/// # Errors
///
/// Returns [`DiscoverError::NotFound`] if a root does not exist, and
/// [`DiscoverError::Io`] if any directory in the tree cannot be listed. No
/// partial result is returned.
pub fn discover_databases(
    roots: &[PathBuf],
    extensions: &[String],
) -> Result<Vec<PathBuf>, DiscoverError> {
    let extensions: BTreeSet<String> = extensions
        .iter()
        .map(|ext| ext.to_ascii_lowercase())
        .collect();

    let per_root: Vec<Vec<PathBuf>> = roots
        .par_iter()
        .map(|root| {
            let root = resolve_root(root)?;
            walk(&root, &extensions)
        })
        .collect::<Result<_, _>>()?;

    Ok(per_root.into_iter().flatten().collect())
}

/// Makes `root` absolute and checks that it exists.
fn resolve_root(root: &Path) -> Result<PathBuf, DiscoverError> {
    let resolved = std::path::absolute(root).map_err(|source| DiscoverError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    match fs::metadata(&resolved) {
        Ok(_) => Ok(resolved),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(DiscoverError::NotFound(resolved))
        }
        Err(source) => Err(DiscoverError::Io {
            path: resolved,
            source,
        }),
    }
}

fn walk(path: &Path, extensions: &BTreeSet<String>) -> Result<Vec<PathBuf>, DiscoverError> {
    match classify(path) {
        PathKind::Directory => {
            info!(dir = %path.display(), "Searching for databases");
            let children = list_dir(path)?;
            let nested: Vec<Vec<PathBuf>> = children
                .into_par_iter()
                .map(|child| walk(&child, extensions))
                .collect::<Result<_, _>>()?;
            Ok(nested.into_iter().flatten().collect())
        }
        PathKind::CandidateFile(ext) if extensions.contains(&ext) => {
            debug!(path = %path.display(), "Found candidate database");
            Ok(vec![path.to_path_buf()])
        }
        PathKind::CandidateFile(_) | PathKind::Irrelevant => Ok(Vec::new()),
    }
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, DiscoverError> {
    let to_error = |source: io::Error| DiscoverError::Io {
        path: dir.to_path_buf(),
        source,
    };
    fs::read_dir(dir)
        .map_err(to_error)?
        .map(|entry| entry.map(|entry| entry.path()).map_err(to_error))
        .collect()
}
