//! Path classification for the discovery walk.

use std::fs;
use std::path::Path;

/// What a path means to the discovery walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    /// A directory to recurse into.
    Directory,
    /// A file carrying the given lower-cased extension.
    CandidateFile(String),
    /// A file without a usable extension.
    Irrelevant,
}

/// Classifies `path` as a directory, a candidate file, or irrelevant.
///
/// Paths whose metadata cannot be read are treated as files: entries below
/// a root come from a directory listing and are assumed to exist.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dbmerge_discovery::{PathKind, classify};
///
/// assert_eq!(
///     classify(Path::new("/no/such/dir/archive.SQLite")),
///     PathKind::CandidateFile("sqlite".to_string()),
/// );
/// assert_eq!(classify(Path::new("/no/such/dir/README")), PathKind::Irrelevant);
/// ```
pub fn classify(path: &Path) -> PathKind {
    if fs::metadata(path).is_ok_and(|meta| meta.is_dir()) {
        return PathKind::Directory;
    }
    match file_extension(path) {
        Some(ext) => PathKind::CandidateFile(ext),
        None => PathKind::Irrelevant,
    }
}

/// Returns the lower-cased text after the last `.` of the file name.
///
/// Unlike [`Path::extension`], a leading dot counts: `.db` has extension
/// `db`.
fn file_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
