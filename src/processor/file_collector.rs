//! # File Collector Module
//!
//! This module collects candidate files from a directory tree in a stable,
//! lexicographic order so repeated runs report files in the same sequence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 10] = [
  ".git",
  ".hg",
  ".svn",
  "node_modules",
  "__pycache__",
  ".venv",
  "venv",
  ".mypy_cache",
  ".pytest_cache",
  ".tox",
];

/// Returns `true` if the directory name is in [`DEFAULT_EXCLUDED_DIRS`].
pub fn is_default_excluded_dir(name: &str) -> bool {
  DEFAULT_EXCLUDED_DIRS.contains(&name)
}

/// One item produced by a directory traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
  /// A regular file to process
  File(PathBuf),

  /// An entry the traversal could not read; nothing below it was visited.
  Unreadable {
    /// The entry that failed, or the traversal root when unknown
    path: PathBuf,
    /// The underlying error
    reason: String,
  },
}

/// File collector for directory traversal.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileCollector;

impl FileCollector {
  /// Creates a new FileCollector.
  pub const fn new() -> Self {
    Self
  }

  /// Traverses a directory recursively and collects all regular files.
  ///
  /// Entries are sorted by file name at every level, symlinks are not
  /// followed (and not returned), and default-excluded directories are
  /// pruned. Entries that cannot be read are returned as
  /// [`WalkEntry::Unreadable`] in their traversal position.
  ///
  /// # Parameters
  ///
  /// * `dir` - The directory to traverse
  ///
  /// # Returns
  ///
  /// The entries found, in traversal order.
  pub fn traverse_directory(&self, dir: &Path) -> Result<Vec<WalkEntry>> {
    debug!("Scanning directory: {}", dir.display());
    let start_time = std::time::Instant::now();

    let mut entries = Vec::new();
    let walker = WalkDir::new(dir)
      .follow_links(false)
      .sort_by_file_name()
      .into_iter()
      .filter_entry(|entry| entry.depth() == 0 || !is_pruned(entry));

    for entry in walker {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          warn!("Error reading directory entry: {}", e);
          let path = e.path().unwrap_or(dir).to_path_buf();
          let reason = match e.io_error() {
            Some(io_error) => io_error.to_string(),
            None => e.to_string(),
          };
          entries.push(WalkEntry::Unreadable { path, reason });
          continue;
        }
      };

      if entry.file_type().is_file() {
        entries.push(WalkEntry::File(entry.into_path()));
      }
    }

    debug!(
      "Found {} entries in {}ms",
      entries.len(),
      start_time.elapsed().as_millis()
    );

    Ok(entries)
  }
}

fn is_pruned(entry: &DirEntry) -> bool {
  entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(is_default_excluded_dir)
}

/// Converts a potentially relative path to an absolute path.
///
/// # Parameters
///
/// * `path` - The path to absolutize
///
/// # Returns
///
/// The absolute path.
pub fn absolutize_path(path: &Path) -> Result<PathBuf> {
  if path.is_absolute() {
    Ok(path.to_path_buf())
  } else {
    let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;
    Ok(current_dir.join(path))
  }
}
