//! # File I/O Module
//!
//! This module provides file reading and writing utilities for the processor.
//! Reads are whole-file; writes go through a temporary file in the same
//! directory that is renamed over the target, so a file is either fully
//! rewritten or left as it was.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for single-file access.
///
/// These never abort a walk; the processor records them as an `error` result
/// for the file.
#[derive(Debug, thiserror::Error)]
pub enum FileAccessError {
  /// The file does not exist.
  #[error("file not found")]
  NotFound(PathBuf),

  /// The path exists but is not a regular file.
  #[error("not a regular file")]
  NotAFile(PathBuf),

  /// The file cannot be rewritten because it is read-only.
  #[error("file is read-only")]
  ReadOnly(PathBuf),

  /// Reading failed.
  #[error("failed to read file: {source}")]
  Read { path: PathBuf, source: std::io::Error },

  /// Writing failed; the original file is unchanged.
  #[error("failed to write file: {source}")]
  Write { path: PathBuf, source: std::io::Error },
}

/// Result of reading a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
  /// The file is valid UTF-8.
  Text(String),

  /// The file is not valid UTF-8 and must not be rewritten.
  Binary,
}

/// File I/O operations for the processor.
///
/// This struct provides static methods for reading and writing files.
pub struct FileIO;

impl FileIO {
  /// Reads the whole file.
  ///
  /// # Errors
  ///
  /// Returns [`FileAccessError::NotFound`] for missing paths,
  /// [`FileAccessError::NotAFile`] for directories and other non-files, and
  /// [`FileAccessError::Read`] for any other I/O failure.
  pub fn read(path: &Path) -> Result<FileContent, FileAccessError> {
    let metadata = std::fs::metadata(path).map_err(|e| Self::read_error(path, e))?;
    if !metadata.is_file() {
      return Err(FileAccessError::NotAFile(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| Self::read_error(path, e))?;
    Ok(match String::from_utf8(bytes) {
      Ok(text) => FileContent::Text(text),
      Err(_) => FileContent::Binary,
    })
  }

  /// Checks that the file may be rewritten before any work is done.
  pub fn ensure_writable(path: &Path) -> Result<(), FileAccessError> {
    let metadata = std::fs::metadata(path).map_err(|e| Self::read_error(path, e))?;
    if metadata.permissions().readonly() {
      return Err(FileAccessError::ReadOnly(path.to_path_buf()));
    }
    Ok(())
  }

  /// Atomically replaces the file's content.
  ///
  /// The new content is written and synced to a temporary file next to the
  /// target, given the original permissions, then renamed over it.
  pub fn write_atomic(path: &Path, content: &str) -> Result<(), FileAccessError> {
    let write_error = |source: std::io::Error| FileAccessError::Write {
      path: path.to_path_buf(),
      source,
    };

    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let permissions = std::fs::metadata(path).map_err(write_error)?.permissions();

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(content.as_bytes()).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    std::fs::set_permissions(temp.path(), permissions).map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
  }

  fn read_error(path: &Path, source: std::io::Error) -> FileAccessError {
    if source.kind() == std::io::ErrorKind::NotFound {
      FileAccessError::NotFound(path.to_path_buf())
    } else {
      FileAccessError::Read {
        path: path.to_path_buf(),
        source,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_read_text_and_binary() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let text = temp_dir.path().join("a.py");
    let binary = temp_dir.path().join("b.py");
    std::fs::write(&text, "x = 1\n").expect("write text");
    std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x81]).expect("write binary");

    assert_eq!(FileIO::read(&text).expect("read"), FileContent::Text("x = 1\n".to_string()));
    assert_eq!(FileIO::read(&binary).expect("read"), FileContent::Binary);
  }

  #[test]
  fn test_read_missing_and_directory() {
    let temp_dir = TempDir::new().expect("create temp dir");

    let missing = FileIO::read(&temp_dir.path().join("missing.py"));
    assert!(matches!(missing, Err(FileAccessError::NotFound(_))));

    let dir = FileIO::read(temp_dir.path());
    assert!(matches!(dir, Err(FileAccessError::NotAFile(_))));
  }

  #[test]
  fn test_write_atomic_replaces_content() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("a.rs");
    std::fs::write(&path, "old\n").expect("write");

    FileIO::write_atomic(&path, "new\n").expect("atomic write");
    assert_eq!(std::fs::read_to_string(&path).expect("read back"), "new\n");

    // No temporary files are left behind.
    let entries = std::fs::read_dir(temp_dir.path()).expect("read dir").count();
    assert_eq!(entries, 1);
  }

  #[test]
  fn test_ensure_writable_read_only() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("locked.py");
    std::fs::write(&path, "x = 1\n").expect("write");

    let mut permissions = std::fs::metadata(&path).expect("metadata").permissions();
    permissions.set_readonly(true);
    std::fs::set_permissions(&path, permissions).expect("set read-only");

    assert!(matches!(FileIO::ensure_writable(&path), Err(FileAccessError::ReadOnly(_))));
  }
}
