//! # Diff Module
//!
//! This module renders diffs between original and annotated content. It's
//! used in dry runs to show what a real run would change.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

/// Manages diff creation and rendering for header changes.
///
/// This struct handles:
/// - Generating diffs between original and modified content
/// - Displaying diffs to stderr with colorization
/// - Appending diffs to a single file
///
/// Output from concurrent callers is serialized so diffs never interleave.
#[derive(Debug, Default)]
pub struct DiffManager {
  /// Whether to print diffs to stderr
  pub show_diff: bool,

  /// File every diff is appended to
  pub save_diff_path: Option<PathBuf>,

  output_lock: Mutex<()>,
}

impl DiffManager {
  /// Creates a new DiffManager with the specified configuration.
  ///
  /// # Parameters
  ///
  /// * `show_diff` - Whether to show diffs on stderr
  /// * `save_diff_path` - File to append diffs to
  pub fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
      output_lock: Mutex::new(()),
    }
  }

  /// Truncates the diff file so a run starts from an empty file.
  ///
  /// # Errors
  ///
  /// Returns an error if the diff file cannot be created.
  pub fn init(&self) -> Result<()> {
    if let Some(ref diff_path) = self.save_diff_path {
      std::fs::File::create(diff_path)
        .with_context(|| format!("Failed to create diff file: {}", diff_path.display()))?;
    }
    Ok(())
  }

  /// Returns `true` if diffs are shown or saved.
  pub const fn is_enabled(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Displays and/or saves a diff between the original and new content.
  ///
  /// # Parameters
  ///
  /// * `path` - Path to the file being processed
  /// * `original` - Original file content
  /// * `new` - Content with the header applied
  ///
  /// # Errors
  ///
  /// Returns an error if the diff file cannot be opened or written.
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    if !self.is_enabled() {
      return Ok(());
    }

    let diff_content = render_diff(path, original, new);

    // A poisoned lock only means another thread panicked mid-print.
    let _guard = self.output_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    if self.show_diff {
      for line in diff_content.lines() {
        let colored = if line.starts_with('+') {
          line.if_supports_color(Stream::Stderr, |l| l.green()).to_string()
        } else if line.starts_with('-') {
          line.if_supports_color(Stream::Stderr, |l| l.red()).to_string()
        } else {
          line.to_string()
        };
        eprintln!("{}", colored);
      }
    }

    if let Some(ref diff_path) = self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(diff_content.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}

/// Unified-style line diff of one file, with a `Diff for <path>:` header.
pub fn render_diff(path: &Path, original: &str, new: &str) -> String {
  let diff = TextDiff::from_lines(original, new);

  let mut out = format!("Diff for {}:\n", path.display());
  for change in diff.iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    out.push_str(sign);
    out.push_str(change.value());
    if change.missing_newline() {
      out.push('\n');
    }
  }
  out.push('\n');
  out
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_render_diff_marks_inserted_header() {
    let diff = render_diff(Path::new("a.cjs"), "module.exports = {};\n", "// File: a.cjs\nmodule.exports = {};\n");

    assert!(diff.starts_with("Diff for a.cjs:\n"));
    assert!(diff.contains("+// File: a.cjs\n"));
    assert!(diff.contains(" module.exports = {};\n"));
    assert!(!diff.contains("-module.exports"));
  }

  #[test]
  fn test_render_diff_without_trailing_newline() {
    let diff = render_diff(Path::new("a.py"), "x = 1", "# File: a.py\nx = 1");
    assert!(diff.contains("+# File: a.py\n"));
    assert!(diff.contains(" x = 1\n"));
  }

  #[test]
  fn test_save_diff_appends() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let diff_path = temp_dir.path().join("changes.diff");
    let manager = DiffManager::new(false, Some(diff_path.clone()));

    manager.display_diff(Path::new("a.py"), "x\n", "# File: a.py\nx\n").expect("diff a");
    manager.display_diff(Path::new("b.py"), "y\n", "# File: b.py\ny\n").expect("diff b");

    let saved = std::fs::read_to_string(&diff_path).expect("read diff");
    assert!(saved.contains("Diff for a.py:"));
    assert!(saved.contains("Diff for b.py:"));
  }

  #[test]
  fn test_disabled_manager_is_noop() {
    let manager = DiffManager::new(false, None);
    assert!(!manager.is_enabled());
    manager.display_diff(Path::new("a.py"), "x\n", "y\n").expect("noop");
  }
}
