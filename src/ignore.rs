//! # Ignore Module
//!
//! This module decides which files are excluded from annotation.
//!
//! It supports:
//! - `.annot8ignore` files (gitignore syntax), each scoped to the directory it
//!   lives in, with deeper files taking precedence
//! - Exclude globs from the command line and the config's `files.exclude`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::Match;
use ignore::gitignore::Gitignore;
use tracing::warn;
use walkdir::WalkDir;

use crate::processor::is_default_excluded_dir;
use crate::verbose_log;

/// Name of the per-directory ignore file.
pub const IGNORE_FILENAME: &str = ".annot8ignore";

/// Manager for handling ignore patterns from various sources.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use annot8::ignore::IgnoreManager;
///
/// # fn main() -> anyhow::Result<()> {
/// let mut manager = IgnoreManager::new(vec!["**/*.json".to_string()])?;
///
/// // Load .annot8ignore files between the project root and the target
/// manager.load_ignore_files(Path::new("src"), Path::new("."))?;
///
/// assert!(manager.is_ignored(Path::new("src/config.json")));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IgnoreManager {
  /// Pre-compiled exclude globs
  glob_set: GlobSet,

  /// One matcher per `.annot8ignore`, shallowest first
  ignore_files: Vec<Gitignore>,

  /// Project root used to relativize paths for glob matching
  root_dir: Option<PathBuf>,
}

impl std::fmt::Debug for IgnoreManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IgnoreManager")
      .field("globs", &self.glob_set.len())
      .field("ignore_files", &self.ignore_files.len())
      .field("root_dir", &self.root_dir)
      .finish()
  }
}

impl IgnoreManager {
  /// Creates a new ignore manager with the specified exclude patterns.
  ///
  /// Patterns ending in `/` or without wildcards also match everything below
  /// a directory of that name, at any depth.
  ///
  /// # Errors
  ///
  /// Returns an error if any of the patterns are invalid.
  pub fn new(patterns: Vec<String>) -> Result<Self> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
      let pattern = pattern.replace('\\', "/");

      let add_pattern = |b: &mut GlobSetBuilder, p: &str| -> Result<()> {
        b.add(Glob::new(p).with_context(|| format!("Invalid glob pattern: {}", p))?);
        Ok(())
      };

      if let Some(dir_pattern) = pattern.strip_suffix('/') {
        add_pattern(&mut builder, dir_pattern)?;
        add_pattern(&mut builder, &format!("{}/**", dir_pattern))?;
        add_pattern(&mut builder, &format!("**/{}/**", dir_pattern))?;
      } else if !pattern.contains('*') && !pattern.contains('?') {
        // Plain name: a file or a directory
        add_pattern(&mut builder, &pattern)?;
        add_pattern(&mut builder, &format!("**/{}", pattern))?;
        add_pattern(&mut builder, &format!("{}/**", pattern))?;
        add_pattern(&mut builder, &format!("**/{}/**", pattern))?;
      } else {
        add_pattern(&mut builder, &pattern)?;
        if !pattern.starts_with("**/") {
          add_pattern(&mut builder, &format!("**/{}", pattern))?;
        }
      }
    }

    let glob_set = builder.build().with_context(|| "Failed to build glob set")?;

    Ok(Self {
      glob_set,
      ignore_files: Vec::new(),
      root_dir: None,
    })
  }

  /// Loads every `.annot8ignore` that can affect files under `target`.
  ///
  /// That is the files in each directory from `project_root` down to
  /// `target`, plus (when `target` is a directory) every one nested below it.
  ///
  /// Lines that fail to parse and unreadable files are logged and skipped.
  pub fn load_ignore_files(&mut self, target: &Path, project_root: &Path) -> Result<()> {
    let target_dir = if target.is_dir() {
      target
    } else {
      target.parent().unwrap_or(target)
    };

    let mut found: Vec<PathBuf> = Vec::new();

    // Ancestors, stopping at the project root
    if target_dir.starts_with(project_root) {
      for dir in target_dir.ancestors() {
        let candidate = dir.join(IGNORE_FILENAME);
        if candidate.is_file() {
          found.push(candidate);
        }
        if dir == project_root {
          break;
        }
      }
    }

    // Descendants
    if target.is_dir() {
      let nested = WalkDir::new(target)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
          !(entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(is_default_excluded_dir))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == IGNORE_FILENAME)
        .map(walkdir::DirEntry::into_path);
      found.extend(nested);
    }

    found.sort_by_key(|path| path.components().count());
    found.dedup();

    for path in found {
      verbose_log!("Loading {} file: {}", IGNORE_FILENAME, path.display());

      let (gitignore, error) = Gitignore::new(&path);
      if let Some(e) = error {
        warn!("Problem in {}: {}", path.display(), e);
      }
      self.ignore_files.push(gitignore);
    }

    self.root_dir = Some(project_root.to_path_buf());
    Ok(())
  }

  /// Checks if a file should be ignored based on all ignore patterns.
  pub fn is_ignored(&self, path: &Path) -> bool {
    if self.is_ignored_by_globs(path) {
      return true;
    }

    // The deepest matching rule wins, so a nested `!pattern` can re-include.
    let mut ignored = false;
    for gitignore in &self.ignore_files {
      if !path.starts_with(gitignore.path()) {
        continue;
      }
      match gitignore.matched_path_or_any_parents(path, false) {
        Match::Ignore(_) => ignored = true,
        Match::Whitelist(_) => ignored = false,
        Match::None => {}
      }
    }

    if ignored {
      verbose_log!("Skipping: {} (matches {} pattern)", path.display(), IGNORE_FILENAME);
    }
    ignored
  }

  /// Checks the exclude globs against the path relative to the project root
  /// and against the path as given.
  fn is_ignored_by_globs(&self, path: &Path) -> bool {
    if self.glob_set.is_empty() {
      return false;
    }

    let relative = self
      .root_dir
      .as_deref()
      .and_then(|root| path.strip_prefix(root).ok());

    if relative.is_some_and(|rel| self.glob_set.is_match(rel)) || self.glob_set.is_match(path) {
      verbose_log!("Skipping: {} (matches exclude pattern)", path.display());
      return true;
    }
    false
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_glob_patterns() {
    let manager = IgnoreManager::new(vec!["*.bak".to_string(), "vendor/".to_string(), "build".to_string()])
      .expect("valid patterns");

    assert!(manager.is_ignored(Path::new("src/main.rs.bak")));
    assert!(manager.is_ignored(Path::new("vendor/lib.rs")));
    assert!(manager.is_ignored(Path::new("a/vendor/lib.rs")));
    assert!(manager.is_ignored(Path::new("build/out.js")));
    assert!(!manager.is_ignored(Path::new("src/main.rs")));
  }

  #[test]
  fn test_invalid_glob() {
    assert!(IgnoreManager::new(vec!["src/[".to_string()]).is_err());
  }

  #[test]
  fn test_relative_globs_against_project_root() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("gen")).expect("mkdir");

    let mut manager = IgnoreManager::new(vec!["gen/*.py".to_string()]).expect("valid patterns");
    manager.load_ignore_files(root, root).expect("load");

    assert!(manager.is_ignored(&root.join("gen/a.py")));
    assert!(!manager.is_ignored(&root.join("src/a.py")));
  }

  #[test]
  fn test_ignore_files_scoped_and_nested() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("sub")).expect("mkdir");
    fs::write(root.join(IGNORE_FILENAME), "*.log.py\nsecret/\n").expect("write root ignore");
    fs::write(root.join("sub").join(IGNORE_FILENAME), "local.py\n!keep.log.py\n").expect("write sub ignore");

    let mut manager = IgnoreManager::new(vec![]).expect("no patterns");
    manager.load_ignore_files(root, root).expect("load");

    assert!(manager.is_ignored(&root.join("debug.log.py")));
    assert!(manager.is_ignored(&root.join("secret/key.py")));
    assert!(manager.is_ignored(&root.join("sub/local.py")));
    assert!(!manager.is_ignored(&root.join("local.py")));
    assert!(!manager.is_ignored(&root.join("sub/keep.log.py")));
    assert!(!manager.is_ignored(&root.join("main.py")));
  }

  #[test]
  fn test_ancestor_ignore_file_applies_to_single_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src")).expect("mkdir");
    fs::write(root.join(IGNORE_FILENAME), "src/skip.rs\n").expect("write ignore");
    fs::write(root.join("src/skip.rs"), "").expect("write file");

    let target = root.join("src/skip.rs");
    let mut manager = IgnoreManager::new(vec![]).expect("no patterns");
    manager.load_ignore_files(&target, root).expect("load");

    assert!(manager.is_ignored(&target));
  }
}
