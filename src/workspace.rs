//! # Workspace Module
//!
//! This module decides the project root that header paths are relative to.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::CONFIG_FILENAMES;

/// How the project root was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workspace {
  /// Given with `--root`.
  Explicit { root: PathBuf },
  /// Nearest ancestor holding a config file or a `.git` entry.
  Discovered { root: PathBuf },
  /// Nothing found; the current directory.
  CurrentDir { root: PathBuf },
}

impl Workspace {
  pub fn root(&self) -> &Path {
    match self {
      Self::Explicit { root } | Self::Discovered { root } | Self::CurrentDir { root } => root.as_path(),
    }
  }
}

/// Resolve the project root.
///
/// Order: `explicit`, then the nearest ancestor of the first existing path
/// (or of the current directory) that contains a config file or `.git`,
/// then the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read or an explicit
/// root does not exist.
pub fn resolve_workspace(explicit: Option<&Path>, paths: &[PathBuf]) -> Result<Workspace> {
  let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;

  if let Some(root) = explicit {
    let root = abs_path_or_current(root, &current_dir);
    let root = std::fs::canonicalize(&root).with_context(|| format!("Project root not found: {}", root.display()))?;
    return Ok(Workspace::Explicit { root });
  }

  let start = start_dir(paths, &current_dir);
  if let Some(root) = find_marked_ancestor(&start) {
    return Ok(Workspace::Discovered { root });
  }

  Ok(Workspace::CurrentDir { root: current_dir })
}

fn start_dir(paths: &[PathBuf], current_dir: &Path) -> PathBuf {
  for candidate in paths {
    if candidate.is_dir() {
      return abs_path_or_current(candidate, current_dir);
    }

    if candidate.is_file()
      && let Some(parent) = candidate.parent()
    {
      return abs_path_or_current(parent, current_dir);
    }
  }

  current_dir.to_path_buf()
}

fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
  let start = std::fs::canonicalize(start).ok()?;
  start
    .ancestors()
    .find(|dir| dir.join(".git").exists() || CONFIG_FILENAMES.iter().any(|name| dir.join(name).is_file()))
    .map(Path::to_path_buf)
}

fn abs_path_or_current(path: &Path, current_dir: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    current_dir.join(path)
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_explicit_root_wins() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let workspace = resolve_workspace(Some(temp_dir.path()), &[]).expect("resolve");

    assert!(matches!(workspace, Workspace::Explicit { .. }));
    assert_eq!(workspace.root(), fs::canonicalize(temp_dir.path()).expect("canonical"));
  }

  #[test]
  fn test_missing_explicit_root_is_error() {
    let temp_dir = TempDir::new().expect("create temp dir");
    assert!(resolve_workspace(Some(&temp_dir.path().join("nope")), &[]).is_err());
  }

  #[test]
  fn test_discovers_config_ancestor() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = fs::canonicalize(temp_dir.path()).expect("canonical");
    fs::create_dir_all(root.join("src/deep")).expect("mkdir");
    fs::write(root.join(".annot8.toml"), "").expect("write config");
    fs::write(root.join("src/deep/a.py"), "").expect("write file");

    let workspace = resolve_workspace(None, &[root.join("src/deep/a.py")]).expect("resolve");
    assert_eq!(workspace, Workspace::Discovered { root });
  }

  #[test]
  fn test_discovers_git_ancestor() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let root = fs::canonicalize(temp_dir.path()).expect("canonical");
    fs::create_dir_all(root.join(".git")).expect("mkdir");
    fs::create_dir_all(root.join("pkg")).expect("mkdir");

    let workspace = resolve_workspace(None, &[root.join("pkg")]).expect("resolve");
    assert_eq!(workspace.root(), root);
  }
}
