//! # File Filter Module
//!
//! This module contains components deciding whether a file is eligible for
//! annotation: ignore rules, include globs, and whether its type is known.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::comment_style::CommentStyleResolver;
use crate::config::{Config, is_config_file};
use crate::ignore::IgnoreManager;
use crate::processor::is_default_excluded_dir;
use crate::verbose_log;

/// Result of a file filtering operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the file should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the file should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter files based on certain criteria.
pub trait FileFilter: Send + Sync {
  /// Determines whether a file should be processed.
  ///
  /// # Parameters
  ///
  /// * `path` - The path to the file to check
  ///
  /// # Returns
  ///
  /// A `FilterResult` indicating whether the file should be processed and why
  /// not if applicable.
  fn should_process(&self, path: &Path) -> Result<FilterResult>;
}

/// Filter that excludes files matching ignore rules or living inside a
/// default-excluded directory.
pub struct IgnoreFilter {
  ignore_manager: IgnoreManager,
  project_root: PathBuf,
}

impl IgnoreFilter {
  /// Creates a new IgnoreFilter with the given IgnoreManager.
  pub fn new(ignore_manager: IgnoreManager, project_root: &Path) -> Self {
    Self {
      ignore_manager,
      project_root: project_root.to_path_buf(),
    }
  }

  fn in_excluded_dir(&self, path: &Path) -> bool {
    let relative = path.strip_prefix(&self.project_root).unwrap_or(path);

    relative
      .parent()
      .into_iter()
      .flat_map(Path::components)
      .any(|component| component.as_os_str().to_str().is_some_and(is_default_excluded_dir))
  }
}

impl FileFilter for IgnoreFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if self.in_excluded_dir(path) {
      verbose_log!("Skipping: {} (inside an excluded directory)", path.display());
      return Ok(FilterResult::skip("Inside an excluded directory"));
    }

    if self.ignore_manager.is_ignored(path) {
      verbose_log!("Skipping: {} (matches ignore pattern)", path.display());
      Ok(FilterResult::skip("Matches ignore pattern"))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Filter checking that a file can carry a header.
///
/// With include globs configured, a file must match one of them (and is then
/// eligible even with an unknown extension). Without them, the resolver must
/// know the file type.
pub struct EligibilityFilter {
  include: Option<GlobSet>,
  resolver: Arc<dyn CommentStyleResolver>,
  project_root: PathBuf,
}

impl EligibilityFilter {
  /// Creates an EligibilityFilter.
  ///
  /// # Errors
  ///
  /// Returns an error if an include pattern is not a valid glob.
  pub fn new(include: &[String], resolver: Arc<dyn CommentStyleResolver>, project_root: &Path) -> Result<Self> {
    let include = if include.is_empty() {
      None
    } else {
      let mut builder = GlobSetBuilder::new();
      for pattern in include {
        let pattern = pattern.replace('\\', "/");
        builder.add(Glob::new(&pattern).with_context(|| format!("Invalid include pattern: {}", pattern))?);
      }
      Some(builder.build().with_context(|| "Failed to build include glob set")?)
    };

    Ok(Self {
      include,
      resolver,
      project_root: project_root.to_path_buf(),
    })
  }
}

impl FileFilter for EligibilityFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    match &self.include {
      Some(include) => {
        let relative = path.strip_prefix(&self.project_root).unwrap_or(path);
        if include.is_match(relative) {
          Ok(FilterResult::process())
        } else {
          Ok(FilterResult::skip("Does not match include patterns"))
        }
      }
      None if self.resolver.lookup(path).is_some() => Ok(FilterResult::process()),
      None => Ok(FilterResult::skip("Unsupported file type")),
    }
  }
}

/// Filter that combines multiple filters.
pub struct CompositeFilter {
  filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
  /// Creates a new CompositeFilter with the given filters.
  pub fn new(filters: Vec<Box<dyn FileFilter>>) -> Self {
    Self { filters }
  }
}

impl FileFilter for CompositeFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    for filter in &self.filters {
      let result = filter.should_process(path)?;
      if !result.should_process {
        return Ok(result);
      }
    }
    Ok(FilterResult::process())
  }
}

/// Filter rejecting symlinks and annot8's own config files.
pub struct SpecialFileFilter;

impl FileFilter for SpecialFileFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let metadata =
      std::fs::symlink_metadata(path).with_context(|| format!("Failed to stat file: {}", path.display()))?;
    if metadata.file_type().is_symlink() {
      return Ok(FilterResult::skip("Symlink"));
    }
    if is_config_file(path) {
      return Ok(FilterResult::skip("Config file"));
    }
    Ok(FilterResult::process())
  }
}

/// Builds the full eligibility chain for files under `target`.
///
/// Order: symlinks and config files, then excludes and ignore files, then
/// include globs or the resolver table.
///
/// # Parameters
///
/// * `config` - Supplies `files.include` and `files.exclude`
/// * `resolver` - Decides whether a file type is known
/// * `target` - The file or directory about to be processed
/// * `project_root` - Root for relative glob matching and ignore files
pub fn create_default_filter(
  config: &Config,
  resolver: Arc<dyn CommentStyleResolver>,
  target: &Path,
  project_root: &Path,
) -> Result<CompositeFilter> {
  let mut ignore_manager = IgnoreManager::new(config.files.exclude.clone())?;
  ignore_manager.load_ignore_files(target, project_root)?;

  let filters: Vec<Box<dyn FileFilter>> = vec![
    Box::new(SpecialFileFilter),
    Box::new(IgnoreFilter::new(ignore_manager, project_root)),
    Box::new(EligibilityFilter::new(&config.files.include, resolver, project_root)?),
  ];
  Ok(CompositeFilter::new(filters))
}
