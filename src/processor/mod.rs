//! # Processor Module
//!
//! This module contains the core functionality for annotating files: deciding
//! per file whether to skip it, leave it alone, insert a header, or replace a
//! header written in the wrong comment style, and walking directories to do
//! that for every eligible file.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - Whole-file reads and atomic writes
//! - [`content_transformer`] - Preserved-line splitting and header edits
//! - [`file_collector`] - Deterministic directory traversal
//!
//! The [`Processor`] struct is the main entry point, with [`process`] and
//! [`walk`] as one-shot conveniences.

mod content_transformer;
mod file_collector;
mod file_io;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
pub use content_transformer::{ContentTransformer, SplitContent, UTF8_BOM};
pub use file_collector::{DEFAULT_EXCLUDED_DIRS, FileCollector, WalkEntry, absolutize_path, is_default_excluded_dir};
pub use file_io::{FileAccessError, FileContent, FileIO};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::comment_style::{CommentStyleResolver, create_resolver};
use crate::config::Config;
use crate::diff::DiffManager;
use crate::file_filter::{FileFilter, create_default_filter};
use crate::header_detection::{HeaderDetector, HeaderState, MarkerHeaderDetector, header_block_range};
use crate::templates::TemplateManager;

/// Outcome category of processing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
  /// A header was inserted or replaced (or would be, in a dry run)
  Modified,
  /// A correct header is already present
  Unchanged,
  /// The file is not eligible or cannot carry a header
  Skipped,
  /// The file could not be read or written
  Error,
}

impl ProcessStatus {
  /// Every status, in reporting order.
  pub const ALL: [Self; 4] = [Self::Modified, Self::Unchanged, Self::Skipped, Self::Error];

  /// Lowercase name used in stats and reports.
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Modified => "modified",
      Self::Unchanged => "unchanged",
      Self::Skipped => "skipped",
      Self::Error => "error",
    }
  }
}

impl fmt::Display for ProcessStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
  /// What happened
  pub status: ProcessStatus,
  /// The file
  pub path: PathBuf,
  /// Why, for anything but a plain outcome
  pub reason: Option<String>,
}

impl ProcessResult {
  fn new(status: ProcessStatus, path: &Path, reason: Option<String>) -> Self {
    Self {
      status,
      path: path.to_path_buf(),
      reason,
    }
  }

  /// A header was inserted or replaced.
  pub fn modified(path: &Path, reason: impl Into<String>) -> Self {
    Self::new(ProcessStatus::Modified, path, Some(reason.into()))
  }

  /// The file already has a correct header.
  pub fn unchanged(path: &Path) -> Self {
    Self::new(ProcessStatus::Unchanged, path, None)
  }

  /// The file was not processed.
  pub fn skipped(path: &Path, reason: impl Into<String>) -> Self {
    Self::new(ProcessStatus::Skipped, path, Some(reason.into()))
  }

  /// The file could not be processed.
  pub fn error(path: &Path, reason: impl Into<String>) -> Self {
    Self::new(ProcessStatus::Error, path, Some(reason.into()))
  }
}

/// Aggregated results of a walk, in traversal order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkStats {
  results: Vec<ProcessResult>,
}

impl WalkStats {
  /// Creates empty stats.
  pub const fn new() -> Self {
    Self { results: Vec::new() }
  }

  /// Appends a result.
  pub fn push(&mut self, result: ProcessResult) {
    self.results.push(result);
  }

  /// Appends all results of another walk.
  pub fn merge(&mut self, other: Self) {
    self.results.extend(other.results);
  }

  /// Per-file results in traversal order.
  pub fn results(&self) -> &[ProcessResult] {
    &self.results
  }

  /// Results with the given status.
  pub fn with_status(&self, status: ProcessStatus) -> impl Iterator<Item = &ProcessResult> {
    self.results.iter().filter(move |result| result.status == status)
  }

  /// Number of results with the given status.
  pub fn count(&self, status: ProcessStatus) -> usize {
    self.with_status(status).count()
  }

  /// Status name to count, with every status present (zero if unseen).
  pub fn counts(&self) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> =
      ProcessStatus::ALL.iter().map(|status| (status.as_str(), 0)).collect();
    for result in &self.results {
      *counts.entry(result.status.as_str()).or_insert(0) += 1;
    }
    counts
  }

  /// Total number of files seen.
  pub fn total(&self) -> usize {
    self.results.len()
  }

  /// Returns `true` if any file ended in an error.
  pub fn has_errors(&self) -> bool {
    self.results.iter().any(|result| result.status == ProcessStatus::Error)
  }
}

impl FromIterator<ProcessResult> for WalkStats {
  fn from_iter<I: IntoIterator<Item = ProcessResult>>(iter: I) -> Self {
    Self {
      results: iter.into_iter().collect(),
    }
  }
}

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  pub config: Config,
  pub project_root: PathBuf,

  // Behavior flags
  pub dry_run: bool,
  pub parallel: bool,

  // Optional components
  pub diff_manager: Option<DiffManager>,
  pub detector: Option<Box<dyn HeaderDetector>>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     dry_run: true,
  ///     ..ProcessorConfig::new(config, project_root)
  /// }
  /// ```
  pub fn new(config: Config, project_root: PathBuf) -> Self {
    Self {
      config,
      project_root,
      dry_run: false,
      parallel: false,
      diff_manager: None,
      detector: None,
    }
  }
}

/// Processor for annotating files with headers.
///
/// The `Processor` is responsible for:
/// - Applying eligibility rules (include/exclude, ignore files, known types)
/// - Resolving each file's comment style and detecting existing headers
/// - Inserting or replacing headers, or reporting what would change
/// - Walking directories in a deterministic order, optionally in parallel
pub struct Processor {
  /// Root the header paths are relative to
  project_root: PathBuf,

  /// The effective configuration
  config: Config,

  /// Comment style resolver shared with the eligibility filter
  resolver: Arc<dyn CommentStyleResolver>,

  /// Existing-header detector
  detector: Box<dyn HeaderDetector>,

  /// Renders the configured template per file
  template_manager: TemplateManager,

  /// Preserved-line splitting and header edits
  content_transformer: ContentTransformer,

  /// Directory traversal
  file_collector: FileCollector,

  /// Diff display for dry runs
  diff_manager: DiffManager,

  /// Compute results without writing
  dry_run: bool,

  /// Fan out over files with rayon
  parallel: bool,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if the project root cannot be resolved.
  pub fn new(config: ProcessorConfig) -> Result<Self> {
    let project_root = normalize_dir(&config.project_root)?;
    let resolver: Arc<dyn CommentStyleResolver> = Arc::from(create_resolver(&config.config));
    let template_manager = TemplateManager::new(config.config.header.clone());

    Ok(Self {
      project_root,
      resolver,
      detector: config.detector.unwrap_or_else(|| Box::new(MarkerHeaderDetector::new())),
      template_manager,
      content_transformer: ContentTransformer::new(),
      file_collector: FileCollector::new(),
      diff_manager: config.diff_manager.unwrap_or_default(),
      dry_run: config.dry_run,
      parallel: config.parallel,
      config: config.config,
    })
  }

  /// Processes a single file, applying the eligibility rules first.
  ///
  /// Never fails: problems are reported as an `error` result.
  pub fn process_file(&self, path: &Path) -> ProcessResult {
    let path = match normalize_file(path) {
      Ok(path) => path,
      Err(e) => return ProcessResult::error(path, e.to_string()),
    };

    match std::fs::symlink_metadata(&path) {
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return ProcessResult::error(&path, FileAccessError::NotFound(path.clone()).to_string());
      }
      Err(e) => return ProcessResult::error(&path, e.to_string()),
      Ok(metadata) if metadata.is_dir() => {
        return ProcessResult::error(&path, FileAccessError::NotAFile(path.clone()).to_string());
      }
      Ok(_) => {}
    }

    let filter = match create_default_filter(&self.config, Arc::clone(&self.resolver), &path, &self.project_root) {
      Ok(filter) => filter,
      Err(e) => return ProcessResult::error(&path, format!("{:#}", e)),
    };

    self.filter_and_annotate(&path, &filter)
  }

  /// Processes every eligible file under `root`.
  ///
  /// Results keep traversal order even when processed in parallel. Per-file
  /// problems never abort the walk; unreadable entries become `error`
  /// results.
  ///
  /// # Errors
  ///
  /// Returns an error if `root` cannot be resolved or the ignore rules cannot
  /// be built.
  pub fn walk(&self, root: &Path) -> Result<WalkStats> {
    let root = normalize_dir(root)?;
    let filter = create_default_filter(&self.config, Arc::clone(&self.resolver), &root, &self.project_root)?;
    let entries = self.file_collector.traverse_directory(&root)?;

    debug!("Processing {} entries (parallel: {})", entries.len(), self.parallel);
    let start = std::time::Instant::now();

    let handle = |entry: &WalkEntry| match entry {
      WalkEntry::File(path) => self.filter_and_annotate(path, &filter),
      WalkEntry::Unreadable { path, reason } => ProcessResult::error(path, reason.clone()),
    };

    let stats: WalkStats = if self.parallel {
      entries
        .par_iter()
        .map(handle)
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
    } else {
      entries.iter().map(handle).collect()
    };

    debug!("Processed {} files in {}ms", stats.total(), start.elapsed().as_millis());
    Ok(stats)
  }

  /// Processes a mix of files and directories, in the order given.
  ///
  /// # Errors
  ///
  /// Returns an error only if a directory walk cannot start.
  pub fn process_paths(&self, paths: &[PathBuf]) -> Result<WalkStats> {
    let mut stats = WalkStats::new();
    for path in paths {
      if path.is_dir() {
        stats.merge(self.walk(path)?);
      } else {
        stats.push(self.process_file(path));
      }
    }
    Ok(stats)
  }

  fn filter_and_annotate(&self, path: &Path, filter: &dyn FileFilter) -> ProcessResult {
    match filter.should_process(path) {
      Ok(result) if result.should_process => self.annotate(path),
      Ok(result) => {
        let reason = result.reason.unwrap_or_else(|| "Filtered out".to_string());
        trace!("Skipping: {} ({})", path.display(), reason);
        ProcessResult::skipped(path, reason)
      }
      Err(e) => ProcessResult::error(path, format!("{:#}", e)),
    }
  }

  /// Applies the header policy to an eligible file.
  fn annotate(&self, path: &Path) -> ProcessResult {
    let content = match FileIO::read(path) {
      Ok(FileContent::Text(content)) => content,
      Ok(FileContent::Binary) => return ProcessResult::skipped(path, "Not valid UTF-8 text"),
      Err(e) => return ProcessResult::error(path, e.to_string()),
    };

    let split = self.content_transformer.split(&content);
    let lines = split.body_lines();
    let style = self.resolver.resolve(path, split.body);

    let (replace, action) = match self.detector.detect(&lines, &style) {
      HeaderState::PresentCorrect { .. } => {
        trace!("Header present: {}", path.display());
        return ProcessResult::unchanged(path);
      }
      HeaderState::Absent => (0..0, "added header".to_string()),
      HeaderState::PresentWrongStyle { line, token } => {
        debug!("Replacing '{}' header in: {}", token, path.display());
        (
          header_block_range(&lines, line, &token),
          format!("replaced '{}' header", token),
        )
      }
    };

    let header_lines = self.template_manager.header_lines(path, &self.project_root, &style);
    if header_lines.is_empty() {
      return ProcessResult::skipped(path, "Template rendered no lines");
    }

    let new_content = split.with_header(&header_lines, replace);
    if new_content == content {
      return ProcessResult::unchanged(path);
    }

    if let Err(e) = self.diff_manager.display_diff(path, &content, &new_content) {
      warn!("Failed to display diff for {}: {:#}", path.display(), e);
    }

    if self.dry_run {
      return ProcessResult::modified(path, action);
    }

    if let Err(e) = FileIO::ensure_writable(path).and_then(|()| FileIO::write_atomic(path, &new_content)) {
      return ProcessResult::error(path, e.to_string());
    }

    debug!("Annotated: {} ({})", path.display(), action);
    ProcessResult::modified(path, action)
  }
}

/// Processes one file with a fresh processor.
///
/// # Parameters
///
/// * `path` - The file to annotate
/// * `project_root` - Root the header paths are relative to
/// * `config` - The effective configuration
/// * `dry_run` - Report without writing
pub fn process(path: &Path, project_root: &Path, config: &Config, dry_run: bool) -> ProcessResult {
  let processor = Processor::new(ProcessorConfig {
    dry_run,
    ..ProcessorConfig::new(config.clone(), project_root.to_path_buf())
  });

  match processor {
    Ok(processor) => processor.process_file(path),
    Err(e) => ProcessResult::error(path, format!("{:#}", e)),
  }
}

/// Walks `root` with a fresh processor.
///
/// # Errors
///
/// Returns an error if the walk cannot start; per-file problems are counted
/// as `error` results instead.
pub fn walk(root: &Path, project_root: &Path, config: &Config, dry_run: bool) -> Result<WalkStats> {
  let processor = Processor::new(ProcessorConfig {
    dry_run,
    ..ProcessorConfig::new(config.clone(), project_root.to_path_buf())
  })?;
  processor.walk(root)
}

/// Absolute, canonical form of a directory.
fn normalize_dir(dir: &Path) -> Result<PathBuf> {
  let absolute = absolutize_path(dir)?;
  std::fs::canonicalize(&absolute).with_context(|| format!("Failed to resolve directory: {}", dir.display()))
}

/// Absolute form of a file with its parent directory canonicalized.
///
/// The file itself is not resolved so symlinks stay visible to the filters.
fn normalize_file(path: &Path) -> Result<PathBuf> {
  let absolute = absolutize_path(path)?;
  match (absolute.parent(), absolute.file_name()) {
    (Some(parent), Some(name)) => match std::fs::canonicalize(parent) {
      Ok(parent) => Ok(parent.join(name)),
      Err(_) => Ok(absolute),
    },
    _ => Ok(absolute),
  }
}
