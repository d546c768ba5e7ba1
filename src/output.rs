//! # Output Module
//!
//! This module centralizes all user-facing output for annot8.
//! It provides consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: Show which files changed and why others failed
//! - **Scannable**: Use formatting to make output easy to parse visually
//! - **Progressive**: More detail with `-v`, silence with `-q`
//! - **Scriptable**: Keep stdout predictable for piping/automation

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::processor::ProcessStatus;
use crate::report::{FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Success
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Skipped
  pub const SKIPPED: &str = "-";
  /// Header added or replaced
  pub const MODIFIED: &str = "+";
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print the initial "Processing N paths..." or "Checking N paths..." message.
pub fn print_start_message(path_count: usize, dry_run: bool) {
  if is_quiet() {
    return;
  }

  let verb = if dry_run { "Checking" } else { "Processing" };
  let paths_word = if path_count == 1 { "path" } else { "paths" };

  println!("{} {} {}...", verb, path_count, paths_word);
}

/// Print the list of modified (or would-modify) files.
///
/// Shows up to `limit` files (or `DEFAULT_FILE_LIST_LIMIT` if None), all of
/// them in verbose mode. In quiet mode only the bare paths are printed.
pub fn print_modified_files(files: &[&FileReport], dry_run: bool, limit: Option<usize>) {
  if files.is_empty() {
    return;
  }

  if is_quiet() {
    for file in files {
      println!("{}", file.path);
    }
    return;
  }

  let count = files.len();
  let header = format!(
    "{} {} {} {}:",
    symbols::MODIFIED.if_supports_color(Stream::Stdout, |s| s.green()),
    count,
    if count == 1 { "file" } else { "files" },
    if dry_run { "would be annotated" } else { "annotated" }
  );
  println!("{}", header);

  let effective_limit = if is_verbose() {
    count
  } else {
    limit.unwrap_or(DEFAULT_FILE_LIST_LIMIT)
  };

  for file in files.iter().take(effective_limit) {
    match &file.reason {
      Some(reason) if is_verbose() => println!("  {} ({})", file.path, reason),
      _ => println!("  {}", file.path),
    }
  }

  if count > effective_limit {
    println!(
      "  {}",
      format!("... and {} more (use -v to see all)", count - effective_limit)
        .if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
}

/// Print every file that ended in an error, with its reason, on stderr.
///
/// Errors are shown even in quiet mode.
pub fn print_error_files(files: &[&FileReport]) {
  if files.is_empty() {
    return;
  }

  let count = files.len();
  eprintln!(
    "{} {} {} failed:",
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
    count,
    if count == 1 { "file" } else { "files" }
  );
  for file in files {
    eprintln!("  {}: {}", file.path, file.reason.as_deref().unwrap_or("unknown error"));
  }
}

/// Print skipped files with their reasons. Only shown in verbose mode.
pub fn print_skipped_files(files: &[&FileReport]) {
  if !is_verbose() || files.is_empty() {
    return;
  }

  for file in files {
    println!(
      "  {} {} ({})",
      symbols::SKIPPED.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      file.path.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      file.reason.as_deref().unwrap_or("skipped")
    );
  }
}

/// Print the success message when nothing needed changing.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }

  println!(
    "{} All files have headers.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print the processing summary.
///
/// Format: "Summary: X modified, Y unchanged, Z skipped, W errors"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  let modified_str = summary.modified.if_supports_color(Stream::Stdout, |s| s.green());
  let unchanged_str = summary.unchanged.if_supports_color(Stream::Stdout, |s| s.cyan());
  let skipped_str = summary.skipped.if_supports_color(Stream::Stdout, |s| s.dimmed());
  let error_str = if summary.error > 0 {
    summary.error.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
  } else {
    summary.error.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };

  let mut summary_line = format!(
    "Summary: {} {}, {} unchanged, {} skipped, {} {}",
    modified_str,
    if summary.dry_run { "would modify" } else { "modified" },
    unchanged_str,
    skipped_str,
    error_str,
    if summary.error == 1 { "error" } else { "errors" }
  );

  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time_seconds));
  }

  println!("{}", summary_line);
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// Report rows grouped by status for output.
pub struct CategorizedReports<'a> {
  pub modified: Vec<&'a FileReport>,
  pub unchanged: Vec<&'a FileReport>,
  pub skipped: Vec<&'a FileReport>,
  pub errors: Vec<&'a FileReport>,
}

impl<'a> CategorizedReports<'a> {
  /// Categorize a slice of file reports, keeping their order.
  pub fn from_reports(reports: &'a [FileReport]) -> Self {
    let mut categorized = Self {
      modified: Vec::new(),
      unchanged: Vec::new(),
      skipped: Vec::new(),
      errors: Vec::new(),
    };

    for report in reports {
      match report.status {
        ProcessStatus::Modified => categorized.modified.push(report),
        ProcessStatus::Unchanged => categorized.unchanged.push(report),
        ProcessStatus::Skipped => categorized.skipped.push(report),
        ProcessStatus::Error => categorized.errors.push(report),
      }
    }

    categorized
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn create_test_report(path: &str, status: ProcessStatus) -> FileReport {
    FileReport {
      path: path.to_string(),
      status,
      reason: None,
    }
  }

  #[test]
  fn test_categorize_reports_mixed() {
    let reports = vec![
      create_test_report("src/a.rs", ProcessStatus::Modified),
      create_test_report("src/b.rs", ProcessStatus::Unchanged),
      create_test_report("src/c.rs", ProcessStatus::Modified),
      create_test_report("notes.txt", ProcessStatus::Skipped),
      create_test_report("locked.py", ProcessStatus::Error),
    ];

    let categorized = CategorizedReports::from_reports(&reports);

    assert_eq!(categorized.modified.len(), 2);
    assert_eq!(categorized.modified[1].path, "src/c.rs");
    assert_eq!(categorized.unchanged.len(), 1);
    assert_eq!(categorized.skipped.len(), 1);
    assert_eq!(categorized.errors.len(), 1);
  }

  #[test]
  fn test_categorize_reports_empty() {
    let categorized = CategorizedReports::from_reports(&[]);
    assert!(categorized.modified.is_empty());
    assert!(categorized.errors.is_empty());
  }
}
