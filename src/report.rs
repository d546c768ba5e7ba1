//! # Report Module
//!
//! This module writes machine-readable reports of an annotation run in JSON
//! or CSV form. Each report carries the per-file outcomes in traversal order
//! followed by (or wrapped in) a summary of the counts.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::processor::{ProcessStatus, WalkStats};
use crate::templates::relative_path;

/// One file's row in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
  /// Path relative to the project root, `/`-separated
  pub path: String,
  /// Outcome
  pub status: ProcessStatus,
  /// Reason, if any
  pub reason: Option<String>,
}

/// Summary of the processing results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingSummary {
  pub modified: usize,
  pub unchanged: usize,
  pub skipped: usize,
  pub error: usize,
  pub total: usize,
  /// Whether the run wrote nothing
  pub dry_run: bool,
  /// Wall time of the run
  pub processing_time_seconds: f64,
}

impl ProcessingSummary {
  /// Builds the summary from walk results.
  pub fn from_stats(stats: &WalkStats, dry_run: bool, processing_time: Duration) -> Self {
    Self {
      modified: stats.count(ProcessStatus::Modified),
      unchanged: stats.count(ProcessStatus::Unchanged),
      skipped: stats.count(ProcessStatus::Skipped),
      error: stats.count(ProcessStatus::Error),
      total: stats.total(),
      dry_run,
      processing_time_seconds: processing_time.as_secs_f64(),
    }
  }
}

#[derive(Serialize)]
struct JsonReport<'a> {
  summary: &'a ProcessingSummary,
  files: &'a [FileReport],
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  /// JSON format for machine readability
  Json,
  /// CSV format for spreadsheet compatibility
  Csv,
}

impl std::fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReportFormat::Json => write!(f, "JSON"),
      ReportFormat::Csv => write!(f, "CSV"),
    }
  }
}

/// Report Generator for writing run reports
pub struct ReportGenerator<'a> {
  /// Format of the report to generate
  format: ReportFormat,
  /// Path where the report will be saved
  output_path: &'a Path,
}

impl<'a> ReportGenerator<'a> {
  /// Create a new report generator
  ///
  /// # Parameters
  ///
  /// * `format` - The format to use for the report
  /// * `output_path` - The path where the report will be saved
  pub const fn new(format: ReportFormat, output_path: &'a Path) -> Self {
    Self { format, output_path }
  }

  /// Renders the report and writes it to the output path.
  ///
  /// # Errors
  ///
  /// Returns an error if the report cannot be serialized or written.
  pub fn generate(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<()> {
    let content = self.render(files, summary)?;
    fs::write(self.output_path, content)
      .with_context(|| format!("Failed to write {} report to {}", self.format, self.output_path.display()))
  }

  /// Renders the report content without writing it.
  ///
  /// # Errors
  ///
  /// Returns an error if JSON serialization fails.
  pub fn render(&self, files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
    match self.format {
      ReportFormat::Json => generate_json(files, summary),
      ReportFormat::Csv => Ok(generate_csv(files, summary)),
    }
  }
}

/// Converts walk results into report rows relative to `project_root`.
pub fn file_reports(stats: &WalkStats, project_root: &Path) -> Vec<FileReport> {
  stats
    .results()
    .iter()
    .map(|result| FileReport {
      path: relative_path(&result.path, project_root),
      status: result.status,
      reason: result.reason.clone(),
    })
    .collect()
}

fn generate_json(files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
  let report = JsonReport { summary, files };
  serde_json::to_string_pretty(&report).with_context(|| "Failed to serialize JSON report")
}

fn generate_csv(files: &[FileReport], summary: &ProcessingSummary) -> String {
  let mut csv = String::from("path,status,reason\n");

  for file in files {
    csv.push_str(&format!(
      "{},{},{}\n",
      csv_field(&file.path),
      file.status,
      csv_field(file.reason.as_deref().unwrap_or_default())
    ));
  }

  csv.push_str("\n# Summary\n");
  for status in ProcessStatus::ALL {
    let count = match status {
      ProcessStatus::Modified => summary.modified,
      ProcessStatus::Unchanged => summary.unchanged,
      ProcessStatus::Skipped => summary.skipped,
      ProcessStatus::Error => summary.error,
    };
    csv.push_str(&format!("{},{}\n", status, count));
  }
  csv.push_str(&format!("total,{}\n", summary.total));
  csv.push_str(&format!("dry_run,{}\n", summary.dry_run));
  csv.push_str(&format!("processing_time_seconds,{:.2}\n", summary.processing_time_seconds));

  csv
}

/// Quotes a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use tempfile::TempDir;

  use super::*;
  use crate::processor::ProcessResult;

  fn sample_stats(root: &Path) -> WalkStats {
    vec![
      ProcessResult::modified(&root.join("src/a.py"), "added header"),
      ProcessResult::unchanged(&root.join("b.rs")),
      ProcessResult::skipped(&root.join("data, v2.json"), "Unsupported file type"),
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn test_json_report_shape() {
    let root = PathBuf::from("/proj");
    let stats = sample_stats(&root);
    let files = file_reports(&stats, &root);
    let summary = ProcessingSummary::from_stats(&stats, true, Duration::from_millis(250));

    let json = ReportGenerator::new(ReportFormat::Json, Path::new("unused"))
      .render(&files, &summary)
      .expect("render");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(value["summary"]["modified"], 1);
    assert_eq!(value["summary"]["unchanged"], 1);
    assert_eq!(value["summary"]["skipped"], 1);
    assert_eq!(value["summary"]["error"], 0);
    assert_eq!(value["summary"]["total"], 3);
    assert_eq!(value["summary"]["dry_run"], true);
    assert_eq!(value["files"][0]["path"], "src/a.py");
    assert_eq!(value["files"][0]["status"], "modified");
    assert_eq!(value["files"][1]["reason"], serde_json::Value::Null);
  }

  #[test]
  fn test_csv_report_quotes_and_summary() {
    let root = PathBuf::from("/proj");
    let stats = sample_stats(&root);
    let files = file_reports(&stats, &root);
    let summary = ProcessingSummary::from_stats(&stats, false, Duration::from_secs(1));

    let csv = ReportGenerator::new(ReportFormat::Csv, Path::new("unused"))
      .render(&files, &summary)
      .expect("render");

    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("path,status,reason"));
    assert_eq!(lines.next(), Some("src/a.py,modified,added header"));
    assert_eq!(lines.next(), Some("b.rs,unchanged,"));
    assert_eq!(lines.next(), Some("\"data, v2.json\",skipped,Unsupported file type"));
    assert!(csv.contains("\n# Summary\nmodified,1\nunchanged,1\nskipped,1\nerror,0\ntotal,3\ndry_run,false\n"));
  }

  #[test]
  fn test_generate_writes_file() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let output = temp_dir.path().join("report.json");
    let stats = WalkStats::new();
    let summary = ProcessingSummary::from_stats(&stats, false, Duration::ZERO);

    ReportGenerator::new(ReportFormat::Json, &output)
      .generate(&[], &summary)
      .expect("generate");

    let written = std::fs::read_to_string(&output).expect("read report");
    assert!(written.contains("\"total\": 0"));
  }
}
