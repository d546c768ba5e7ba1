//! # Annotate Command
//!
//! This module implements the annotate command: resolve the project root,
//! load and merge configuration, process every path, then print and report
//! the outcome.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use crate::config::{CliOverrides, Config, load_config};
use crate::diff::DiffManager;
use crate::info_log;
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::output::{
  CategorizedReports, print_all_files_ok, print_error_files, print_hint, print_modified_files, print_skipped_files,
  print_start_message, print_summary,
};
use crate::processor::{Processor, ProcessorConfig};
use crate::report::{ProcessingSummary, ReportFormat, ReportGenerator, file_reports};
use crate::workspace::resolve_workspace;

/// Arguments for the annotate command
#[derive(Args, Debug, Default)]
pub struct AnnotateArgs {
  /// Files or directories to annotate. Directories are walked recursively.
  #[arg(default_value = ".")]
  pub paths: Vec<PathBuf>,

  /// Project root that header paths are relative to (default: nearest
  /// ancestor with a config file or .git, else the current directory)
  #[arg(long, value_name = "DIR")]
  pub root: Option<PathBuf>,

  /// Path to config file (default: .annot8.{json,yaml,yml,toml} in the
  /// project root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config files even if present
  #[arg(long)]
  pub no_config: bool,

  /// Report what would change without modifying files
  #[arg(long)]
  pub dry_run: bool,

  /// Like --dry-run, but exit with status 1 if any file would be modified
  #[arg(long)]
  pub check: bool,

  /// Show a diff of each change on stderr
  #[arg(long)]
  pub show_diff: bool,

  /// Save diffs of all changes to a file
  #[arg(long, value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Header template; `\n` starts a new line
  #[arg(long, value_name = "TEXT")]
  pub template: Option<String>,

  /// Value of the `author` template variable
  #[arg(long, value_name = "NAME")]
  pub author: Option<String>,

  /// Add the `date` template variable
  #[arg(long)]
  pub include_date: bool,

  /// Set a template variable (repeatable)
  #[arg(long = "var", value_name = "KEY=VALUE")]
  pub vars: Vec<String>,

  /// Only annotate files matching these globs (repeatable)
  #[arg(long, value_name = "GLOB")]
  pub include: Vec<String>,

  /// Skip files matching these globs (repeatable)
  #[arg(long, value_name = "GLOB")]
  pub exclude: Vec<String>,

  /// Process files in parallel
  #[arg(long)]
  pub parallel: bool,

  /// Write a JSON report to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Write a CSV report to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_csv: Option<PathBuf>,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl AnnotateArgs {
  /// Whether this run must leave files untouched.
  pub const fn is_dry_run(&self) -> bool {
    self.dry_run || self.check
  }

  /// Collects the command-line overrides for the loaded config.
  fn overrides(&self) -> Result<CliOverrides, crate::config::ConfigError> {
    Ok(CliOverrides {
      template: self.template.clone(),
      author: self.author.clone(),
      include_date: self.include_date,
      variables: CliOverrides::parse_variables(&self.vars)?,
      include: self.include.clone(),
      exclude: self.exclude.clone(),
    })
  }
}

/// Run the annotate command with the given arguments
pub fn run_annotate(args: AnnotateArgs) -> Result<()> {
  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let dry_run = args.is_dry_run();

  let workspace = resolve_workspace(args.root.as_deref(), &args.paths)?;
  let project_root = workspace.root().to_path_buf();
  debug!("Using project root: {}", project_root.display());

  // Nothing is touched until the configuration is known to be valid.
  let config = match build_config(&args, &project_root) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("ERROR: {}", e);
      process::exit(1);
    }
  };

  let diff_manager = DiffManager::new(args.show_diff, args.save_diff.clone());
  diff_manager.init()?;

  let processor = Processor::new(ProcessorConfig {
    dry_run,
    parallel: args.parallel,
    diff_manager: Some(diff_manager),
    ..ProcessorConfig::new(config, project_root.clone())
  })?;

  print_start_message(args.paths.len(), dry_run);

  let start_time = Instant::now();
  let stats = processor.process_paths(&args.paths)?;
  let elapsed = start_time.elapsed();

  let reports = file_reports(&stats, &project_root);
  let summary = ProcessingSummary::from_stats(&stats, dry_run, elapsed);
  let categorized = CategorizedReports::from_reports(&reports);

  print_modified_files(&categorized.modified, dry_run, None);
  print_skipped_files(&categorized.skipped);
  print_error_files(&categorized.errors);
  if categorized.modified.is_empty() && categorized.errors.is_empty() {
    print_all_files_ok();
  }
  print_summary(&summary);

  if args.check && !categorized.modified.is_empty() {
    print_hint("Run without --check to add the missing headers.");
  }

  let requested_reports = [
    (ReportFormat::Json, args.report_json.as_ref()),
    (ReportFormat::Csv, args.report_csv.as_ref()),
  ];
  for (format, output_path) in requested_reports {
    let Some(output_path) = output_path else {
      continue;
    };
    if let Err(e) = ReportGenerator::new(format, output_path).generate(&reports, &summary) {
      eprintln!("Error generating {} report: {:#}", format, e);
    } else {
      info_log!("Generated {} report at {}", format, output_path.display());
    }
  }

  if stats.has_errors() || (args.check && !categorized.modified.is_empty()) {
    process::exit(1);
  }

  Ok(())
}

/// Loads the config file and layers the command-line overrides on top.
fn build_config(args: &AnnotateArgs, project_root: &std::path::Path) -> Result<Config, crate::config::ConfigError> {
  let mut config = load_config(args.config.as_deref(), project_root, args.no_config)?;
  config.merge_cli_overrides(args.overrides()?);
  config.validate()?;
  Ok(config)
}
