//! # annot8
//!
//! A tool that gives every source file an idempotent header comment.

use annot8::cli::{Cli, run_annotate};
use anyhow::Result;

fn main() -> Result<()> {
  let cli = Cli::parse_args();
  run_annotate(cli.annotate_args)
}
