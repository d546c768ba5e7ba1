//! # annot8
//!
//! A tool that annotates source files with a standardized header comment
//! (for example `// File: src/app.js`) rendered from a template.
//!
//! `annot8` modifies source files in place and never adds a second header to
//! a file that already has one. A header written with the wrong comment
//! syntax (say `# File:` in a JavaScript file) is replaced rather than
//! duplicated.
//!
//! ## Features
//!
//! * Comment syntax chosen per file from its extension or name, with content
//!   sniffing for unknown types
//! * Shebangs, XML declarations and DOCTYPEs stay on the first line
//! * Multi-line templates with `{var}` and `{var|default}` placeholders
//! * Dry runs with diffs, and a check mode for CI
//! * `.annot8ignore` files and include/exclude globs
//! * JSON, YAML or TOML configuration
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use annot8::config::Config;
//! use annot8::processor::{ProcessStatus, walk};
//!
//! fn main() -> anyhow::Result<()> {
//!     let root = Path::new(".");
//!     let stats = walk(root, root, &Config::default(), true)?;
//!
//!     let pending = stats.count(ProcessStatus::Modified);
//!     if pending > 0 {
//!         println!("{} files would get a header", pending);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`processor`] - Per-file processing and directory walks
//! * [`templates`] - Template rendering and header composition
//! * [`comment_style`] - Comment syntax per file
//! * [`header_detection`] - Recognizing existing headers
//! * [`config`] - Configuration loading
//!
//! [`processor`]: crate::processor
//! [`templates`]: crate::templates
//! [`comment_style`]: crate::comment_style
//! [`header_detection`]: crate::header_detection
//! [`config`]: crate::config

pub mod cli;
pub mod comment_style;
pub mod config;
pub mod diff;
pub mod file_filter;
pub mod header_detection;
pub mod ignore;
pub mod logging;
pub mod output;
pub mod processor;
pub mod report;
pub mod templates;
pub mod workspace;
