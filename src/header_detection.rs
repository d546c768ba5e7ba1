//! # Header Detection Module
//!
//! Decides whether a file already carries a header, and whether that header
//! was written in the comment style the file should use.
//!
//! The detector sits behind the [`HeaderDetector`] trait so the processor does
//! not depend on a particular recognition strategy.

use std::ops::Range;

use crate::comment_style::CommentStyle;

/// Number of leading lines (after any preserved line) searched for a header.
pub const HEADER_SCAN_LINES: usize = 2;

/// Label every header starts with.
pub const HEADER_LABEL: &str = "File:";

/// Comment-start tokens recognized regardless of the resolved style, in
/// priority order. The block opener is tried first so `/*` is never read as
/// something else.
const KNOWN_MARKERS: [&str; 3] = ["/*", "//", "#"];

/// Header condition of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderState {
  /// No header marker in the scanned lines.
  Absent,

  /// A header in the resolved style starts at `line`.
  PresentCorrect {
    /// Index of the marker line within the scanned lines
    line: usize,
  },

  /// A header written with another comment token starts at `line`.
  PresentWrongStyle {
    /// Index of the marker line within the scanned lines
    line: usize,
    /// The comment-start token the existing header uses
    token: String,
  },
}

/// Trait for header detectors.
///
/// Implementations receive the file's lines with any leading preserved line
/// already removed, plus the style the file is expected to use.
pub trait HeaderDetector: Send + Sync {
  /// Classifies the header condition of `lines`.
  fn detect(&self, lines: &[&str], style: &CommentStyle) -> HeaderState;
}

/// Detector matching `<token> File:` on one of the first
/// [`HEADER_SCAN_LINES`] lines.
///
/// The token may be `/*`, `//`, `#`, or the resolved style's own start token
/// (so `--` and `<!--` headers are recognized as correct). `File:` must be the
/// first thing after the token, ignoring whitespace, so code that merely
/// mentions `File:` is not mistaken for a header. Only the first marker line
/// counts.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerHeaderDetector;

impl MarkerHeaderDetector {
  /// Creates a new `MarkerHeaderDetector`.
  pub const fn new() -> Self {
    Self
  }
}

impl HeaderDetector for MarkerHeaderDetector {
  fn detect(&self, lines: &[&str], style: &CommentStyle) -> HeaderState {
    for (index, line) in lines.iter().take(HEADER_SCAN_LINES).enumerate() {
      if let Some(token) = match_marker(line, &style.start) {
        if token == style.start {
          return HeaderState::PresentCorrect { line: index };
        }
        return HeaderState::PresentWrongStyle {
          line: index,
          token: token.to_string(),
        };
      }
    }

    HeaderState::Absent
  }
}

/// Returns the comment token `line` opens a header with, if any.
fn match_marker<'a>(line: &str, resolved_start: &'a str) -> Option<&'a str> {
  let trimmed = line.trim();
  let is_marker = |token: &str| {
    !token.is_empty()
      && trimmed
        .strip_prefix(token)
        .is_some_and(|rest| rest.trim_start().starts_with(HEADER_LABEL))
  };

  let known: Option<&'a str> = KNOWN_MARKERS.into_iter().find(|token| is_marker(token));
  known.or_else(|| is_marker(resolved_start).then_some(resolved_start))
}

/// Line range occupied by an existing header written with `token`.
///
/// Starts at the marker line and extends over the directly following lines
/// that are themselves plain comments in that style (the rest of a
/// multi-line header). Code or doc comments that merely begin with the
/// token's characters, such as `#include`, `#![...]`, `///` or `/**`, end the
/// range.
pub fn header_block_range(lines: &[&str], start: usize, token: &str) -> Range<usize> {
  let end = lines
    .iter()
    .enumerate()
    .skip(start + 1)
    .find(|(_, line)| !is_header_continuation(line, token))
    .map_or(lines.len(), |(index, _)| index);

  start..end
}

/// Whether `line` is a complete comment line in the style opened by `token`.
///
/// The token must be followed by whitespace or the end of the line. A block
/// opener must also be closed on the same line.
fn is_header_continuation(line: &str, token: &str) -> bool {
  let Some(rest) = line.trim().strip_prefix(token) else {
    return false;
  };
  if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
    return false;
  }

  token != "/*" || rest.trim_end().ends_with("*/")
}
