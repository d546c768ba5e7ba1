//! # Content Transformer Module
//!
//! This module provides the text edits the processor applies: splitting off a
//! line that must stay first (shebang, XML declaration, DOCTYPE), then
//! inserting a header after it or swapping an existing header for a new one.
//!
//! All edits work on the original text and leave every byte outside the
//! header untouched.

use std::ops::Range;

/// UTF-8 byte-order mark as it appears in a decoded string.
pub const UTF8_BOM: char = '\u{feff}';

/// A file's content split around the point where a header belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitContent<'a> {
  /// Whether the content started with a byte-order mark
  pub bom: bool,

  /// The preserved first line, including its line ending if it has one
  pub leading: Option<&'a str>,

  /// Everything after the preserved line
  pub body: &'a str,

  /// Line ending used for inserted lines
  pub line_ending: &'static str,
}

impl<'a> SplitContent<'a> {
  /// Lines of the body without their line endings.
  pub fn body_lines(&self) -> Vec<&'a str> {
    self.body.lines().collect()
  }

  /// Rebuilds the content with `header_lines` in place of the body lines in
  /// `replace`.
  ///
  /// An empty range inserts at that position. The byte-order mark and the
  /// preserved line are always written first.
  pub fn with_header(&self, header_lines: &[String], replace: Range<usize>) -> String {
    let segments: Vec<&str> = self.body.split_inclusive('\n').collect();
    let start = replace.start.min(segments.len());
    let end = replace.end.clamp(start, segments.len());

    let header_len: usize = header_lines.iter().map(|line| line.len() + self.line_ending.len()).sum();
    let mut out = String::with_capacity(self.body.len() + header_len + 64);

    if self.bom {
      out.push(UTF8_BOM);
    }

    if let Some(leading) = self.leading {
      out.push_str(leading);
      if !leading.ends_with('\n') {
        out.push_str(self.line_ending);
      }
    }

    for segment in &segments[..start] {
      out.push_str(segment);
    }
    for line in header_lines {
      out.push_str(line);
      out.push_str(self.line_ending);
    }
    for segment in &segments[end..] {
      out.push_str(segment);
    }

    out
  }
}

/// Content transformation utilities for header processing.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentTransformer;

impl ContentTransformer {
  /// Creates a new ContentTransformer.
  pub const fn new() -> Self {
    Self
  }

  /// Splits off the byte-order mark and the preserved first line.
  ///
  /// Only the very first line is considered. It is preserved when it starts
  /// with:
  /// - `#!` (shebang)
  /// - `<?xml` (XML declaration)
  /// - `<!doctype`, any case (DOCTYPE)
  pub fn split<'a>(&self, content: &'a str) -> SplitContent<'a> {
    let (bom, content) = match content.strip_prefix(UTF8_BOM) {
      Some(rest) => (true, rest),
      None => (false, content),
    };

    let line_ending = detect_line_ending(content);
    let first_line_len = content.find('\n').map_or(content.len(), |index| index + 1);
    let first_line = &content[..first_line_len];

    if is_preserved_line(first_line) {
      SplitContent {
        bom,
        leading: Some(first_line),
        body: &content[first_line_len..],
        line_ending,
      }
    } else {
      SplitContent {
        bom,
        leading: None,
        body: content,
        line_ending,
      }
    }
  }
}

fn is_preserved_line(line: &str) -> bool {
  line.starts_with("#!")
    || line.starts_with("<?xml")
    || line
      .get(..9)
      .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"))
}

/// `\r\n` if the first line ends with it, otherwise `\n`.
fn detect_line_ending(content: &str) -> &'static str {
  match content.find('\n') {
    Some(index) if content[..index].ends_with('\r') => "\r\n",
    _ => "\n",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn header(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| (*line).to_string()).collect()
  }

  #[test]
  fn test_split_preserved_lines() {
    let transformer = ContentTransformer::new();

    let split = transformer.split("#!/usr/bin/env node\nconst x = 1;\n");
    assert_eq!(split.leading, Some("#!/usr/bin/env node\n"));
    assert_eq!(split.body, "const x = 1;\n");

    let split = transformer.split("<?xml version=\"1.0\"?>\n<root/>\n");
    assert_eq!(split.leading, Some("<?xml version=\"1.0\"?>\n"));

    let split = transformer.split("<!DOCTYPE html>\n<html></html>\n");
    assert_eq!(split.leading, Some("<!DOCTYPE html>\n"));

    let split = transformer.split("<!doctype html>\n");
    assert_eq!(split.leading, Some("<!doctype html>\n"));
    assert_eq!(split.body, "");
  }

  #[test]
  fn test_split_only_first_line_is_preserved() {
    let transformer = ContentTransformer::new();

    let split = transformer.split("\n#!/bin/sh\n");
    assert_eq!(split.leading, None);

    let split = transformer.split("# regular comment\n");
    assert_eq!(split.leading, None);
    assert_eq!(split.body, "# regular comment\n");
  }

  #[test]
  fn test_with_header_inserts_plain() {
    let transformer = ContentTransformer::new();
    let out = transformer.split("module.exports = {};\n").with_header(&header(&["// File: simple.cjs"]), 0..0);
    assert_eq!(out, "// File: simple.cjs\nmodule.exports = {};\n");
  }

  #[test]
  fn test_with_header_inserts_after_shebang() {
    let transformer = ContentTransformer::new();
    let out = transformer.split("#!/usr/bin/env node\nconst x = 1;\n").with_header(&header(&["// File: a.cjs"]), 0..0);
    assert_eq!(out, "#!/usr/bin/env node\n// File: a.cjs\nconst x = 1;\n");
  }

  #[test]
  fn test_with_header_inserts_shebang_only_without_newline() {
    let transformer = ContentTransformer::new();
    let out = transformer.split("#!/bin/sh").with_header(&header(&["# File: run.sh"]), 0..0);
    assert_eq!(out, "#!/bin/sh\n# File: run.sh\n");
  }

  #[test]
  fn test_with_header_on_empty_file() {
    let transformer = ContentTransformer::new();
    let out = transformer.split("").with_header(&header(&["# File: empty.py"]), 0..0);
    assert_eq!(out, "# File: empty.py\n");
  }

  #[test]
  fn test_with_header_keeps_bom_first() {
    let transformer = ContentTransformer::new();
    let out = transformer.split("\u{feff}x = 1\n").with_header(&header(&["# File: a.py"]), 0..0);
    assert_eq!(out, "\u{feff}# File: a.py\nx = 1\n");
  }

  #[test]
  fn test_with_header_uses_crlf() {
    let transformer = ContentTransformer::new();
    let out = transformer.split("a = 1\r\nb = 2\r\n").with_header(&header(&["# File: a.py", "#"]), 0..0);
    assert_eq!(out, "# File: a.py\r\n#\r\na = 1\r\nb = 2\r\n");
  }

  #[test]
  fn test_with_header_replaces() {
    let transformer = ContentTransformer::new();
    let content = "#!/usr/bin/env node\n# File: x.cjs\n# By: Bob\nconst x = 1;\n";
    let out = transformer.split(content).with_header(&header(&["// File: x.cjs"]), 0..2);
    assert_eq!(out, "#!/usr/bin/env node\n// File: x.cjs\nconst x = 1;\n");
  }

  #[test]
  fn test_with_header_replaces_at_second_line() {
    let transformer = ContentTransformer::new();
    let content = "\n# File: x.cjs\nbody\n";
    let out = transformer.split(content).with_header(&header(&["// File: x.cjs"]), 1..2);
    assert_eq!(out, "\n// File: x.cjs\nbody\n");
  }

  #[test]
  fn test_with_header_replaces_last_line_without_newline() {
    let transformer = ContentTransformer::new();
    let out = transformer.split("# File: x.cjs").with_header(&header(&["// File: x.cjs"]), 0..1);
    assert_eq!(out, "// File: x.cjs\n");
  }
}
