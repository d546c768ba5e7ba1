//! # Templates Module
//!
//! This module renders header templates and wraps the result in comment
//! delimiters.
//!
//! The module includes:
//! - [`TemplateContext`] holding the variables a template can reference
//! - [`render_template`] expanding `{name}` and `{name|default}` placeholders
//! - [`format_with_comment_style`] turning rendered lines into comment lines
//! - [`TemplateManager`] tying the configured template to a file
//!
//! ## Example
//!
//! ```rust
//! use annot8::comment_style::CommentStyle;
//! use annot8::templates::{TemplateContext, format_with_comment_style, render_template};
//!
//! let mut context = TemplateContext::new();
//! context.insert("file_path", "src/app.cjs");
//!
//! let rendered = render_template("File: {file_path}\nAuthor: {author|Anonymous}", &context);
//! let lines = format_with_comment_style(&rendered, &CommentStyle::line("//"));
//!
//! assert_eq!(lines, vec!["// File: src/app.cjs", "// Author: Anonymous"]);
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Component, Path};

use chrono::Local;
use tracing::{debug, warn};

use crate::comment_style::CommentStyle;
use crate::config::HeaderConfig;
use crate::header_detection::HEADER_LABEL;

/// Variables available to a header template.
///
/// File facts are always present; config facts only when configured.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TemplateContext {
  vars: BTreeMap<String, String>,
}

impl TemplateContext {
  /// Creates an empty context.
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds the full context for `path`.
  ///
  /// # Parameters
  ///
  /// * `path` - The file being annotated
  /// * `project_root` - Root the path variables are relative to
  /// * `header` - Config providing author, version, date and user keys
  pub fn for_file(path: &Path, project_root: &Path, header: &HeaderConfig) -> Self {
    let mut context = Self::new();
    context.vars.extend(header.template_variables());

    if header.include_date
      && let Some(date) = format_date(&header.date_format)
    {
      context.insert("date", date);
    }

    // File facts win over any user key of the same name.
    context.vars.extend(file_variables(path, project_root));
    context
  }

  /// Sets a variable, replacing any previous value.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.vars.insert(key.into(), value.into());
  }

  /// Returns the value of a variable.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.vars.get(key).map(String::as_str)
  }
}

/// Computes `file_path`, `file_name`, `file_stem`, `file_suffix` and
/// `file_dir` for `path` relative to `project_root`.
///
/// Separators are always `/`. `file_suffix` keeps its leading dot and is empty
/// without an extension. `file_dir` is `.` for files directly in the root.
pub fn file_variables(path: &Path, project_root: &Path) -> BTreeMap<String, String> {
  let relative = relative_path(path, project_root);
  let relative_path = Path::new(&relative);

  let file_name = os_str_to_string(relative_path.file_name());
  let file_stem = os_str_to_string(relative_path.file_stem());
  let file_suffix = relative_path
    .extension()
    .map(|ext| format!(".{}", ext.to_string_lossy()))
    .unwrap_or_default();
  let file_dir = match relative.rsplit_once('/') {
    Some((dir, _)) if !dir.is_empty() => dir.to_string(),
    _ => ".".to_string(),
  };

  BTreeMap::from([
    ("file_path".to_string(), relative),
    ("file_name".to_string(), file_name),
    ("file_stem".to_string(), file_stem),
    ("file_suffix".to_string(), file_suffix),
    ("file_dir".to_string(), file_dir),
  ])
}

/// Path of `path` relative to `project_root`, joined with `/`.
///
/// Falls back to the path as given when no relative form exists.
pub fn relative_path(path: &Path, project_root: &Path) -> String {
  let relative = path
    .strip_prefix(project_root)
    .map(Path::to_path_buf)
    .ok()
    .or_else(|| pathdiff::diff_paths(path, project_root))
    .unwrap_or_else(|| path.to_path_buf());

  relative
    .components()
    .filter_map(|component| match component {
      Component::Normal(part) => Some(part.to_string_lossy()),
      Component::ParentDir => Some("..".into()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}

fn os_str_to_string(value: Option<&std::ffi::OsStr>) -> String {
  value.map(|v| v.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Formats the current local date, or `None` if the format is unusable.
fn format_date(date_format: &str) -> Option<String> {
  let mut date = String::new();
  if write!(date, "{}", Local::now().format(date_format)).is_err() {
    warn!("Invalid date format '{}', leaving {{date}} empty", date_format);
    return None;
  }
  Some(date)
}

/// Template output: one content line per template line, no comment markers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderedHeader {
  lines: Vec<String>,
}

impl RenderedHeader {
  /// Returns the rendered content lines.
  pub fn lines(&self) -> &[String] {
    &self.lines
  }
}

impl From<Vec<String>> for RenderedHeader {
  fn from(lines: Vec<String>) -> Self {
    Self { lines }
  }
}

/// Expands a template against a context.
///
/// The template is split into lines (a single trailing newline does not add
/// a blank line); blank lines are kept. In each line:
/// - `{name}` becomes the value of `name`, or nothing if it is unset
/// - `{name|default}` becomes the value of `name` if set and non-empty,
///   otherwise `default` verbatim
///
/// Anything else in braces (not an identifier, or an unterminated `{`) is
/// copied through unchanged. Rendering never fails.
pub fn render_template(template: &str, context: &TemplateContext) -> RenderedHeader {
  template
    .lines()
    .map(|line| render_line(line, context))
    .collect::<Vec<_>>()
    .into()
}

fn render_line(line: &str, context: &TemplateContext) -> String {
  let mut out = String::with_capacity(line.len());
  let mut rest = line;

  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];

    let Some(close) = after.find('}') else {
      out.push_str(&rest[open..]);
      return out;
    };

    let inner = &after[..close];
    if inner.contains('{') {
      // Not a placeholder; keep the brace and rescan from the next one.
      out.push('{');
      rest = after;
      continue;
    }

    match Placeholder::parse(inner) {
      Some(placeholder) => out.push_str(&placeholder.expand(context)),
      None => {
        out.push('{');
        out.push_str(inner);
        out.push('}');
      }
    }
    rest = &after[close + 1..];
  }

  out.push_str(rest);
  out
}

/// A parsed `{name}` or `{name|default}`.
#[derive(Debug, PartialEq, Eq)]
struct Placeholder<'a> {
  name: &'a str,
  default: Option<&'a str>,
}

impl<'a> Placeholder<'a> {
  fn parse(inner: &'a str) -> Option<Self> {
    let (name, default) = match inner.split_once('|') {
      Some((name, default)) => (name.trim(), Some(default)),
      None => (inner.trim(), None),
    };

    is_identifier(name).then_some(Self { name, default })
  }

  fn expand(&self, context: &TemplateContext) -> String {
    match (context.get(self.name), self.default) {
      (Some(value), Some(default)) if value.is_empty() => default.to_string(),
      (Some(value), _) => value.to_string(),
      (None, Some(default)) => default.to_string(),
      (None, None) => {
        debug!("Template variable '{}' is not set, rendering empty", self.name);
        String::new()
      }
    }
  }
}

fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Wraps every rendered line in the given comment style.
///
/// Line styles produce `start content`; block styles wrap each line on its
/// own as `start content end`. Blank lines become the bare `start` (or
/// `start end`). Trailing whitespace of the content is dropped.
pub fn format_with_comment_style(rendered: &RenderedHeader, style: &CommentStyle) -> Vec<String> {
  rendered
    .lines()
    .iter()
    .map(|line| {
      let content = line.trim_end();
      match (content.is_empty(), style.is_block()) {
        (true, false) => style.start.clone(),
        (true, true) => format!("{} {}", style.start, style.end),
        (false, false) => format!("{} {}", style.start, content),
        (false, true) => format!("{} {} {}", style.start, content, style.end),
      }
    })
    .collect()
}

/// Renders the configured header for individual files.
#[derive(Debug, Clone)]
pub struct TemplateManager {
  header: HeaderConfig,
}

impl TemplateManager {
  /// Creates a manager for the given header config.
  ///
  /// Warns when the template's first line does not start with `File:`, since
  /// such headers cannot be recognized on later runs.
  pub fn new(header: HeaderConfig) -> Self {
    let first_line = header.template.lines().find(|line| !line.trim().is_empty());
    if !first_line.is_some_and(|line| line.trim_start().starts_with(HEADER_LABEL)) {
      warn!(
        "Header template does not start with '{}'; existing headers will not be detected on re-runs",
        HEADER_LABEL
      );
    }

    Self { header }
  }

  /// Renders the template for `path`.
  pub fn render_for(&self, path: &Path, project_root: &Path) -> RenderedHeader {
    let context = TemplateContext::for_file(path, project_root, &self.header);
    render_template(&self.header.template, &context)
  }

  /// Renders the template for `path` and wraps it in `style`.
  pub fn header_lines(&self, path: &Path, project_root: &Path, style: &CommentStyle) -> Vec<String> {
    format_with_comment_style(&self.render_for(path, project_root), style)
  }
}
