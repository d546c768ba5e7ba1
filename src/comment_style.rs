//! # Comment Style Module
//!
//! Maps a file to the comment delimiters its header is written in.
//!
//! Resolution is table driven: the file name or extension is looked up in a
//! static table (optionally overridden from the config's `comment_styles`).
//! Files the table does not know fall back to sniffing the first meaningful
//! line of content.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//!
//! use annot8::comment_style::{BuiltinResolver, CommentStyle, CommentStyleResolver};
//!
//! let resolver = BuiltinResolver;
//! assert_eq!(resolver.resolve(Path::new("index.cjs"), ""), CommentStyle::line("//"));
//! assert_eq!(resolver.resolve(Path::new("style.css"), ""), CommentStyle::block("/*", "*/"));
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::config::{CommentStyleConfig, Config};
use crate::verbose_log;

/// Delimiters wrapping each header line.
///
/// `end` is empty for line comments (`#`, `//`, `--`) and non-empty for block
/// comments (`/*` + `*/`, `<!--` + `-->`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentStyle {
  /// Token opening the comment
  pub start: String,

  /// Token closing the comment; empty for line comments
  pub end: String,
}

impl CommentStyle {
  /// Create a line-comment style.
  pub fn line(start: &str) -> Self {
    Self {
      start: start.to_string(),
      end: String::new(),
    }
  }

  /// Create a block-comment style.
  pub fn block(start: &str, end: &str) -> Self {
    Self {
      start: start.to_string(),
      end: end.to_string(),
    }
  }

  /// Returns `true` when every line needs a closing token.
  pub fn is_block(&self) -> bool {
    !self.end.is_empty()
  }
}

impl From<&CommentStyleConfig> for CommentStyle {
  fn from(config: &CommentStyleConfig) -> Self {
    Self {
      start: config.start.clone(),
      end: config.end.clone(),
    }
  }
}

/// Trait for resolving comment styles for file paths.
///
/// Implementations only provide the table lookup; content sniffing for files
/// the table does not know is shared through [`resolve`](Self::resolve).
pub trait CommentStyleResolver: Send + Sync {
  /// Looks the path up by file name and extension alone.
  ///
  /// Returns `None` when the file type is unknown.
  fn lookup(&self, path: &Path) -> Option<CommentStyle>;

  /// Resolves the style for a file, sniffing `content` if the lookup fails.
  ///
  /// The lookup always wins when both would apply.
  fn resolve(&self, path: &Path, content: &str) -> CommentStyle {
    self.lookup(path).unwrap_or_else(|| {
      let style = sniff_comment_style(content);
      verbose_log!("Sniffed comment style '{}' for: {}", style.start, path.display());
      style
    })
  }
}

/// Resolver backed by the built-in table only.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinResolver;

impl CommentStyleResolver for BuiltinResolver {
  fn lookup(&self, path: &Path) -> Option<CommentStyle> {
    builtin_comment_style(path)
  }
}

/// Resolver that consults the config's `comment_styles` before the built-in
/// table.
#[derive(Debug, Clone, Default)]
pub struct ConfigurableResolver {
  overrides: HashMap<String, CommentStyle>,
}

impl ConfigurableResolver {
  /// Create a resolver from the config's extension overrides.
  pub fn new(config: &Config) -> Self {
    let overrides = config
      .comment_styles
      .iter()
      .map(|(ext, style)| (ext.to_lowercase(), CommentStyle::from(style)))
      .collect();

    Self { overrides }
  }
}

impl CommentStyleResolver for ConfigurableResolver {
  fn lookup(&self, path: &Path) -> Option<CommentStyle> {
    if let Some(ext) = lowercase_extension(path)
      && let Some(style) = self.overrides.get(&ext)
    {
      verbose_log!("Using config comment style override for: .{}", ext);
      return Some(style.clone());
    }

    builtin_comment_style(path)
  }
}

/// Create a comment style resolver for the given configuration.
///
/// Without overrides the cheaper [`BuiltinResolver`] is returned.
pub fn create_resolver(config: &Config) -> Box<dyn CommentStyleResolver> {
  if config.has_overrides() {
    Box::new(ConfigurableResolver::new(config))
  } else {
    Box::new(BuiltinResolver)
  }
}

/// Looks a path up in the built-in table.
///
/// Well-known extensionless build files are matched by name first, then the
/// extension is matched case-insensitively.
pub fn builtin_comment_style(path: &Path) -> Option<CommentStyle> {
  let file_name = path.file_name()?.to_str()?.to_lowercase();

  match file_name.as_str() {
    "dockerfile" | "makefile" | "cmakelists.txt" | "gemfile" | "rakefile" | "justfile" => {
      return Some(CommentStyle::line("#"));
    }
    _ => {}
  }

  let ext = lowercase_extension(path)?;
  let style = match ext.as_str() {
    "c" | "h" | "cpp" | "cc" | "hpp" | "cs" | "go" | "rs" | "swift" | "dart" | "php" | "groovy" | "proto" | "js"
    | "mjs" | "cjs" | "jsx" | "ts" | "tsx" | "java" | "kt" | "kts" | "scala" | "zig" => CommentStyle::line("//"),
    "py" | "rb" | "sh" | "bash" | "zsh" | "yaml" | "yml" | "toml" | "pl" | "r" | "tf" | "ps1" => {
      CommentStyle::line("#")
    }
    "sql" | "lua" | "hs" | "elm" => CommentStyle::line("--"),
    "css" | "scss" | "less" => CommentStyle::block("/*", "*/"),
    "html" | "htm" | "xml" | "vue" | "svg" | "xhtml" => CommentStyle::block("<!--", "-->"),
    _ => return None,
  };

  Some(style)
}

/// Guesses a comment style from the first meaningful line of `content`.
///
/// A shebang on the very first line is skipped without being inspected. The
/// first non-blank line after it decides: a leading `//`, `#` or `--` selects
/// that line style. Anything else yields `#`.
pub fn sniff_comment_style(content: &str) -> CommentStyle {
  let mut lines = content.lines().enumerate();

  let first_meaningful = lines.find_map(|(index, line)| {
    let trimmed = line.trim();
    if trimmed.is_empty() || (index == 0 && trimmed.starts_with("#!")) {
      None
    } else {
      Some(trimmed)
    }
  });

  match first_meaningful {
    Some(line) if line.starts_with("//") => CommentStyle::line("//"),
    Some(line) if line.starts_with("--") => CommentStyle::line("--"),
    _ => CommentStyle::line("#"),
  }
}

fn lowercase_extension(path: &Path) -> Option<String> {
  path.extension()?.to_str().map(str::to_lowercase)
}
