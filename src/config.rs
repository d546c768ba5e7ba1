//! # Configuration Module
//!
//! Configuration support for annot8: the header template and the variables it
//! draws from, file inclusion/exclusion rules, and per-extension comment style
//! overrides.
//!
//! Configuration is read from `.annot8.json`, `.annot8.yaml`, `.annot8.yml` or
//! `.annot8.toml` in the project root, from the file named by the
//! `ANNOT8_CONFIG` environment variable, or from an explicit `--config` path.
//! Values given on the command line are layered on top.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::verbose_log;

/// Config file names looked up in the project root, in priority order.
pub const CONFIG_FILENAMES: [&str; 4] = [".annot8.json", ".annot8.yaml", ".annot8.yml", ".annot8.toml"];

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "ANNOT8_CONFIG";

/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "File: {file_path}";

/// strftime format used for `{date}` when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// User-defined comment style for an extension.
///
/// `end` is empty for line comments (`#`, `//`, `--`) and set for block
/// comments (`/*` + `*/`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommentStyleConfig {
  /// Token that opens the comment, e.g. `//` or `<!--`
  pub start: String,

  /// Token that closes the comment. Empty for line comments.
  #[serde(default)]
  pub end: String,
}

impl CommentStyleConfig {
  /// Create a line-comment style override.
  pub fn line(start: &str) -> Self {
    Self {
      start: start.to_string(),
      end: String::new(),
    }
  }

  /// Create a block-comment style override.
  pub fn block(start: &str, end: &str) -> Self {
    Self {
      start: start.to_string(),
      end: end.to_string(),
    }
  }
}

/// The `header` section: the template and the config-derived variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeaderConfig {
  /// Header template, one output line per template line.
  pub template: String,

  /// Value of `{author}`
  #[serde(deserialize_with = "deserialize_scalar")]
  pub author: Option<String>,

  /// Value of `{author_email}`
  #[serde(deserialize_with = "deserialize_scalar")]
  pub author_email: Option<String>,

  /// Value of `{version}`
  #[serde(deserialize_with = "deserialize_scalar")]
  pub version: Option<String>,

  /// Whether `{date}` is populated at render time.
  pub include_date: bool,

  /// strftime format for `{date}`.
  pub date_format: String,

  /// Any other key in the section becomes a template variable.
  #[serde(flatten)]
  pub variables: BTreeMap<String, Value>,
}

impl Default for HeaderConfig {
  fn default() -> Self {
    Self {
      template: DEFAULT_TEMPLATE.to_string(),
      author: None,
      author_email: None,
      version: None,
      include_date: false,
      date_format: DEFAULT_DATE_FORMAT.to_string(),
      variables: BTreeMap::new(),
    }
  }
}

impl HeaderConfig {
  /// Sets a template variable, routing the well-known names to their fields.
  pub fn set_variable(&mut self, key: &str, value: String) {
    match key {
      "author" => self.author = Some(value),
      "author_email" => self.author_email = Some(value),
      "version" => self.version = Some(value),
      _ => {
        self.variables.insert(key.to_string(), Value::String(value));
      }
    }
  }

  /// Returns every config-derived template variable as a string.
  ///
  /// `date` is not included; it is computed at render time.
  pub fn template_variables(&self) -> BTreeMap<String, String> {
    let mut vars: BTreeMap<String, String> = self
      .variables
      .iter()
      .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
      .collect();

    let known = [
      ("author", &self.author),
      ("author_email", &self.author_email),
      ("version", &self.version),
    ];
    for (key, value) in known {
      if let Some(value) = value {
        vars.insert(key.to_string(), value.clone());
      }
    }

    vars
  }
}

/// The `files` section: glob rules deciding which files are eligible.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilesConfig {
  /// When non-empty, only files matching one of these globs are eligible.
  /// Matching files are eligible even if their extension is unknown.
  pub include: Vec<String>,

  /// Files matching any of these globs are never eligible.
  pub exclude: Vec<String>,
}

/// Main configuration struct for annot8.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
  /// Header template and variables.
  pub header: HeaderConfig,

  /// File inclusion/exclusion rules.
  pub files: FilesConfig,

  /// Comment style overrides keyed by extension without the leading dot.
  pub comment_styles: HashMap<String, CommentStyleConfig>,
}

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
  Json,
  Yaml,
  Toml,
}

impl ConfigFormat {
  /// Picks the format from the file extension.
  pub fn from_path(path: &Path) -> Option<Self> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
      "json" => Some(Self::Json),
      "yaml" | "yml" => Some(Self::Yaml),
      "toml" => Some(Self::Toml),
      _ => None,
    }
  }
}

/// Error type for configuration operations.
///
/// Any of these aborts the run before a single file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// An explicitly requested config file does not exist.
  #[error("Config file not found: {0}")]
  NotFound(PathBuf),

  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file has an extension we cannot parse.
  #[error("Unsupported config format for '{0}' (expected .json, .yaml, .yml or .toml)")]
  UnsupportedFormat(PathBuf),

  /// The config file contains invalid JSON.
  #[error("Failed to parse config file '{path}': {source}")]
  JsonParseError { path: PathBuf, source: serde_json::Error },

  /// The config file contains invalid YAML.
  #[error("Failed to parse config file '{path}': {source}")]
  YamlParseError { path: PathBuf, source: serde_yaml::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  TomlParseError { path: PathBuf, source: toml::de::Error },

  /// A value is well-formed but not acceptable.
  #[error("Invalid value for '{field}': {message}")]
  InvalidValue { field: String, message: String },
}

impl ConfigError {
  fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::InvalidValue {
      field: field.into(),
      message: message.into(),
    }
  }
}

impl Config {
  /// Load configuration from a file, picking the parser from its extension.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config = Self::parse(&content, format, path)?;
    config.validate()?;

    Ok(config.normalize())
  }

  /// Parse configuration text in the given format.
  ///
  /// `origin` is only used for error messages.
  pub fn parse(content: &str, format: ConfigFormat, origin: &Path) -> Result<Self, ConfigError> {
    // An empty file means "all defaults" in every format.
    if content.trim().is_empty() {
      return Ok(Self::default());
    }

    match format {
      ConfigFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::JsonParseError {
        path: origin.to_path_buf(),
        source: e,
      }),
      ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParseError {
        path: origin.to_path_buf(),
        source: e,
      }),
      ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
        path: origin.to_path_buf(),
        source: e,
      }),
    }
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - The template has at least one non-blank line
  /// - `date_format` is a valid strftime format
  /// - User-defined header variables are scalars
  /// - Every include/exclude glob compiles
  /// - Comment style overrides have a start token and no leading dot
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.header.template.trim().is_empty() {
      return Err(ConfigError::invalid("header.template", "template cannot be empty"));
    }

    if StrftimeItems::new(&self.header.date_format).any(|item| matches!(item, Item::Error)) {
      return Err(ConfigError::invalid(
        "header.date_format",
        format!("'{}' is not a valid strftime format", self.header.date_format),
      ));
    }

    for (key, value) in &self.header.variables {
      if matches!(value, Value::Array(_) | Value::Object(_)) {
        return Err(ConfigError::invalid(
          format!("header.{}", key),
          "template variables must be strings, numbers or booleans",
        ));
      }
    }

    let patterns = [("files.include", &self.files.include), ("files.exclude", &self.files.exclude)];
    for (field, list) in patterns {
      for pattern in list {
        globset::Glob::new(pattern).map_err(|e| ConfigError::invalid(field, format!("'{}': {}", pattern, e)))?;
      }
    }

    for (ext, style) in &self.comment_styles {
      if style.start.trim().is_empty() {
        return Err(ConfigError::invalid(
          format!("comment_styles.{}", ext),
          "start token cannot be empty",
        ));
      }

      if ext.starts_with('.') {
        return Err(ConfigError::invalid(
          format!("comment_styles.{}", ext),
          "extension should not include leading dot",
        ));
      }
    }

    Ok(())
  }

  /// Check if the configuration has any comment style overrides.
  pub fn has_overrides(&self) -> bool {
    !self.comment_styles.is_empty()
  }

  /// Layer CLI overrides on top of this configuration.
  ///
  /// Scalar values replace; glob lists are appended.
  pub fn merge_cli_overrides(&mut self, overrides: CliOverrides) {
    if let Some(template) = overrides.template {
      // The shell hands us a literal backslash-n; treat it as a line break.
      self.header.template = template.replace("\\n", "\n");
    }
    if let Some(author) = overrides.author {
      self.header.author = Some(author);
    }
    if overrides.include_date {
      self.header.include_date = true;
    }
    for (key, value) in overrides.variables {
      self.header.set_variable(&key, value);
    }
    self.files.include.extend(overrides.include);
    self.files.exclude.extend(overrides.exclude);
  }

  /// Normalize comment style keys to lowercase for case-insensitive matching.
  fn normalize(self) -> Self {
    let comment_styles = self
      .comment_styles
      .into_iter()
      .map(|(k, v)| (k.to_lowercase(), v))
      .collect();

    Self { comment_styles, ..self }
  }
}

/// Values supplied on the command line that override the config file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliOverrides {
  pub template: Option<String>,
  pub author: Option<String>,
  pub include_date: bool,
  pub variables: Vec<(String, String)>,
  pub include: Vec<String>,
  pub exclude: Vec<String>,
}

impl CliOverrides {
  /// Parse `KEY=VALUE` pairs from repeated `--var` arguments.
  pub fn parse_variables(args: &[String]) -> Result<Vec<(String, String)>, ConfigError> {
    args
      .iter()
      .map(|arg| {
        let (key, value) = arg
          .split_once('=')
          .ok_or_else(|| ConfigError::invalid("--var", format!("'{}' is not in KEY=VALUE form", arg)))?;
        let key = key.trim();
        if key.is_empty() {
          return Err(ConfigError::invalid("--var", format!("'{}' has an empty key", arg)));
        }
        Ok((key.to_string(), value.to_string()))
      })
      .collect()
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` (passed as `explicit_path`)
/// 2. Path specified via the `ANNOT8_CONFIG` environment variable
/// 3. The first of [`CONFIG_FILENAMES`] present in the project root
pub fn discover_config_path(explicit_path: Option<&Path>, project_root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    verbose_log!("Using explicit config path: {}", path.display());
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  for name in CONFIG_FILENAMES {
    let candidate = project_root.join(name);
    if candidate.is_file() {
      verbose_log!("Using project config: {}", candidate.display());
      return Some(candidate);
    }
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path, or return the defaults.
///
/// An explicit path that does not exist is an error; a missing project config
/// is not.
pub fn load_config(explicit_path: Option<&Path>, project_root: &Path, no_config: bool) -> Result<Config, ConfigError> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(Config::default());
  }

  match discover_config_path(explicit_path, project_root) {
    Some(path) if !path.exists() => Err(ConfigError::NotFound(path)),
    Some(path) => Config::load(&path),
    None => Ok(Config::default()),
  }
}

/// Returns `true` if `path` names one of the config files.
pub fn is_config_file(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| CONFIG_FILENAMES.contains(&name))
}

fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Null | Value::Array(_) | Value::Object(_) => None,
  }
}

/// Accepts strings, numbers and booleans for fields like `version: 2.1`.
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    None | Some(Value::Null) => Ok(None),
    Some(value) => scalar_to_string(&value)
      .map(Some)
      .ok_or_else(|| D::Error::custom("expected a string, number or boolean")),
  }
}
