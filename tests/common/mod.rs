#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use annot8::config::Config;
use annot8::processor::{ProcessResult, process};
use anyhow::{Context, Result};
use assert_cmd::Command;
use tempfile::TempDir;

/// A temporary project directory with a canonical root path.
pub struct TestProject {
  _dir: TempDir,
  root: PathBuf,
}

impl TestProject {
  /// Creates an empty project.
  pub fn new() -> Result<Self> {
    let dir = tempfile::tempdir()?;
    let root = fs::canonicalize(dir.path())?;
    Ok(Self { _dir: dir, root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Absolute path of a project-relative file.
  pub fn path(&self, relative: &str) -> PathBuf {
    self.root.join(relative)
  }

  /// Writes a file, creating parent directories as needed.
  pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
  }

  /// Reads a file back as text.
  pub fn read(&self, relative: &str) -> Result<String> {
    let path = self.path(relative);
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
  }

  /// Processes one project file with `config`.
  pub fn process(&self, relative: &str, config: &Config) -> ProcessResult {
    process(&self.path(relative), &self.root, config, false)
  }

  /// The annot8 binary, run from the project root with a clean environment.
  pub fn annot8(&self) -> Result<Command> {
    let mut cmd = Command::cargo_bin("annot8")?;
    cmd
      .current_dir(&self.root)
      .env_remove("ANNOT8_CONFIG")
      .env_remove("RUST_LOG")
      .arg("--root")
      .arg(&self.root)
      .arg("--colors=never");
    Ok(cmd)
  }
}

/// A default config with the given template.
pub fn config_with_template(template: &str) -> Config {
  let mut config = Config::default();
  config.header.template = template.to_string();
  config
}
