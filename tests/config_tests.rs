mod common;

use annot8::config::{ConfigError, load_config};
use annot8::processor::ProcessStatus;
use anyhow::Result;
use common::TestProject;

#[test]
fn test_yaml_config_drives_template_and_styles() -> Result<()> {
  let project = TestProject::new()?;
  project.write(
    ".annot8.yaml",
    r#"header:
  template: "File: {file_path}\nTeam: {team|none}"
  team: platform
comment_styles:
  tmpl:
    start: "{{!--"
    end: "--}}"
"#,
  )?;
  project.write("views/page.tmpl", "<p>hi</p>\n")?;

  let config = load_config(None, project.root(), false)?;
  let result = project.process("views/page.tmpl", &config);

  assert_eq!(result.status, ProcessStatus::Modified);
  assert_eq!(
    project.read("views/page.tmpl")?,
    "{{!-- File: views/page.tmpl --}}\n{{!-- Team: platform --}}\n<p>hi</p>\n"
  );
  assert_eq!(project.process("views/page.tmpl", &config).status, ProcessStatus::Unchanged);
  Ok(())
}

#[test]
fn test_json_config() -> Result<()> {
  let project = TestProject::new()?;
  project.write(
    ".annot8.json",
    r#"{"header": {"template": "File: {file_path}\nVersion: {version}", "version": 2}}"#,
  )?;
  project.write("a.py", "pass\n")?;

  let config = load_config(None, project.root(), false)?;
  project.process("a.py", &config);

  assert_eq!(project.read("a.py")?, "# File: a.py\n# Version: 2\npass\n");
  Ok(())
}

#[test]
fn test_toml_config_with_files_rules() -> Result<()> {
  let project = TestProject::new()?;
  project.write(
    ".annot8.toml",
    r#"
[header]
template = "File: {file_path}"

[files]
exclude = ["skip/"]
"#,
  )?;
  project.write("skip/a.rs", "fn a() {}\n")?;

  let config = load_config(None, project.root(), false)?;
  let result = project.process("skip/a.rs", &config);

  assert_eq!(result.status, ProcessStatus::Skipped);
  assert_eq!(project.read("skip/a.rs")?, "fn a() {}\n");
  Ok(())
}

#[test]
fn test_no_config_ignores_project_file() -> Result<()> {
  let project = TestProject::new()?;
  project.write(".annot8.json", r#"{"header": {"template": "File: {file_path}\nX"}}"#)?;

  let config = load_config(None, project.root(), true)?;

  assert_eq!(config.header.template, "File: {file_path}");
  Ok(())
}

#[test]
fn test_malformed_config_is_an_error() -> Result<()> {
  let project = TestProject::new()?;
  project.write(".annot8.yaml", "header: [unclosed\n")?;

  let err = load_config(None, project.root(), false).expect_err("malformed yaml");

  assert!(matches!(err, ConfigError::YamlParseError { .. }));
  Ok(())
}

#[test]
fn test_missing_explicit_config_is_an_error() -> Result<()> {
  let project = TestProject::new()?;

  let err = load_config(Some(&project.path("nope.yaml")), project.root(), false).expect_err("missing config");

  assert!(matches!(err, ConfigError::NotFound(_)));
  Ok(())
}
