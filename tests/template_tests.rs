use std::path::Path;

use annot8::comment_style::CommentStyle;
use annot8::config::HeaderConfig;
use annot8::templates::{TemplateContext, TemplateManager, file_variables, format_with_comment_style, render_template};

fn render(template: &str, vars: &[(&str, &str)]) -> Vec<String> {
  let mut context = TemplateContext::new();
  for (key, value) in vars {
    context.insert(*key, *value);
  }
  render_template(template, &context).lines().to_vec()
}

#[test]
fn test_fallback_used_when_absent() {
  assert_eq!(render("{author|Anonymous}", &[]), vec!["Anonymous"]);
}

#[test]
fn test_value_wins_over_fallback() {
  assert_eq!(render("{author|Anonymous}", &[("author", "Bob")]), vec!["Bob"]);
}

#[test]
fn test_empty_value_uses_fallback() {
  assert_eq!(render("{author|Anonymous}", &[("author", "")]), vec!["Anonymous"]);
}

#[test]
fn test_fallback_with_spaces_and_punctuation() {
  assert_eq!(
    render("Owner: {team|Platform Team (core), ext. 42}", &[]),
    vec!["Owner: Platform Team (core), ext. 42"]
  );
}

#[test]
fn test_missing_variable_renders_empty() {
  assert_eq!(render("[{missing}]", &[]), vec!["[]"]);
}

#[test]
fn test_malformed_placeholders_do_not_fail() {
  assert_eq!(render("a {unclosed", &[]), vec!["a {unclosed"]);
  assert_eq!(render("a {} b", &[]), vec!["a {} b"]);
}

#[test]
fn test_blank_template_lines_are_preserved() {
  assert_eq!(render("one\n\nthree", &[]), vec!["one", "", "three"]);
}

#[test]
fn test_blank_lines_compose_to_bare_token() {
  let rendered = render_template("File: x\n\nEnd", &TemplateContext::new());

  assert_eq!(
    format_with_comment_style(&rendered, &CommentStyle::line("//")),
    vec!["// File: x", "//", "// End"]
  );
  assert_eq!(
    format_with_comment_style(&rendered, &CommentStyle::block("/*", "*/")),
    vec!["/* File: x */", "/* */", "/* End */"]
  );
}

#[test]
fn test_file_variables_use_forward_slashes() {
  let root = Path::new("/proj");
  let vars = file_variables(&root.join("src").join("lib").join("mod.test.ts"), root);

  assert_eq!(vars["file_path"], "src/lib/mod.test.ts");
  assert_eq!(vars["file_name"], "mod.test.ts");
  assert_eq!(vars["file_stem"], "mod.test");
  assert_eq!(vars["file_suffix"], ".ts");
  assert_eq!(vars["file_dir"], "src/lib");
}

#[test]
fn test_file_dir_at_root() {
  let root = Path::new("/proj");
  let vars = file_variables(&root.join("Makefile"), root);

  assert_eq!(vars["file_dir"], ".");
  assert_eq!(vars["file_suffix"], "");
}

#[test]
fn test_template_manager_combines_config_and_file_facts() {
  let mut header = HeaderConfig {
    template: "File: {file_path}\nBy {author} v{version|0.0.0} ({team})".to_string(),
    ..HeaderConfig::default()
  };
  header.set_variable("author", "Ada".to_string());
  header.set_variable("team", "infra".to_string());

  let manager = TemplateManager::new(header);
  let lines = manager.header_lines(Path::new("/proj/a/b.py"), Path::new("/proj"), &CommentStyle::line("#"));

  assert_eq!(lines, vec!["# File: a/b.py", "# By Ada v0.0.0 (infra)"]);
}

#[test]
fn test_date_variable_when_enabled() {
  let header = HeaderConfig {
    template: "File: {file_path}\nDate: {date|none}".to_string(),
    include_date: true,
    date_format: "%Y".to_string(),
    ..HeaderConfig::default()
  };

  let rendered = TemplateManager::new(header).render_for(Path::new("/p/x.rs"), Path::new("/p"));
  let date_line = &rendered.lines()[1];

  assert!(date_line.starts_with("Date: "));
  let year = date_line.trim_start_matches("Date: ");
  assert_eq!(year.len(), 4);
  assert!(year.chars().all(|c| c.is_ascii_digit()));
}
