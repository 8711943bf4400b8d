//! Prompt assembly from embedded templates.
//!
//! Templates use `{{name}}` placeholders. Unknown placeholders stay in
//! place so a typo is visible in `--dry-run` output instead of silently
//! vanishing.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const ANALYZE_TEMPLATE: &str = include_str!("../prompts/analyze.md");
const CAPTURE_TEMPLATE: &str = include_str!("../prompts/capture.md");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("static pattern"));

pub fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            vars.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Prompt for `init`: analyze the project and write the config document.
pub fn analyze_prompt(doc_name: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("doc_name", doc_name.to_string());
    render_template(ANALYZE_TEMPLATE, &vars)
}

/// Prompt for a capture run.
pub fn capture_prompt(changed_files: &[String], config_doc: &str, output_dir: &str) -> String {
    let file_list = changed_files
        .iter()
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut vars = HashMap::new();
    vars.insert("changed_files", file_list);
    vars.insert("config_doc", config_doc.to_string());
    vars.insert("output_dir", output_dir.to_string());
    render_template(CAPTURE_TEMPLATE, &vars)
}
