//! Per-tool rendering rules: how an invocation becomes a header line and
//! an optional body.
//!
//! The rules live in one table so adding a tool is a row, not a branch.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::style;

/// Where the header's parenthetical argument comes from.
#[derive(Debug, Clone, Copy)]
pub enum HeaderArg {
    /// String field holding an absolute path, shown relative to the
    /// working directory.
    RelPath(&'static str),
    /// Like `RelPath` with a trailing `/`, for directory listings.
    RelDir(&'static str),
    /// String field shown verbatim.
    Verbatim(&'static str),
    /// Header carries no argument.
    None,
}

/// What goes under the header.
#[derive(Debug, Clone, Copy)]
pub enum BodyRule {
    /// Header only; the invocation is self-describing.
    Suppress,
    /// Muted `in <path>` line from the `path` field, when present.
    SearchPath,
    /// Checklist update; the dispatcher owns the state for this one.
    Checklist,
    /// Muted line from the named string field.
    MutedField(&'static str),
    /// First non-empty input value, stringified.
    FirstValue,
}

pub struct ToolRule {
    pub name: &'static str,
    /// Friendlier header title; `None` keeps the raw tool name.
    pub display_name: Option<&'static str>,
    pub header_arg: HeaderArg,
    pub body: BodyRule,
}

pub static TOOL_RULES: &[ToolRule] = &[
    ToolRule { name: "Read", display_name: None, header_arg: HeaderArg::RelPath("file_path"), body: BodyRule::Suppress },
    ToolRule { name: "Write", display_name: None, header_arg: HeaderArg::RelPath("file_path"), body: BodyRule::Suppress },
    ToolRule { name: "Edit", display_name: None, header_arg: HeaderArg::RelPath("file_path"), body: BodyRule::Suppress },
    ToolRule { name: "MultiEdit", display_name: None, header_arg: HeaderArg::RelPath("file_path"), body: BodyRule::Suppress },
    ToolRule { name: "Grep", display_name: None, header_arg: HeaderArg::Verbatim("pattern"), body: BodyRule::SearchPath },
    ToolRule { name: "Glob", display_name: None, header_arg: HeaderArg::Verbatim("pattern"), body: BodyRule::Suppress },
    ToolRule { name: "Bash", display_name: None, header_arg: HeaderArg::Verbatim("command"), body: BodyRule::Suppress },
    ToolRule { name: "LS", display_name: Some("List Directory"), header_arg: HeaderArg::RelDir("path"), body: BodyRule::Suppress },
    ToolRule { name: "WebSearch", display_name: None, header_arg: HeaderArg::Verbatim("query"), body: BodyRule::Suppress },
    ToolRule { name: "WebFetch", display_name: None, header_arg: HeaderArg::Verbatim("url"), body: BodyRule::Suppress },
    ToolRule { name: "Task", display_name: None, header_arg: HeaderArg::Verbatim("description"), body: BodyRule::MutedField("prompt") },
    ToolRule { name: "TodoWrite", display_name: Some("Update Todos"), header_arg: HeaderArg::None, body: BodyRule::Checklist },
];

/// Tools without a row fall back to a bare header and first-value body.
const DEFAULT_RULE: ToolRule = ToolRule {
    name: "",
    display_name: None,
    header_arg: HeaderArg::None,
    body: BodyRule::FirstValue,
};

pub fn rule_for(name: &str) -> &'static ToolRule {
    TOOL_RULES
        .iter()
        .find(|rule| rule.name == name)
        .unwrap_or(&DEFAULT_RULE)
}

// ── Header ──────────────────────────────────────────────────────────────────

/// `\n{green bullet}{bold name}({arg})\n`, argument omitted when the rule
/// finds nothing usable in the input.
pub fn render_header(name: &str, input: &Value, work_dir: &str) -> String {
    let rule = rule_for(name);
    let title = rule.display_name.unwrap_or(name);
    match header_argument(rule, input, work_dir) {
        Some(arg) => format!(
            "\n{}{}{}{}{}\n",
            style::green(style::BULLET),
            style::bold(title),
            style::gray("("),
            style::white(&arg),
            style::gray(")"),
        ),
        None => format!("\n{}{}\n", style::green(style::BULLET), style::bold(title)),
    }
}

fn header_argument(rule: &ToolRule, input: &Value, work_dir: &str) -> Option<String> {
    match rule.header_arg {
        HeaderArg::RelPath(field) => string_field(input, field).map(|p| style::relative_to(p, work_dir)),
        HeaderArg::RelDir(field) => {
            string_field(input, field).map(|p| format!("{}/", style::relative_to(p, work_dir)))
        }
        HeaderArg::Verbatim(field) => string_field(input, field).map(str::to_string),
        HeaderArg::None => None,
    }
}

fn string_field<'a>(input: &'a Value, field: &str) -> Option<&'a str> {
    input.get(field).and_then(Value::as_str)
}

// ── Body ────────────────────────────────────────────────────────────────────

/// Body for everything except checklist updates, which need the
/// dispatcher's state. Missing or oddly typed fields render nothing.
pub fn render_body(name: &str, input: &Value, work_dir: &str) -> String {
    match rule_for(name).body {
        BodyRule::Suppress | BodyRule::Checklist => String::new(),
        BodyRule::SearchPath => match string_field(input, "path") {
            Some(path) => param_line(&style::gray(&format!("in {}", style::relative_to(path, work_dir)))),
            None => String::new(),
        },
        BodyRule::MutedField(field) => match string_field(input, field) {
            Some(text) => param_line(&style::gray(text)),
            None => String::new(),
        },
        BodyRule::FirstValue => match first_value(input) {
            Some(text) => param_line(&text),
            None => String::new(),
        },
    }
}

/// One indented tree line under a header.
fn param_line(value: &str) -> String {
    format!("{}{}{}\n", style::INDENT, style::gray(style::TREE_NODE), value)
}

fn first_value(input: &Value) -> Option<String> {
    let object = input.as_object()?;
    let value = object.values().find(|v| is_truthy(v))?;
    Some(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ── Tool results ────────────────────────────────────────────────────────────

static READ_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Read \d+ lines").expect("static pattern"));

/// Muted rendering of a tool result. File-read results collapse to their
/// summary line; everything else keeps its non-blank lines.
pub fn render_result(output: Option<&str>) -> String {
    let Some(output) = output else {
        return String::new();
    };
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let first = trimmed.lines().next().unwrap_or("");
    if READ_LINES.is_match(first) {
        return format!("{}{}{}\n", style::INDENT, style::TREE_ELBOW, style::gray(first));
    }

    let mut out = String::new();
    for (i, line) in trimmed.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        if i == 0 {
            out.push_str(&format!(
                "{}{}{}\n",
                style::INDENT,
                style::gray(style::TREE_NODE),
                style::gray(line)
            ));
        } else {
            out.push_str(&format!("{}{}\n", style::INDENT_CONT, style::gray(line)));
        }
    }
    out
}
