//! Turns decoded events into transcript text.
//!
//! One renderer lives for the whole session. It never fails: whatever an
//! event is missing, the worst outcome is an empty string.

use std::sync::LazyLock;

use difflens_stream::{ContentBlock, Event, EventKind, tasks_from_input};
use regex::Regex;
use serde_json::Value;

use crate::checklist::{self, ChecklistStore};
use crate::classify::classify;
use crate::style;
use crate::tools::{self, BodyRule};

/// Transport-level trouble worth surfacing from otherwise ignored events.
static API_TROUBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"API Error|Retrying|attempt").expect("static pattern"));

const RESULT_RULE_LEN: usize = 40;
const SESSION_STARTED: &str = "Session started";

/// Stateful transcript renderer for one agent run.
pub struct Renderer {
    work_dir: String,
    debug: bool,
    store: ChecklistStore,
    /// Key for checklist state when events carry no session id.
    fallback_key: String,
}

impl Renderer {
    pub fn new(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            debug: false,
            store: ChecklistStore::new(),
            fallback_key: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Dump raw events and classification decisions to the log. The
    /// transcript itself is unaffected; diagnostics ride the log channel.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn checklist(&self) -> &ChecklistStore {
        &self.store
    }

    /// Render one event. Returns the exact text to print, or an empty
    /// string when the event has nothing to show.
    pub fn render(&mut self, event: &Event) -> String {
        if self.debug {
            tracing::debug!(target: "difflens::transcript", ?event, "event received");
        }
        match event.kind {
            EventKind::AssistantTurn => self.render_assistant_turn(event),
            EventKind::ResultSummary => render_result_summary(event),
            EventKind::SessionInit => render_session_init(event),
            EventKind::Error | EventKind::Retry => render_notice(event),
            EventKind::Other => render_unhandled(event),
        }
    }

    fn render_assistant_turn(&mut self, event: &Event) -> String {
        let has_tools = event
            .blocks
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }));

        let mut out = String::new();
        let mut last_was_tool = false;
        for block in &event.blocks {
            match block {
                ContentBlock::Text { text } => {
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let verdict = classify(text, has_tools);
                    if self.debug {
                        tracing::debug!(
                            target: "difflens::transcript",
                            ?verdict,
                            has_tools,
                            text = %text,
                            "text classified"
                        );
                    }
                    if verdict.is_shown() {
                        if last_was_tool && !out.is_empty() && !out.ends_with("\n\n") {
                            out.push('\n');
                        }
                        out.push_str(&format!("\n{text}\n"));
                    }
                    last_was_tool = false;
                }
                ContentBlock::ToolUse { name, input } => {
                    out.push_str(&self.render_tool_use(event, name, input));
                    last_was_tool = true;
                }
                ContentBlock::ToolResult { output, .. } => {
                    if output.as_deref().is_some_and(|o| !o.is_empty()) {
                        out.push_str(&tools::render_result(output.as_deref()));
                        last_was_tool = true;
                    }
                }
            }
        }
        out
    }

    fn render_tool_use(&mut self, event: &Event, name: &str, input: &Value) -> String {
        let mut out = tools::render_header(name, input, &self.work_dir);
        if matches!(tools::rule_for(name).body, BodyRule::Checklist) {
            let key = event.session_id.as_deref().unwrap_or(&self.fallback_key);
            if self.store.record(key, tasks_from_input(input)) {
                if let Some(tasks) = self.store.get(key) {
                    out.push_str(&checklist::render_tasks(tasks));
                }
            }
        } else {
            out.push_str(&tools::render_body(name, input, &self.work_dir));
        }
        out
    }
}

// ── Stateless event renderings ──────────────────────────────────────────────

fn render_result_summary(event: &Event) -> String {
    if event.duration_ms.is_none() && event.total_cost_usd.is_none() {
        return String::new();
    }
    let mut out = format!("\n{}\n", style::dim(&"─".repeat(RESULT_RULE_LEN)));
    if let Some(ms) = event.duration_ms {
        out.push_str(&style::dim(&format!("Duration: {}", style::format_duration(ms))));
        out.push('\n');
    }
    if let Some(cost) = event.total_cost_usd {
        out.push_str(&style::dim(&format!("Cost: {}", style::format_cost(cost))));
        out.push('\n');
    }
    out
}

fn render_session_init(event: &Event) -> String {
    let mut out = String::new();
    for text in event.text_blocks() {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.contains(SESSION_STARTED) {
                continue;
            }
            out.push_str(&style::dim(&format!("{}{line}", style::INDENT)));
            out.push('\n');
        }
    }
    out
}

/// Errors and retries: a yellow elbow with muted detail.
fn render_notice(event: &Event) -> String {
    event
        .text_blocks()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(warning_line)
        .collect()
}

/// Events nothing else claims stay silent unless they look like API
/// trouble.
fn render_unhandled(event: &Event) -> String {
    event
        .text_blocks()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty() && API_TROUBLE.is_match(line))
        .map(warning_line)
        .collect()
}

fn warning_line(text: &str) -> String {
    format!(
        "{}{}\n",
        style::yellow(&format!("{}{}", style::INDENT, style::TREE_ELBOW)),
        style::gray(text)
    )
}
