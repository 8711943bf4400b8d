//! Decoded session events, independent of the wire encoding.

use serde::Deserialize;
use serde_json::Value;

/// Category of a session event, used for render dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// One assistant turn: text, tool invocations, tool results.
    AssistantTurn,
    /// End-of-session summary with duration and cost.
    ResultSummary,
    /// Session bootstrap info (model, tool inventory).
    SessionInit,
    /// A surfaced error from the agent.
    Error,
    /// The agent is retrying a failed request.
    Retry,
    /// Anything the known kinds do not cover.
    Other,
}

/// One event from the agent session stream.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    /// Raw wire subtype, e.g. "init" or "error_during_execution".
    pub subkind: Option<String>,
    pub session_id: Option<String>,
    /// Ordered content blocks. Empty for events that carry none.
    pub blocks: Vec<ContentBlock>,
    pub duration_ms: Option<u64>,
    pub total_cost_usd: Option<f64>,
    pub is_error: bool,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            subkind: None,
            session_id: None,
            blocks: Vec::new(),
            duration_ms: None,
            total_cost_usd: None,
            is_error: false,
        }
    }

    pub fn with_blocks(kind: EventKind, blocks: Vec<ContentBlock>) -> Self {
        let mut event = Self::new(kind);
        event.blocks = blocks;
        event
    }

    /// Iterate the text payloads of this event's text blocks.
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Content inside an event, already narrowed to the shapes the renderer
/// knows how to draw.
#[derive(Debug, Clone)]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    ToolResult {
        output: Option<String>,
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_use(name: impl Into<String>, input: Value) -> Self {
        Self::ToolUse {
            name: name.into(),
            input,
        }
    }
}

// ── Checklist tasks ─────────────────────────────────────────────────────────

/// One task from a checklist-update tool call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Pull the task list out of a checklist tool's input. Items that do not
/// deserialize are dropped rather than failing the whole list.
pub fn tasks_from_input(input: &Value) -> Vec<Task> {
    input
        .get("todos")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
