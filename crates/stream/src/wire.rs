//! Lenient decoding of the agent's stream-json output.
//!
//! Each line on stdout is one JSON object. Lines that fail to decode are
//! logged and skipped; a session must keep rendering no matter what the
//! agent emits.

use serde::Deserialize;
use serde_json::Value;

use crate::event::{ContentBlock, Event, EventKind};

/// Decode one stdout line into an event. Returns `None` for blank or
/// malformed lines.
pub fn parse_line(line: &str) -> Option<Event> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<RawLine>(trimmed) {
        Ok(raw) => Some(raw.into_event()),
        Err(e) => {
            tracing::debug!("skipping malformed stream line: {}", e);
            None
        }
    }
}

// ── Raw wire shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RawLine {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    message: Option<RawMessageBody>,
    // system init
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    tools: Vec<String>,
    // result
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    total_cost_usd: Option<f64>,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    result: Option<String>,
}

/// `message` is a nested API message on conversation events, but a bare
/// string on error and retry notices.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMessageBody {
    Structured(RawMessage),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    content: RawContent,
}

#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
enum RawContent {
    String(String),
    Blocks(Vec<RawBlock>),
    #[default]
    Null,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        content: RawToolResultContent,
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Unknown,
}

/// Tool result payloads arrive as a plain string, a block list, or nothing.
#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
enum RawToolResultContent {
    Text(String),
    Blocks(Vec<RawBlock>),
    #[default]
    Null,
}

impl RawToolResultContent {
    fn into_output(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Blocks(blocks) => {
                let texts: Vec<String> = blocks
                    .into_iter()
                    .filter_map(|block| match block {
                        RawBlock::Text { text } => Some(text),
                        _ => None,
                    })
                    .collect();
                if texts.is_empty() { None } else { Some(texts.join("\n")) }
            }
            Self::Null => None,
        }
    }
}

// ── Conversion ──────────────────────────────────────────────────────────────

impl RawLine {
    fn into_event(self) -> Event {
        let RawLine {
            kind,
            subtype,
            session_id,
            message,
            model,
            tools,
            duration_ms,
            total_cost_usd,
            is_error,
            result,
        } = self;

        let mut event = match kind.as_deref().unwrap_or("") {
            "system" if subtype.as_deref() == Some("init") => {
                let mut blocks = Vec::new();
                if let Some(model) = &model {
                    blocks.push(ContentBlock::text(format!("Model: {model}")));
                }
                if !tools.is_empty() {
                    blocks.push(ContentBlock::text(format!("Loaded {} tools", tools.len())));
                }
                Event::with_blocks(EventKind::SessionInit, blocks)
            }
            "assistant" => Event::with_blocks(EventKind::AssistantTurn, content_blocks(message)),
            "user" => {
                // Tool results come back on user events. Anything else a
                // user event carries is prompt echo, which only the
                // API-error scan should ever surface.
                let (results, rest): (Vec<_>, Vec<_>) = content_blocks(message)
                    .into_iter()
                    .partition(|block| matches!(block, ContentBlock::ToolResult { .. }));
                if results.is_empty() {
                    Event::with_blocks(EventKind::Other, rest)
                } else {
                    Event::with_blocks(EventKind::AssistantTurn, results)
                }
            }
            "result" => {
                let blocks = result.map(ContentBlock::text).into_iter().collect();
                Event::with_blocks(EventKind::ResultSummary, blocks)
            }
            "error" => Event::with_blocks(EventKind::Error, text_blocks_of(message)),
            "retry" => Event::with_blocks(EventKind::Retry, text_blocks_of(message)),
            _ => Event::with_blocks(EventKind::Other, text_blocks_of(message)),
        };

        event.subkind = match event.kind {
            EventKind::Other => subtype.clone().or(kind),
            _ => subtype.clone(),
        };
        event.session_id = session_id;
        event.duration_ms = duration_ms;
        event.total_cost_usd = total_cost_usd;
        event.is_error = is_error || subtype.as_deref().is_some_and(|s| s.starts_with("error"));
        event
    }
}

fn content_blocks(message: Option<RawMessageBody>) -> Vec<ContentBlock> {
    match message {
        Some(RawMessageBody::Structured(m)) => convert_content(m.content),
        Some(RawMessageBody::Text(text)) => vec![ContentBlock::text(text)],
        None => Vec::new(),
    }
}

/// Like [`content_blocks`] but keeps only text, for events where tool
/// blocks have no meaning.
fn text_blocks_of(message: Option<RawMessageBody>) -> Vec<ContentBlock> {
    content_blocks(message)
        .into_iter()
        .filter(|block| matches!(block, ContentBlock::Text { .. }))
        .collect()
}

fn convert_content(content: RawContent) -> Vec<ContentBlock> {
    match content {
        RawContent::String(text) => vec![ContentBlock::text(text)],
        RawContent::Blocks(blocks) => blocks.into_iter().filter_map(convert_block).collect(),
        RawContent::Null => Vec::new(),
    }
}

fn convert_block(block: RawBlock) -> Option<ContentBlock> {
    match block {
        RawBlock::Text { text } => Some(ContentBlock::Text { text }),
        RawBlock::ToolUse { name, input } => Some(ContentBlock::ToolUse { name, input }),
        RawBlock::ToolResult { content, is_error } => Some(ContentBlock::ToolResult {
            output: content.into_output(),
            is_error,
        }),
        RawBlock::Unknown => None,
    }
}
