//! ANSI styling and the shared glyph set.
//!
//! Everything the CLI prints goes through these helpers so the transcript
//! keeps one visual language.

// ── Glyphs ──────────────────────────────────────────────────────────────────

pub const BULLET: &str = "● ";
pub const CHECKBOX_DONE: &str = "☑";
pub const CHECKBOX_OPEN: &str = "☐";
pub const TREE_NODE: &str = "└─ ";
pub const TREE_ELBOW: &str = "⎿  ";
pub const WARN_SIGN: &str = "⚠ ";
pub const INFO_SIGN: &str = "ℹ ";
pub const CROSS: &str = "✗ ";
pub const CHECK: &str = "✓ ";
pub const ARROW: &str = "▶ ";

/// Indent for tool bodies and checklist items.
pub const INDENT: &str = "  ";
/// Continuation indent for wrapped tool output.
pub const INDENT_CONT: &str = "     ";

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Erase the current line, for spinner redraws.
pub const CLEAR_LINE: &str = "\r\x1b[2K";

// ── Colors ──────────────────────────────────────────────────────────────────

pub fn bold(text: &str) -> String {
    format!("\x1b[1m{text}\x1b[0m")
}

pub fn dim(text: &str) -> String {
    format!("\x1b[2m{text}\x1b[0m")
}

pub fn red(text: &str) -> String {
    format!("\x1b[31m{text}\x1b[0m")
}

pub fn green(text: &str) -> String {
    format!("\x1b[32m{text}\x1b[0m")
}

pub fn yellow(text: &str) -> String {
    format!("\x1b[33m{text}\x1b[0m")
}

pub fn cyan(text: &str) -> String {
    format!("\x1b[36m{text}\x1b[0m")
}

pub fn white(text: &str) -> String {
    format!("\x1b[37m{text}\x1b[0m")
}

pub fn gray(text: &str) -> String {
    format!("\x1b[90m{text}\x1b[0m")
}

/// Completed checklist entries: struck through and green in one sequence,
/// since a nested reset would cancel the outer color.
pub fn green_strike(text: &str) -> String {
    format!("\x1b[9;32m{text}\x1b[0m")
}

// ── Furniture ───────────────────────────────────────────────────────────────

const MAX_BANNER_WIDTH: usize = 80;

/// Bold title over a dim rule, for command banners.
pub fn banner(title: &str) -> String {
    let width = (title.chars().count() + 10).min(MAX_BANNER_WIDTH);
    format!("\n{}\n{}\n", bold(title), dim(&"─".repeat(width)))
}

/// A bold `▶` heading with surrounding blank lines.
pub fn section(text: &str) -> String {
    format!("\n{}\n", bold(&format!("{ARROW}{text}")))
}

pub fn success_line(text: &str) -> String {
    format!("{}{text}", green(CHECK))
}

pub fn error_line(text: &str) -> String {
    format!("{}{text}", red(CROSS))
}

pub fn info_line(text: &str) -> String {
    format!("{}{text}", cyan(INFO_SIGN))
}

pub fn warning_line(text: &str) -> String {
    format!("{}{text}", yellow(WARN_SIGN))
}

/// Cycles braille frames for inline progress.
#[derive(Debug, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_frame(&mut self) -> &'static str {
        let frame = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        self.frame = self.frame.wrapping_add(1);
        frame
    }
}

// ── Formatting helpers ──────────────────────────────────────────────────────

/// Shorten an absolute path against the working directory: strip the
/// prefix and at most one leading separator. Paths outside the working
/// directory come back unchanged.
pub fn relative_to(path: &str, work_dir: &str) -> String {
    if work_dir.is_empty() {
        return path.to_string();
    }
    match path.strip_prefix(work_dir) {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest).to_string(),
        None => path.to_string(),
    }
}

/// Milliseconds as seconds with two decimals, e.g. `2.50s`.
pub fn format_duration(ms: u64) -> String {
    format!("{:.2}s", ms as f64 / 1000.0)
}

/// Dollar cost with four decimals, e.g. `$0.0123`.
pub fn format_cost(usd: f64) -> String {
    format!("${usd:.4}")
}
