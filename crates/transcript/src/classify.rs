//! Decides which assistant narration is worth terminal space.
//!
//! Agents narrate constantly ("Let me check...", "Now I'll run...").
//! Most of it restates the tool call that follows, so the transcript
//! drops it and keeps findings, errors, and summaries.

use std::sync::LazyLock;

use regex::Regex;

/// Texts shorter than this are noise unless something marks them important.
pub const MIN_TEXT_LENGTH: usize = 50;

/// Openers that announce the next action rather than report anything.
static LOW_SIGNAL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)^(let me|i'll|i will|i can see|i need to|now i|let's|i'm going to|i should|i see|first,)",
        r"(?i)^(analyzing|examine|check|look at|understand|now let me|based on)",
        r"(?i)^(here's what|i've|the)",
        r"(?i)^now let me",
    ])
});

/// Signals that a fragment reports an outcome the user must see.
static IMPORTANT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)error|warning|failed|success|complete|created|found|detected",
        r"^##|^\*\*",
        r"(?i)summary|analysis|findings|results",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("pattern table is static"))
        .collect()
}

/// What to do with one free-text fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Drop it.
    Suppress,
    /// Show it; it reads like a status update.
    ShowAsStatus,
    /// Show it as ordinary prose.
    ShowPlain,
}

impl Verdict {
    pub fn is_shown(self) -> bool {
        !matches!(self, Verdict::Suppress)
    }
}

/// Classify a text fragment. `has_sibling_tools` is whether the same turn
/// also invokes tools, which makes short narration redundant.
///
/// Importance always wins: a fragment matching an important pattern is
/// shown even when it also opens like narration.
pub fn classify(text: &str, has_sibling_tools: bool) -> Verdict {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Verdict::Suppress;
    }

    let important = IMPORTANT.iter().any(|re| re.is_match(trimmed));
    if important {
        return if looks_like_status(trimmed) {
            Verdict::ShowAsStatus
        } else {
            Verdict::ShowPlain
        };
    }

    if LOW_SIGNAL.iter().any(|re| re.is_match(trimmed)) {
        return Verdict::Suppress;
    }

    if looks_like_status(trimmed) {
        return Verdict::ShowAsStatus;
    }
    if !has_sibling_tools && trimmed.chars().count() > MIN_TEXT_LENGTH {
        return Verdict::ShowPlain;
    }
    Verdict::Suppress
}

fn looks_like_status(text: &str) -> bool {
    text.contains("created") || text.contains("Analysis") || text.contains("**")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_suppressed() {
        assert_eq!(classify("", false), Verdict::Suppress);
        assert_eq!(classify("   \n\t", true), Verdict::Suppress);
    }

    #[test]
    fn test_short_narration_with_tools_suppressed() {
        assert_eq!(classify("Let me check the config.", true), Verdict::Suppress);
        assert_eq!(classify("Now I'll run the tests.", true), Verdict::Suppress);
        assert_eq!(classify("I've looked at the file.", true), Verdict::Suppress);
    }

    #[test]
    fn test_narration_openers_are_case_insensitive() {
        assert_eq!(classify("LET ME look around.", true), Verdict::Suppress);
        assert_eq!(classify("analyzing the tree now", true), Verdict::Suppress);
    }

    #[test]
    fn test_important_never_suppressed() {
        // Opens like narration, short, and tools present, but carries an
        // important keyword. Importance wins.
        assert!(classify("Let me write the summary.", true).is_shown());
        assert!(classify("I've detected a problem.", true).is_shown());
        assert!(classify("error: port in use", true).is_shown());
    }

    #[test]
    fn test_headings_and_emphasis_shown() {
        assert_eq!(classify("## Findings", true), Verdict::ShowPlain);
        assert!(classify("**Done** with the pass", true).is_shown());
    }

    #[test]
    fn test_status_markers_render_as_status() {
        assert_eq!(classify("3 screenshots created", true), Verdict::ShowAsStatus);
        assert_eq!(classify("Analysis finished", true), Verdict::ShowAsStatus);
        // Emphasis mid-text is a status marker even without important words.
        assert_eq!(classify("Moving on to **capture**", true), Verdict::ShowAsStatus);
    }

    #[test]
    fn test_long_plain_text_without_tools_shown() {
        let text = "This paragraph describes the layout change in enough detail to matter.";
        assert_eq!(classify(text, false), Verdict::ShowPlain);
    }

    #[test]
    fn test_long_plain_text_with_tools_suppressed() {
        let text = "This paragraph would be shown on its own but is redundant next to tools, really.";
        assert_eq!(classify(text, true), Verdict::Suppress);
    }

    #[test]
    fn test_short_plain_text_suppressed() {
        assert_eq!(classify("Just a short note", false), Verdict::Suppress);
    }
}
