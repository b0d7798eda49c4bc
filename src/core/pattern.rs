//! Marker matching and snippet text for tagged log statements.
//!
//! A line is "tagged" when it carries a `console.log(...)` call whose argument
//! text contains the `[TLOG]` marker. Matching is line-oriented and
//! case-insensitive; no attempt is made to parse the surrounding code.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// The literal marker token.
pub const MARKER: &str = "[TLOG]";

/// Insertion template: one editable placeholder (`${1:message}`) and a final
/// cursor-rest position (`${0}`).
pub const SNIPPET_TEMPLATE: &str = "console.log('[TLOG] ${1:message}');${0}";

const PLACEHOLDER: &str = "${1:message}";
const FINAL_STOP: &str = "${0}";

static TLOG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)console\.log\s*\(\s*.*\[TLOG\].*\)").expect("static TLOG pattern is valid")
});

static MESSAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[TLOG\]\s*(.+?)['"`)]"#).expect("static message pattern is valid")
});

/// True iff `line` contains a tagged log call.
pub fn is_tlog_line(line: &str) -> bool {
    TLOG_PATTERN.is_match(line)
}

/// Snippet text after placeholder expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSnippet {
    pub text: String,
    /// Byte range of the expanded placeholder inside `text`.
    pub placeholder: Range<usize>,
    /// Byte offset where the cursor comes to rest.
    pub cursor: usize,
}

/// Expand [`SNIPPET_TEMPLATE`] with `message` in place of the placeholder.
pub fn render_snippet(message: &str) -> RenderedSnippet {
    let start = SNIPPET_TEMPLATE
        .find(PLACEHOLDER)
        .unwrap_or(SNIPPET_TEMPLATE.len());

    let mut text = String::with_capacity(SNIPPET_TEMPLATE.len() + message.len());
    text.push_str(&SNIPPET_TEMPLATE[..start]);
    text.push_str(message);
    let placeholder = start..start + message.len();

    let rest = SNIPPET_TEMPLATE
        .get(start + PLACEHOLDER.len()..)
        .unwrap_or("");
    let stop = rest.find(FINAL_STOP).unwrap_or(rest.len());
    text.push_str(&rest[..stop]);
    let cursor = text.len();
    text.push_str(rest.get(stop + FINAL_STOP.len()..).unwrap_or(""));

    RenderedSnippet { text, placeholder, cursor }
}

/// Human-readable message of a tagged line, used for tree labels.
///
/// Prefers the text between the marker and the closing quote; falls back to
/// everything after the marker with quotes and punctuation stripped, then to
/// the first 50 characters of the line.
pub fn extract_message(content: &str) -> String {
    if let Some(caps) = MESSAGE_PATTERN.captures(content) {
        if let Some(m) = caps.get(1) {
            return m.as_str().trim().to_string();
        }
    }

    if let Some(idx) = content.find(MARKER) {
        return content[idx + MARKER.len()..]
            .trim()
            .chars()
            .filter(|c| !matches!(c, '\'' | '"' | '`' | ')' | ';'))
            .collect();
    }

    let head: String = content.chars().take(50).collect();
    if content.chars().count() > 50 {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_marker_with_any_quote_style() {
        assert!(is_tlog_line(r#"console.log("[TLOG] test message");"#));
        assert!(is_tlog_line("console.log('[TLOG] test');"));
        assert!(is_tlog_line("console.log(`[TLOG] ${value}`);"));
    }

    #[test]
    fn matches_case_insensitively_and_with_inner_whitespace() {
        assert!(is_tlog_line(r#"Console.Log("[tlog] test");"#));
        assert!(is_tlog_line(r#"console.log  (  "[TLOG] test"  );"#));
        assert!(is_tlog_line(
            r#"console.log("[TLOG] user ${name} logged in at " + new Date());"#
        ));
    }

    #[test]
    fn rejects_untagged_or_non_log_lines() {
        assert!(!is_tlog_line(r#"console.log("regular message");"#));
        assert!(!is_tlog_line(r#"log("[TLOG] test");"#));
        assert!(!is_tlog_line(r#"console.log("LOG] test");"#));
        assert!(!is_tlog_line(r#"console.log("[TLOG test");"#));
        assert!(!is_tlog_line(""));
    }

    #[test]
    fn snippet_expands_placeholder_and_cursor() {
        let s = render_snippet("hello");
        assert_eq!(s.text, "console.log('[TLOG] hello');");
        assert_eq!(&s.text[s.placeholder.clone()], "hello");
        assert_eq!(s.cursor, s.text.len());
        assert!(is_tlog_line(&s.text));
    }

    #[test]
    fn snippet_with_empty_message_is_still_tagged() {
        let s = render_snippet("");
        assert_eq!(s.text, "console.log('[TLOG] ');");
        assert!(s.placeholder.is_empty());
    }

    #[test]
    fn message_extraction_prefers_quoted_text() {
        assert_eq!(extract_message(r#"console.log("[TLOG] first");"#), "first");
        assert_eq!(extract_message("console.log('[TLOG]   spaced out');"), "spaced out");
    }

    #[test]
    fn message_extraction_falls_back() {
        assert_eq!(extract_message("console.log([TLOG] value + x"), "value + x");
        assert_eq!(extract_message("console.log([TLOG]"), "");
        let long = "x".repeat(60);
        assert_eq!(extract_message(&long), format!("{}...", "x".repeat(50)));
        assert_eq!(extract_message("short"), "short");
    }
}
