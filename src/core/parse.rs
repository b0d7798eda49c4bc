//! Normalises raw search-tool output into [`Occurrence`]s.
//!
//! Two encodings are accepted:
//! - line mode: `path:line:column:text` (1-based line and column)
//! - JSON mode: ripgrep's newline-delimited `--json` event stream
//!
//! Malformed lines are skipped one at a time and never abort the parse.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::search::SearchMode;

/// One located tagged log statement. Line and column are 0-based.
///
/// Only valid for the file content it was scanned from; any edit that shifts
/// lines in `file_path` makes it stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub file_path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub content: String,
}

/// Parse `raw` according to `mode`.
pub fn parse_output(raw: &str, mode: SearchMode) -> Vec<Occurrence> {
    match mode {
        SearchMode::Json => parse_json(raw),
        SearchMode::Lines => parse_lines(raw),
    }
}

/// Parse colon-delimited `path:line:column:text` output.
pub fn parse_lines(raw: &str) -> Vec<Occurrence> {
    raw.lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| {
            let parsed = parse_colon_line(l);
            if parsed.is_none() {
                trace!(line = l, "skipping malformed result line");
            }
            parsed
        })
        .collect()
}

fn parse_colon_line(line: &str) -> Option<Occurrence> {
    let mut fields: Vec<&str> = line.split(':').collect();

    // `C:\src\a.ts:3:1:...` splits the drive letter off the path; glue it back.
    let owned_path;
    let path = if is_drive_prefix(&fields) {
        owned_path = format!("{}:{}", fields[0], fields[1]);
        fields.remove(0);
        owned_path.as_str()
    } else {
        fields[0]
    };

    if fields.len() < 4 {
        return None;
    }

    let line_no = fields[1].trim().parse::<usize>().ok()?.checked_sub(1)?;
    let column = fields[2].trim().parse::<usize>().ok()?.checked_sub(1)?;
    let content = fields[3..].join(":").trim().to_string();

    Some(Occurrence {
        file_path: PathBuf::from(path),
        line: line_no,
        column,
        content,
    })
}

fn is_drive_prefix(fields: &[&str]) -> bool {
    fields.len() > 4
        && fields[0].len() == 1
        && fields[0].chars().all(|c| c.is_ascii_alphabetic())
        && (fields[1].starts_with('\\') || fields[1].starts_with('/'))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RgEvent {
    Match { data: RgMatch },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct RgMatch {
    path: Option<RgText>,
    lines: Option<RgText>,
    line_number: Option<u64>,
    #[serde(default)]
    submatches: Vec<RgSubmatch>,
}

#[derive(Debug, Deserialize)]
struct RgText {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RgSubmatch {
    start: usize,
}

/// Parse newline-delimited JSON records, keeping only complete `match` events.
pub fn parse_json(raw: &str) -> Vec<Occurrence> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| match serde_json::from_str::<RgEvent>(l) {
            Ok(RgEvent::Match { data }) => occurrence_from_match(data),
            Ok(RgEvent::Other) => None,
            Err(e) => {
                trace!(error = %e, "skipping malformed JSON record");
                None
            }
        })
        .collect()
}

fn occurrence_from_match(data: RgMatch) -> Option<Occurrence> {
    let path = data.path?.text?;
    let text = data.lines?.text?;
    let line_number = usize::try_from(data.line_number?).ok()?.checked_sub(1)?;
    let column = data.submatches.first()?.start;

    Some(Occurrence {
        file_path: PathBuf::from(path),
        line: line_number,
        column,
        content: text.trim().to_string(),
    })
}
