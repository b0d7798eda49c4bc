//! Snippet insertion at a cursor position.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::core::pattern::render_snippet;
use crate::error::{TlogError, TlogResult};
use crate::infra::document::Document;
use crate::infra::io::write_atomic;

/// 0-based cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

/// Result of an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inserted {
    pub path: PathBuf,
    pub text: String,
    /// Where the cursor rests after the snippet.
    pub cursor: Cursor,
}

/// Insert the rendered snippet into `document` at `at`.
///
/// Columns count characters. Positions past the end of a line clamp to its end. Returns the new text and
/// the final cursor.
pub fn insert_into(
    document: &Document,
    at: Cursor,
    message: &str,
) -> Option<(String, Cursor)> {
    let offset = document.offset_at(at.line, at.column)?;
    let snippet = render_snippet(message);

    let mut text = String::with_capacity(document.text().len() + snippet.text.len());
    text.push_str(&document.text()[..offset]);
    text.push_str(&snippet.text);
    text.push_str(&document.text()[offset..]);

    let line_start = document.text()[..offset].rfind('\n').map_or(0, |i| i + 1);
    let column = document.text()[line_start..offset].chars().count()
        + snippet.text[..snippet.cursor].chars().count();
    let cursor = Cursor { line: at.line, column };
    Some((text, cursor))
}

/// Insert the snippet into the file at `path` and write it back.
#[instrument(skip(message))]
pub fn insert_snippet(
    path: &Path,
    at: Cursor,
    message: &str,
    dry_run: bool,
) -> TlogResult<Inserted> {
    let document = Document::open(path).map_err(|e| TlogError::edit(path, format!("{e:#}")))?;
    let (text, cursor) = insert_into(&document, at, message).ok_or_else(|| {
        TlogError::edit(
            path,
            format!("line {} is past the end of the file", at.line + 1),
        )
    })?;

    if dry_run {
        info!(file = %path.display(), "dry run: would insert snippet");
    } else {
        write_atomic(path, text.as_bytes()).map_err(|e| TlogError::edit(path, format!("{e:#}")))?;
    }

    Ok(Inserted { path: path.to_path_buf(), text, cursor })
}
