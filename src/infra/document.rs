//! In-memory text document with LF/CRLF-robust line addressing.
//!
//! Goals
//! - Single pass over bytes to record '\n' positions.
//! - 0-based line numbers, matching search results after normalisation.
//! - O(1) line→byte range, with or without the line terminator.
//!
//! Notes
//! - An empty buffer has 0 lines.
//! - A trailing '\n' opens one final empty line ("a\n" has 2 lines).
//! - Ranges are half-open byte spans (Rust slicing convention).

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::infra::io::read_text;

/// Content ID for stale-edit detection (xxh64, hex).
pub type ContentId = String;

pub fn content_id(text: &str) -> ContentId {
    let h = xxhash_rust::xxh64::xxh64(text.as_bytes(), 0);
    format!("{:016x}", h)
}

#[derive(Debug, Clone)]
struct NewlineIndex {
    /// Byte positions of every '\n' in the buffer.
    nl_positions: Vec<usize>,
    /// Total byte length of the buffer.
    len: usize,
}

impl NewlineIndex {
    fn build(bytes: &[u8]) -> Self {
        Self {
            nl_positions: memchr::memchr_iter(b'\n', bytes).collect(),
            len: bytes.len(),
        }
    }

    fn line_count(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            self.nl_positions.len() + 1
        }
    }

    fn start_of(&self, line: usize) -> usize {
        if line == 0 {
            0
        } else {
            self.nl_positions[line - 1] + 1
        }
    }

    /// Start of the next line, or EOF for the last line.
    fn end_including_break(&self, line: usize) -> usize {
        self.nl_positions
            .get(line)
            .map(|&nl| nl + 1)
            .unwrap_or(self.len)
    }
}

/// Snapshot of one file's text, opened for line-addressed edits.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    text: String,
    index: NewlineIndex,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: String) -> Self {
        let index = NewlineIndex::build(text.as_bytes());
        Self { path: path.into(), text, index }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(path, read_text(path)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn content_id(&self) -> ContentId {
        content_id(&self.text)
    }

    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    /// Text of `line` without its terminator ('\n' or "\r\n").
    pub fn line_text(&self, line: usize) -> Option<&str> {
        if line >= self.line_count() {
            return None;
        }
        let start = self.index.start_of(line);
        let end = self
            .index
            .nl_positions
            .get(line)
            .copied()
            .unwrap_or(self.index.len);
        let raw = &self.text[start..end];
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    /// Byte span of `line` including its terminator, if any.
    pub fn range_including_line_break(&self, line: usize) -> Option<Range<usize>> {
        if line >= self.line_count() {
            return None;
        }
        Some(self.index.start_of(line)..self.index.end_including_break(line))
    }

    /// Iterate `(line, text)` pairs.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        (0..self.line_count()).filter_map(move |i| self.line_text(i).map(|t| (i, t)))
    }

    /// Byte offset of a 0-based `(line, column)` position, where `column`
    /// counts characters. Columns past the end clamp to the line end.
    pub fn offset_at(&self, line: usize, column: usize) -> Option<usize> {
        if self.line_count() == 0 && line == 0 {
            return Some(0);
        }
        let text = self.line_text(line)?;
        let start = self.index.start_of(line);
        let col = text
            .char_indices()
            .nth(column)
            .map_or(text.len(), |(i, _)| i);
        Some(start + col)
    }
}
