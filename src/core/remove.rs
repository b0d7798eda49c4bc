//! Batch deletion of tagged lines across one or many files.
//!
//! A [`PendingEdit`] (lines in one open document, or a file → line-number
//! map) is planned into a [`DeletionEdit`]: per file, the byte ranges of whole
//! lines including their terminators, deduplicated and ordered bottom to top.
//! Applying bottom to top keeps every remaining range valid, because removing
//! a later line never shifts an earlier one.
//!
//! The [`EditHost`] applies the whole edit at once. The file-system host
//! checks every file against the content it was planned from, stages every
//! new file body, and only then replaces the originals.

use std::ops::Range;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::core::parse::Occurrence;
use crate::core::pattern::is_tlog_line;
use crate::error::{TlogError, TlogResult};
use crate::infra::document::{ContentId, Document};
use crate::infra::io::stage_write;

/// A deletion request before it is resolved against file content.
#[derive(Debug, Clone)]
pub enum PendingEdit {
    /// Full-line byte ranges inside one already-open document, any order.
    Document { document: Document, ranges: Vec<Range<usize>> },
    /// 0-based line numbers per file; may be unsorted and contain duplicates.
    LineMap(IndexMap<PathBuf, Vec<usize>>),
}

/// Deletions for one file, planned against a specific content snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDeletion {
    pub expected: ContentId,
    /// Disjoint byte ranges, descending by start.
    pub ranges: Vec<Range<usize>>,
}

/// One combined edit spanning every affected file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionEdit {
    pub files: IndexMap<PathBuf, FileDeletion>,
}

impl DeletionEdit {
    pub fn is_empty(&self) -> bool {
        self.files.values().all(|f| f.ranges.is_empty())
    }

    /// Number of lines this edit removes.
    pub fn line_count(&self) -> usize {
        self.files.values().map(|f| f.ranges.len()).sum()
    }

    fn add(&mut self, document: &Document, ranges: Vec<Range<usize>>) {
        let ranges = normalize_ranges(ranges);
        if ranges.is_empty() {
            return;
        }
        self.files.insert(
            document.path().to_path_buf(),
            FileDeletion { expected: document.content_id(), ranges },
        );
    }
}

/// Sort descending and drop duplicate or overlapping ranges.
fn normalize_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));
    let mut out: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for r in ranges {
        if r.is_empty() {
            continue;
        }
        match out.last() {
            Some(prev) if r.end > prev.start => {
                debug!(?r, ?prev, "dropping overlapping range");
            }
            _ => out.push(r),
        }
    }
    out
}

/// Remove `ranges` (descending, disjoint) from `text`.
pub fn apply_ranges(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = text.to_string();
    for r in ranges {
        if r.end <= out.len() {
            out.replace_range(r.clone(), "");
        }
    }
    out
}

/// Host side of an edit: opening documents and applying combined edits.
pub trait EditHost {
    fn open(&self, path: &Path) -> TlogResult<Document>;

    /// Apply `edit` as one unit. On error nothing is assumed about which files
    /// changed; the next scan shows the truth.
    fn apply(&self, edit: &DeletionEdit) -> TlogResult<()>;
}

/// Edits files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsHost {
    pub dry_run: bool,
}

impl EditHost for FsHost {
    fn open(&self, path: &Path) -> TlogResult<Document> {
        Document::open(path).map_err(|e| TlogError::edit(path, format!("{e:#}")))
    }

    #[instrument(skip_all, fields(files = edit.files.len(), lines = edit.line_count()))]
    fn apply(&self, edit: &DeletionEdit) -> TlogResult<()> {
        let mut staged = Vec::with_capacity(edit.files.len());

        for (path, deletion) in &edit.files {
            let current = self.open(path)?;
            if current.content_id() != deletion.expected {
                return Err(TlogError::edit(path, "file changed since it was scanned"));
            }
            let updated = apply_ranges(current.text(), &deletion.ranges);
            if self.dry_run {
                info!(file = %path.display(), lines = deletion.ranges.len(), "dry run: would delete");
                continue;
            }
            staged.push(
                stage_write(path, updated.as_bytes())
                    .map_err(|e| TlogError::edit(path, format!("{e:#}")))?,
            );
        }

        for write in staged {
            let target = write.target().to_path_buf();
            write
                .commit()
                .map_err(|e| TlogError::edit(&target, format!("{e:#}")))?;
            debug!(file = %target.display(), "replaced");
        }
        Ok(())
    }
}

/// Resolve `pending` into a combined edit.
pub fn plan(pending: PendingEdit, host: &dyn EditHost) -> TlogResult<DeletionEdit> {
    let mut edit = DeletionEdit::default();
    match pending {
        PendingEdit::Document { document, ranges } => edit.add(&document, ranges),
        PendingEdit::LineMap(map) => {
            for (path, mut lines) in map {
                let document = host.open(&path)?;
                lines.sort_unstable_by(|a, b| b.cmp(a));
                lines.dedup();

                let mut ranges = Vec::with_capacity(lines.len());
                for line in lines {
                    match document.range_including_line_break(line) {
                        Some(r) => ranges.push(r),
                        None => debug!(file = %path.display(), line, "line already gone"),
                    }
                }
                edit.add(&document, ranges);
            }
        }
    }
    Ok(edit)
}

/// Plan and apply in one step; returns the number of lines removed.
pub fn execute(pending: PendingEdit, host: &dyn EditHost) -> TlogResult<usize> {
    let edit = plan(pending, host)?;
    if edit.is_empty() {
        return Ok(0);
    }
    host.apply(&edit)?;
    Ok(edit.line_count())
}

/// 0-based lines of `document` that hold a tagged log call.
pub fn find_tlog_lines(document: &Document) -> Vec<usize> {
    document
        .lines()
        .filter(|(_, text)| is_tlog_line(text))
        .map(|(i, _)| i)
        .collect()
}

/// Full-line ranges of every tagged line in `document`.
pub fn find_tlog_ranges(document: &Document) -> Vec<Range<usize>> {
    find_tlog_lines(document)
        .into_iter()
        .filter_map(|l| document.range_including_line_break(l))
        .collect()
}

/// Build a line map from occurrences, in first-seen file order.
pub fn line_map(occurrences: &[Occurrence]) -> IndexMap<PathBuf, Vec<usize>> {
    let mut map: IndexMap<PathBuf, Vec<usize>> = IndexMap::new();
    for occ in occurrences {
        map.entry(occ.file_path.clone())
            .or_default()
            .push(occ.line);
    }
    map
}

/// Rescan `path` and delete every tagged line in it. Zero matches is success.
pub fn remove_from_file(host: &dyn EditHost, path: &Path) -> TlogResult<usize> {
    let document = host.open(path)?;
    let ranges = find_tlog_ranges(&document);
    if ranges.is_empty() {
        return Ok(0);
    }
    execute(PendingEdit::Document { document, ranges }, host)
}

/// Delete the line of `occ` if it still holds a tagged log call.
///
/// Returns `Ok(false)` when the line moved or no longer matches.
pub fn remove_single(host: &dyn EditHost, occ: &Occurrence) -> TlogResult<bool> {
    let document = host.open(&occ.file_path)?;
    let still_tagged = document.line_text(occ.line).is_some_and(is_tlog_line);
    if !still_tagged {
        debug!(file = %occ.file_path.display(), line = occ.line, "occurrence is stale");
        return Ok(false);
    }
    let ranges = document
        .range_including_line_break(occ.line)
        .into_iter()
        .collect();
    Ok(execute(PendingEdit::Document { document, ranges }, host)? == 1)
}

/// `text` with `lines` removed, computed without touching disk.
#[cfg(test)]
fn preview_line_removal(path: &Path, text: &str, lines: &[usize]) -> String {
    let document = Document::new(path, text.to_string());
    let ranges = normalize_ranges(
        lines
            .iter()
            .filter_map(|&l| document.range_including_line_break(l))
            .collect(),
    );
    apply_ranges(text, &ranges)
}
