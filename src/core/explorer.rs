//! Scan pipeline and the tree snapshot it feeds.
//!
//! search tool → parser → strict filter → grouping → directory tree.
//!
//! The snapshot is the one piece of shared mutable state. It is swapped whole
//! (an `Arc` replacement) after each scan, so readers never see a half-built
//! tree. Each scan takes a generation ticket up front; a result is installed
//! only if no newer scan was started in the meantime.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, instrument, warn};

use crate::core::parse::{Occurrence, parse_output};
use crate::core::pattern::is_tlog_line;
use crate::core::remove::{EditHost, remove_from_file, remove_single};
use crate::core::scope::Prompter;
use crate::core::search::SearchTool;
use crate::core::tree::{DirectoryNode, FileGroup, build_tree, group_by_file};
use crate::error::{TlogError, TlogResult};

/// Run `tool` over `root` and normalise its output.
#[instrument(skip(tool))]
pub fn scan_occurrences(
    tool: &dyn SearchTool,
    root: &Path,
    strict: bool,
) -> TlogResult<Vec<Occurrence>> {
    let raw = tool.run(root)?;
    let mut occurrences = parse_output(&raw, tool.mode());
    let parsed = occurrences.len();
    if strict {
        occurrences.retain(|o| is_tlog_line(&o.content));
    }
    debug!(parsed, kept = occurrences.len(), "scan complete");
    Ok(occurrences)
}

/// Generation ticket handed out when a scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanTicket(u64);

/// Latest installed tree plus the generation counter guarding it.
#[derive(Debug)]
pub struct SnapshotStore {
    issued: AtomicU64,
    current: RwLock<Arc<DirectoryNode>>,
}

impl SnapshotStore {
    pub fn new(root: &Path) -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: RwLock::new(Arc::new(DirectoryNode::empty(root))),
        }
    }

    pub fn begin(&self) -> ScanTicket {
        ScanTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install `tree` if `ticket` is still the latest issued. Returns whether
    /// it was installed. The generation is compared under the write guard so a
    /// superseded scan can never land after a newer one.
    pub fn install(&self, ticket: ScanTicket, tree: DirectoryNode) -> bool {
        let mut slot = match self.current.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            debug!(ticket = ticket.0, "discarding superseded scan");
            return false;
        }
        *slot = Arc::new(tree);
        true
    }

    pub fn current(&self) -> Arc<DirectoryNode> {
        match self.current.read() {
            Ok(slot) => Arc::clone(&slot),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

/// Workspace-level view: owns the search tool and the current snapshot.
pub struct Explorer<T: SearchTool> {
    root: PathBuf,
    tool: T,
    strict: bool,
    snapshot: SnapshotStore,
}

impl<T: SearchTool> Explorer<T> {
    pub fn new(root: impl Into<PathBuf>, tool: T) -> Self {
        let root = root.into();
        let snapshot = SnapshotStore::new(&root);
        Self { root, tool, strict: true, snapshot }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn tree(&self) -> Arc<DirectoryNode> {
        self.snapshot.current()
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    /// Scan and build a tree without installing it.
    pub fn build(&self) -> TlogResult<DirectoryNode> {
        let occurrences = scan_occurrences(&self.tool, &self.root, self.strict)?;
        Ok(build_tree(group_by_file(occurrences), &self.root))
    }

    /// Rescan and install the result; errors leave the old snapshot in place.
    pub fn refresh(&self) -> TlogResult<Arc<DirectoryNode>> {
        let ticket = self.snapshot.begin();
        let tree = self.build()?;
        self.snapshot.install(ticket, tree);
        Ok(self.snapshot.current())
    }

    /// Background refresh: a failed scan is logged and shows as an empty tree.
    pub fn refresh_or_empty(&self) -> Arc<DirectoryNode> {
        let ticket = self.snapshot.begin();
        let tree = match self.build() {
            Ok(tree) => tree,
            Err(e) => {
                warn!(error = %e, "failed to scan TLOGs");
                DirectoryNode::empty(&self.root)
            }
        };
        self.snapshot.install(ticket, tree);
        self.snapshot.current()
    }

    /// Remove every tagged line in one file after confirmation. Declining
    /// yields [`TlogError::UserCancelled`].
    ///
    /// The removal methods never rescan; callers showing a tree call
    /// [`Explorer::refresh`] afterwards.
    pub fn remove_file_group(
        &self,
        group: &FileGroup,
        host: &dyn EditHost,
        prompter: &mut dyn Prompter,
    ) -> TlogResult<usize> {
        let name = group.file_name();
        let count = group.items.len();
        if !prompter.confirm(&format!("Remove {count} TLOG(s) from {name}?")) {
            return Err(TlogError::UserCancelled);
        }

        match remove_from_file(host, &group.file_path) {
            Ok(removed) => {
                prompter.info(&format!("Removed {removed} TLOG(s) from {name}"));
                Ok(removed)
            }
            Err(e) => {
                prompter.error(&format!("Error removing TLOGs: {e}"));
                Err(e)
            }
        }
    }

    /// Remove every tagged line under `node`, file by file. Returns the number
    /// of files cleaned; zero is reported as a failure.
    pub fn remove_directory(
        &self,
        node: &DirectoryNode,
        host: &dyn EditHost,
        prompter: &mut dyn Prompter,
    ) -> TlogResult<usize> {
        let total = node.total_count();
        let name = if node.name.is_empty() {
            self.root.display().to_string()
        } else {
            node.name.clone()
        };
        let question = format!("Remove {total} TLOG(s) from {name} and all subdirectories?");
        if !prompter.confirm(&question) {
            return Err(TlogError::UserCancelled);
        }

        let mut cleaned = 0usize;
        for path in node.collect_file_paths() {
            match remove_from_file(host, &path) {
                Ok(_) => cleaned += 1,
                Err(e) => warn!(file = %path.display(), error = %e, "failed to remove TLOGs"),
            }
        }

        if cleaned > 0 {
            prompter.info(&format!("Removed TLOGs from {cleaned} file(s) in {name}"));
        } else {
            prompter.error("Failed to remove TLOGs");
        }
        Ok(cleaned)
    }

    /// Remove one occurrence after confirmation, if it is still where the
    /// last scan saw it.
    pub fn remove_occurrence(
        &self,
        occ: &Occurrence,
        host: &dyn EditHost,
        prompter: &mut dyn Prompter,
    ) -> TlogResult<bool> {
        if !prompter.confirm(&format!("Remove this TLOG from line {}?", occ.line + 1)) {
            return Err(TlogError::UserCancelled);
        }

        match remove_single(host, occ) {
            Ok(true) => {
                prompter.info("TLOG removed successfully");
                Ok(true)
            }
            Ok(false) => {
                prompter.error("Failed to remove TLOG");
                Ok(false)
            }
            Err(e) => {
                prompter.error(&format!("Error removing TLOG: {e}"));
                Err(e)
            }
        }
    }

    /// Explicit refresh with a report, as bound to the refresh command.
    pub fn refresh_with_report(&self, prompter: &mut dyn Prompter) -> TlogResult<Arc<DirectoryNode>> {
        let tree = self.refresh()?;
        info!(occurrences = tree.total_count(), "tree refreshed");
        prompter.info("TLOG Explorer refreshed");
        Ok(tree)
    }
}

/// `path:line:column` with 1-based numbers.
pub fn location_string(path: &Path, line: usize, column: usize) -> String {
    format!("{}:{}:{}", path.display(), line, column)
}

/// Expand an editor command template into argv.
///
/// `{file}`, `{line}` and `{column}` are substituted per whitespace-separated
/// word. A template without `{file}` gets `path:line:column` appended.
pub fn editor_argv(template: &str, path: &Path, line: usize, column: usize) -> Vec<String> {
    let file = path.display().to_string();
    let mut argv: Vec<String> = template
        .split_whitespace()
        .map(|word| {
            word.replace("{file}", &file)
                .replace("{line}", &line.to_string())
                .replace("{column}", &column.to_string())
        })
        .collect();
    if !template.contains("{file}") {
        argv.push(location_string(path, line, column));
    }
    argv
}

/// Open `path` at a 1-based position.
///
/// With an editor command, launches it and waits; otherwise returns the
/// location for the caller to print.
#[instrument]
pub fn open_location(
    editor: Option<&str>,
    path: &Path,
    line: usize,
    column: usize,
) -> TlogResult<Option<String>> {
    if !path.is_file() {
        return Err(TlogError::edit(path, "Failed to open file: not found"));
    }

    let Some(template) = editor.filter(|t| !t.trim().is_empty()) else {
        return Ok(Some(location_string(path, line, column)));
    };

    let argv = editor_argv(template, path, line, column);
    let (program, args) = match argv.split_first() {
        Some(split) => split,
        None => return Ok(Some(location_string(path, line, column))),
    };

    debug!(%program, ?args, "launching editor");
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        return Err(TlogError::edit(path, format!("Failed to open file: editor exited with {status}")));
    }
    Ok(None)
}
