//! Filepath: src/core/tree.rs
//! Groups occurrences by file and folds the groups into a directory tree
//! relative to the workspace root.
//!
//! Notes:
//! - Grouping keeps first-seen file order (IndexMap); items are sorted by line.
//! - Directory children use BTreeMap for deterministic ordering.
//! - The tree is rebuilt wholesale on every scan and never patched in place.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::core::parse::Occurrence;

/// Occurrences of one file, ascending by line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileGroup {
    pub file_path: PathBuf,
    pub items: Vec<Occurrence>,
}

impl FileGroup {
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .unwrap_or(self.file_path.as_os_str())
            .to_string_lossy()
            .to_string()
    }
}

/// One level of the path hierarchy. The root has an empty `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    pub full_path: PathBuf,
    pub children: BTreeMap<String, DirectoryNode>,
    pub files: Vec<FileGroup>,
}

impl DirectoryNode {
    fn new(name: String, full_path: PathBuf) -> Self {
        Self {
            name,
            full_path,
            children: BTreeMap::new(),
            files: Vec::new(),
        }
    }

    /// Empty tree rooted at `root`.
    pub fn empty(root: &Path) -> Self {
        Self::new(String::new(), root.to_path_buf())
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.children.values().all(DirectoryNode::is_empty)
    }

    /// Recursive occurrence count.
    pub fn total_count(&self) -> usize {
        self.files.iter().map(|f| f.items.len()).sum::<usize>()
            + self.children.values().map(DirectoryNode::total_count).sum::<usize>()
    }

    /// Every file path at or below this node; own files first, then children.
    pub fn collect_file_paths(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = self.files.iter().map(|f| f.file_path.clone()).collect();
        for child in self.children.values() {
            out.extend(child.collect_file_paths());
        }
        out
    }

    /// Locate the directory node whose `full_path` equals `dir`.
    pub fn find_dir(&self, dir: &Path) -> Option<&DirectoryNode> {
        if self.full_path == dir {
            return Some(self);
        }
        let rel = dir.strip_prefix(&self.full_path).ok()?;
        let mut node = self;
        for seg in normal_segments(rel) {
            node = node.children.get(&seg)?;
        }
        Some(node)
    }

    /// Locate the group for `file`, searching the whole subtree.
    pub fn find_file(&self, file: &Path) -> Option<&FileGroup> {
        self.files
            .iter()
            .find(|g| g.file_path == file)
            .or_else(|| self.children.values().find_map(|c| c.find_file(file)))
    }
}

/// Group by `file_path`, keeping first-seen file order. Items within a group are
/// stably sorted by line.
pub fn group_by_file(occurrences: Vec<Occurrence>) -> Vec<FileGroup> {
    let mut groups: IndexMap<PathBuf, Vec<Occurrence>> = IndexMap::new();
    for occ in occurrences {
        groups
            .entry(occ.file_path.clone())
            .or_default()
            .push(occ);
    }

    groups
        .into_iter()
        .map(|(file_path, mut items)| {
            items.sort_by_key(|o| o.line);
            FileGroup { file_path, items }
        })
        .collect()
}

/// Fold file groups into a directory tree relative to `root`.
///
/// A file directly under `root` lands in the root's `files`; deeper files walk
/// (and create, once) one node per directory segment.
pub fn build_tree(groups: Vec<FileGroup>, root: &Path) -> DirectoryNode {
    let mut tree = DirectoryNode::empty(root);

    for group in groups {
        let segments = match group.file_path.strip_prefix(root) {
            Ok(rel) => normal_segments(rel),
            Err(_) => {
                warn!(file = %group.file_path.display(), root = %root.display(), "file outside workspace root");
                Vec::new()
            }
        };

        let dir_segments = segments.len().saturating_sub(1);
        let mut node = &mut tree;
        for seg in &segments[..dir_segments] {
            let child_path = node.full_path.join(seg);
            node = node
                .children
                .entry(seg.clone())
                .or_insert_with(|| DirectoryNode::new(seg.clone(), child_path));
        }
        node.files.push(group);
    }

    tree
}

fn normal_segments(rel: &Path) -> Vec<String> {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}
