//! Presentation of the directory tree: labelled entries and terminal rendering.
//!
//! Directories come before files at every level, then entries sort by label.
//! Occurrences keep line order inside their file.

use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;
use ptree::TreeBuilder;
use serde::Serialize;

use crate::core::parse::Occurrence;
use crate::core::pattern::extract_message;
use crate::core::tree::{DirectoryNode, FileGroup};

/// Whether an entry starts out expanded when shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collapsible {
    Collapsed,
    Expanded,
    None,
}

/// One visible row of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeEntry<'a> {
    Directory { name: String, node: &'a DirectoryNode },
    File { group: &'a FileGroup },
    Occurrence { occurrence: &'a Occurrence },
}

impl<'a> TreeEntry<'a> {
    pub fn label(&self) -> String {
        match self {
            TreeEntry::Directory { name, .. } => name.clone(),
            TreeEntry::File { group } => group.file_name(),
            TreeEntry::Occurrence { occurrence } => format!(
                "Line {}: {}",
                occurrence.line + 1,
                extract_message(&occurrence.content)
            ),
        }
    }

    /// Count suffix shown beside the label.
    pub fn description(&self) -> Option<String> {
        match self {
            TreeEntry::Directory { node, .. } => Some(format!("({})", node.total_count())),
            TreeEntry::File { group } => Some(format!("({})", group.items.len())),
            TreeEntry::Occurrence { .. } => None,
        }
    }

    pub fn tooltip(&self) -> String {
        match self {
            TreeEntry::Directory { node, .. } => node.full_path.display().to_string(),
            TreeEntry::File { group } => group.file_path.display().to_string(),
            TreeEntry::Occurrence { occurrence } => occurrence.content.clone(),
        }
    }

    /// Stable kind tag used to pick which commands apply to an entry.
    pub fn context_value(&self) -> &'static str {
        match self {
            TreeEntry::Directory { .. } => "tlogDirectory",
            TreeEntry::File { .. } => "tlogFile",
            TreeEntry::Occurrence { .. } => "tlogItem",
        }
    }

    pub fn collapsible(&self) -> Collapsible {
        match self {
            TreeEntry::Directory { .. } => Collapsible::Collapsed,
            TreeEntry::File { .. } => Collapsible::Expanded,
            TreeEntry::Occurrence { .. } => Collapsible::None,
        }
    }

    /// Where activating the entry navigates to, as (file, 0-based line, 0-based column).
    pub fn location(&self) -> Option<(PathBuf, usize, usize)> {
        match self {
            TreeEntry::Occurrence { occurrence } => Some((
                occurrence.file_path.clone(),
                occurrence.line,
                occurrence.column,
            )),
            _ => None,
        }
    }

    pub fn children(&self) -> Vec<TreeEntry<'a>> {
        match self {
            TreeEntry::Directory { node, .. } => directory_entries(node),
            TreeEntry::File { group } => group
                .items
                .iter()
                .map(|occurrence| TreeEntry::Occurrence { occurrence })
                .collect(),
            TreeEntry::Occurrence { .. } => Vec::new(),
        }
    }
}

/// Top-level rows for a tree.
pub fn root_entries(tree: &DirectoryNode) -> Vec<TreeEntry<'_>> {
    directory_entries(tree)
}

fn directory_entries(node: &DirectoryNode) -> Vec<TreeEntry<'_>> {
    let mut dirs: Vec<TreeEntry<'_>> = node
        .children
        .iter()
        .map(|(name, child)| TreeEntry::Directory { name: name.clone(), node: child })
        .collect();
    dirs.sort_by_key(TreeEntry::label);

    let mut files: Vec<TreeEntry<'_>> = node
        .files
        .iter()
        .map(|group| TreeEntry::File { group })
        .collect();
    files.sort_by_key(TreeEntry::label);

    dirs.extend(files);
    dirs
}

/// Render the tree as text, one row per entry, optionally coloured.
pub fn render(tree: &DirectoryNode, color: bool) -> Result<String> {
    let title = format!("TLOG Explorer ({})", tree.total_count());
    let mut builder = TreeBuilder::new(paint_title(&title, color));

    add_entries(&mut builder, &root_entries(tree), color);

    let mut out = Vec::new();
    ptree::write_tree(&builder.build(), &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn add_entries(builder: &mut TreeBuilder, entries: &[TreeEntry<'_>], color: bool) {
    for entry in entries {
        let children = entry.children();
        let text = format_entry(entry, color);
        if children.is_empty() {
            builder.add_empty_child(text);
        } else {
            builder.begin_child(text);
            add_entries(builder, &children, color);
            builder.end_child();
        }
    }
}

fn format_entry(entry: &TreeEntry<'_>, color: bool) -> String {
    let label = entry.label();
    let description = entry.description().unwrap_or_default();
    if !color {
        if description.is_empty() {
            return label;
        }
        return format!("{label} {description}");
    }

    match entry {
        TreeEntry::Directory { .. } => format!("{}/ {}", label.blue(), description.dimmed()),
        TreeEntry::File { .. } => format!("{} {}", label.cyan(), description.dimmed()),
        TreeEntry::Occurrence { .. } => label,
    }
}

fn paint_title(title: &str, color: bool) -> String {
    if color { title.bold().to_string() } else { title.to_string() }
}
