//! **tlog** - Insert, find, browse and remove `[TLOG]`-tagged `console.log` statements
//!
//! An external line-search tool finds candidates; results are parsed, grouped
//! by file and folded into a directory tree. Removal deletes whole lines bottom
//! to top so earlier deletions never shift later ones.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Error taxonomy (thiserror + miette diagnostics)
pub mod error;

/// Core pipeline - matching, searching, parsing, grouping and removal
pub mod core {
    /// Marker regex, snippet template and message extraction
    pub mod pattern;
    pub use pattern::{is_tlog_line, render_snippet};

    /// Search-tool invocation contract and ripgrep runner
    pub mod search;
    pub use search::{RipgrepTool, SearchMode, SearchTool};

    /// Line-mode and JSON-mode result parsing
    pub mod parse;
    pub use parse::{Occurrence, parse_output};

    /// Grouping by file and directory tree building
    pub mod tree;
    pub use tree::{DirectoryNode, FileGroup, build_tree, group_by_file};

    /// Tree entries and terminal rendering
    pub mod view;

    /// Batch deletion engine
    pub mod remove;
    pub use remove::{DeletionEdit, EditHost, FsHost, PendingEdit};

    /// Scope selection state machine for remove-all
    pub mod scope;
    pub use scope::{Prompter, RemovalOutcome, RemovalScope};

    /// Scan pipeline, snapshot store and tree-item commands
    pub mod explorer;
    pub use explorer::{Explorer, scan_occurrences};

    /// Snippet insertion
    pub mod insert;

    /// File watching and debouncing
    pub mod watch;
}

/// Infrastructure - configuration, documents, I/O and logging
pub mod infra {
    /// Layered configuration from tlog.toml and TLOG_* variables
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Line-addressable text documents with content ids
    pub mod document;
    pub use document::Document;

    /// Memory-mapped reads and atomic writes
    pub mod io;

    /// tracing-subscriber setup
    pub mod logging;
}

/// Command handlers behind the CLI
pub mod cli_ext {
    pub mod explorer_cmd;
    pub mod prompt;
    pub mod remove_cmd;
    pub mod workspace;
}

pub use cli::{AppContext, Cli, Commands};
pub use error::{TlogError, TlogResult};
pub use infra::{Config, load_config};
