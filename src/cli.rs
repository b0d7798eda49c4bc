use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::scope::RemovalScope;
use crate::core::search::SearchMode;

/// Shared application context for global flags
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
    /// Workspace root as given; `None` means the current directory
    pub root: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "tlog")]
#[command(about = "Insert, find, browse and remove [TLOG]-tagged console.log statements")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress informational output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without writing files
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            dry_run: self.dry_run,
            root: self.root.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert a tagged log statement at a cursor position
    Insert(InsertArgs),

    /// Remove every tagged statement in the current file or the workspace
    Remove(RemoveArgs),

    /// Open a file at a line and column
    Open(OpenArgs),

    /// Scan the workspace and print the occurrence tree
    #[command(visible_alias = "refresh")]
    Scan(ScanArgs),

    /// Remove every tagged statement in one file
    RemoveFile(RemoveFileArgs),

    /// Remove every tagged statement under a directory
    RemoveDir(RemoveDirArgs),

    /// Remove the tagged statement on one line
    RemoveOne(RemoveOneArgs),

    /// Re-print the tree whenever relevant files change
    Watch(WatchArgs),

    /// Initialize a tlog.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// File to insert into
    #[arg(required_unless_present = "print_snippet")]
    pub file: Option<PathBuf>,

    /// 1-based line
    #[arg(short, long, default_value_t = 1)]
    pub line: usize,

    /// 1-based column
    #[arg(short, long, default_value_t = 1)]
    pub column: usize,

    /// Text for the message placeholder
    #[arg(short, long, default_value = "message")]
    pub message: String,

    /// Print the raw snippet template and exit
    #[arg(long)]
    pub print_snippet: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Scope to remove from; prompts when omitted
    #[arg(long, value_enum)]
    pub scope: Option<RemovalScope>,

    /// The active file for `--scope file`
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Answer "Yes" to the confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    pub file: PathBuf,

    /// 1-based line
    #[arg(short, long, default_value_t = 1)]
    pub line: usize,

    /// 1-based column
    #[arg(short, long, default_value_t = 1)]
    pub column: usize,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Print the tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Search tool output mode (overrides config)
    #[arg(long, value_enum)]
    pub mode: Option<SearchMode>,
}

#[derive(Args, Debug)]
pub struct RemoveFileArgs {
    pub file: PathBuf,

    /// Answer "Yes" to the confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct RemoveDirArgs {
    pub dir: PathBuf,

    /// Answer "Yes" to the confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct RemoveOneArgs {
    pub file: PathBuf,

    /// 1-based line of the statement
    #[arg(short, long)]
    pub line: usize,

    /// Answer "Yes" to the confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Debounce delay in milliseconds (overrides config)
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
