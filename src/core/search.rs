//! Invocation contract for the external line-search tool.
//!
//! The tool itself is a black box: we build its command line, run it as a
//! subprocess, and hand the raw stdout to [`crate::core::parse`]. The
//! [`SearchTool`] trait lets tests substitute canned output.

use std::path::Path;
use std::process::Command;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{TlogError, TlogResult};

/// Pattern handed to the tool. Deliberately looser than the in-memory matcher.
pub const SEARCH_PATTERN: &str = "console.log.*[TLOG]";

/// Glob excluding dependency directories from the search.
pub const NODE_MODULES_EXCLUDE: &str = "!**/node_modules/**";

pub const DEFAULT_PROGRAM: &str = "rg";

/// Output encoding requested from the tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Streaming newline-delimited JSON records (`--json`)
    #[default]
    Json,
    /// Plain `file:line:column:text` lines (`--vimgrep`)
    Lines,
}

impl SearchMode {
    fn flag(self) -> &'static str {
        match self {
            SearchMode::Json => "--json",
            SearchMode::Lines => "--vimgrep",
        }
    }
}

/// Argument vector for `program` searching `root`.
pub fn build_args(
    root: &str,
    mode: SearchMode,
    extra_excludes: &[String],
) -> Vec<String> {
    let mut args = vec![
        mode.flag().to_string(),
        SEARCH_PATTERN.to_string(),
        root.to_string(),
        "-g".to_string(),
        NODE_MODULES_EXCLUDE.to_string(),
    ];
    for glob in extra_excludes {
        args.push("-g".to_string());
        args.push(glob.clone());
    }
    args
}

/// Shell-style command string with every argument quoted verbatim.
///
/// An empty `root` round-trips as `""`.
pub fn build_command(program: &str, root: &str, mode: SearchMode) -> String {
    let args = build_args(root, mode, &[]);
    format!(
        "\"{program}\" {} \"{}\" \"{}\" -g \"{}\"",
        args[0], args[1], args[2], args[4]
    )
}

/// Raw result of one tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ToolOutput {
    /// Apply the exit-status contract: any stdout is usable output, even on a
    /// non-zero exit. Exit 1 with no output at all is ripgrep's "no matches".
    pub fn into_stdout(self, program: &str) -> TlogResult<String> {
        if self.exit_code == Some(0) || !self.stdout.trim().is_empty() {
            return Ok(self.stdout);
        }
        if self.exit_code == Some(1) && self.stderr.trim().is_empty() {
            return Ok(String::new());
        }
        let diagnostic = match self.stderr.trim() {
            "" => format!("{program} exited with status {:?}", self.exit_code),
            s => s.to_string(),
        };
        Err(TlogError::ToolInvocation { program: program.to_string(), diagnostic })
    }
}

/// Something that produces raw search output for a workspace root.
pub trait SearchTool {
    fn mode(&self) -> SearchMode;

    fn run(&self, root: &Path) -> TlogResult<String>;
}

/// Runs ripgrep (or a compatible program) as a subprocess.
#[derive(Debug, Clone)]
pub struct RipgrepTool {
    pub program: String,
    pub mode: SearchMode,
    pub extra_excludes: Vec<String>,
}

impl RipgrepTool {
    pub fn new(program: impl Into<String>, mode: SearchMode) -> Self {
        Self { program: program.into(), mode, extra_excludes: Vec::new() }
    }

    pub fn with_excludes(mut self, globs: Vec<String>) -> Self {
        self.extra_excludes = globs;
        self
    }

    fn spawn(&self, root: &Path) -> TlogResult<ToolOutput> {
        let root_str = root.to_string_lossy();
        let out = Command::new(&self.program)
            .args(build_args(&root_str, self.mode, &self.extra_excludes))
            .output()
            .map_err(|e| TlogError::ToolInvocation {
                program: self.program.clone(),
                diagnostic: e.to_string(),
            })?;

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            exit_code: out.status.code(),
        })
    }
}

impl Default for RipgrepTool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, SearchMode::default())
    }
}

impl SearchTool for RipgrepTool {
    fn mode(&self) -> SearchMode {
        self.mode
    }

    #[instrument(skip(self), fields(program = %self.program, mode = ?self.mode))]
    fn run(&self, root: &Path) -> TlogResult<String> {
        debug!(command = %build_command(&self.program, &root.to_string_lossy(), self.mode));
        let output = self.spawn(root)?;
        debug!(exit = ?output.exit_code, bytes = output.stdout.len(), "search finished");
        output.into_stdout(&self.program)
    }
}
