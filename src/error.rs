//! Error taxonomy shared by every command.
//!
//! Nothing here is fatal to a long-running `watch` session: callers report the
//! error and return to idle. "No matches" and skipped result lines are
//! outcomes, not errors, and never appear in this enum.

use std::path::PathBuf;

use miette::Diagnostic;

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum TlogError
{
    /// User dismissed a prompt or declined confirmation.
    #[error("cancelled")]
    UserCancelled,

    /// No active document or workspace root where one is required.
    #[error("{0}")]
    #[diagnostic(code(tlog::missing_context), help("pass --root or run inside a project directory"))]
    MissingContext(String),

    /// The external search process failed without producing usable output.
    #[error("search failed: {diagnostic}")]
    #[diagnostic(
        code(tlog::search),
        help("check that `{program}` is installed or set search.program in tlog.toml")
    )]
    ToolInvocation
    {
        program: String,
        diagnostic: String,
    },

    /// The computed edit could not be applied; the next scan shows the true state.
    #[error("failed to apply edit to {}: {reason}", path.display())]
    #[diagnostic(code(tlog::edit))]
    EditApplication
    {
        path: PathBuf,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(tlog::config))]
    Config(String),

    #[error("file watcher failed: {0}")]
    #[diagnostic(code(tlog::watch))]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failure already shown through the prompter; only the exit status is left.
    #[error("failed")]
    Reported,
}

impl TlogError
{
    pub fn edit(
        path: impl Into<PathBuf>,
        reason: impl std::fmt::Display,
    ) -> Self
    {
        TlogError::EditApplication { path: path.into(), reason: reason.to_string() }
    }

    /// Silent errors are swallowed by the CLI instead of being printed.
    pub fn is_silent(&self) -> bool
    {
        matches!(self, TlogError::UserCancelled)
    }
}

pub type TlogResult<T> = std::result::Result<T, TlogError>;

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn cancellation_is_silent()
    {
        assert!(TlogError::UserCancelled.is_silent());
        assert!(!TlogError::MissingContext("No active editor found".into()).is_silent());
        assert!(!TlogError::Reported.is_silent());
    }

    #[test]
    fn tool_failure_carries_diagnostic_text()
    {
        let err = TlogError::ToolInvocation {
            program: "rg".into(),
            diagnostic: "rg: No such file or directory".into(),
        };
        assert_eq!(err.to_string(), "search failed: rg: No such file or directory");
    }
}
