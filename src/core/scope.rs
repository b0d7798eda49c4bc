//! Scope selection for "remove all": current file or whole workspace.
//!
//! ```text
//! Idle → AwaitingScopeChoice → AwaitingConfirmation → Executing → Idle
//!              │                       │
//!              └── dismissed ──────────┴── declined ──→ Cancelled → Idle
//! ```
//!
//! A zero count after the scope choice goes straight back to `Idle` with an
//! informational report. Every path, including engine failure, ends in `Idle`.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::core::explorer::scan_occurrences;
use crate::core::remove::{EditHost, PendingEdit, execute, find_tlog_ranges, line_map};
use crate::core::search::SearchTool;
use crate::error::{TlogError, TlogResult};

pub const CONFIRMATION_YES: &str = "Yes";
pub const CONFIRMATION_NO: &str = "No";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum RemovalScope {
    /// Only the active file
    #[value(name = "file")]
    CurrentFile,
    /// Every file in the workspace
    Workspace,
}

impl RemovalScope {
    pub fn describe(self) -> &'static str {
        match self {
            RemovalScope::CurrentFile => "current file",
            RemovalScope::Workspace => "workspace",
        }
    }
}

/// User-facing collaborator: prompts and reports.
pub trait Prompter {
    /// `None` when the prompt is dismissed.
    fn choose_scope(&mut self) -> Option<RemovalScope>;

    /// `true` only for an explicit "Yes".
    fn confirm(&mut self, message: &str) -> bool;

    fn info(&mut self, message: &str);

    fn warn(&mut self, message: &str);

    fn error(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingScopeChoice,
    AwaitingConfirmation { scope: RemovalScope, count: usize },
    Executing { scope: RemovalScope, count: usize },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    Requested,
    Dismissed,
    Counted { scope: RemovalScope, count: usize },
    Answered(bool),
    Finished,
}

impl FlowState {
    /// Pure transition function. Events that make no sense in a state leave it
    /// unchanged.
    pub fn next(self, event: FlowEvent) -> FlowState {
        use FlowEvent as E;
        use FlowState as S;
        match (self, event) {
            (S::Idle, E::Requested) => S::AwaitingScopeChoice,
            (S::AwaitingScopeChoice, E::Dismissed) => S::Cancelled,
            (S::AwaitingScopeChoice, E::Counted { count: 0, .. }) => S::Idle,
            (S::AwaitingScopeChoice, E::Counted { scope, count }) => {
                S::AwaitingConfirmation { scope, count }
            }
            (S::AwaitingConfirmation { scope, count }, E::Answered(true)) => {
                S::Executing { scope, count }
            }
            (S::AwaitingConfirmation { .. }, E::Answered(false)) => S::Cancelled,
            (S::Executing { .. }, E::Finished) | (S::Cancelled, E::Finished) => S::Idle,
            (state, _) => state,
        }
    }
}

/// Tracks the current state and every state visited.
#[derive(Debug, Clone)]
pub struct ScopeMachine {
    state: FlowState,
    trail: Vec<FlowState>,
}

impl Default for ScopeMachine {
    fn default() -> Self {
        Self { state: FlowState::Idle, trail: vec![FlowState::Idle] }
    }
}

impl ScopeMachine {
    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn trail(&self) -> &[FlowState] {
        &self.trail
    }

    pub fn fire(&mut self, event: FlowEvent) -> FlowState {
        let next = self.state.next(event);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?event, "scope transition");
            self.trail.push(next);
        }
        self.state = next;
        next
    }
}

/// How a removal flow ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemovalOutcome {
    Cancelled,
    NothingFound { scope: RemovalScope },
    Removed { scope: RemovalScope, count: usize },
    Failed { message: String },
}

/// Inputs for a remove-all request.
pub struct RemovalRequest<'a> {
    /// The "active document"; required for [`RemovalScope::CurrentFile`].
    pub current_file: Option<&'a Path>,
    /// Workspace root; required for [`RemovalScope::Workspace`].
    pub root: Option<&'a Path>,
    pub tool: &'a dyn SearchTool,
    pub host: &'a dyn EditHost,
    /// Drop tool results that fail the in-memory matcher.
    pub strict: bool,
}

/// Drive the full flow. The machine is back in `Idle` when this returns.
#[instrument(skip_all)]
pub fn remove_all(
    req: &RemovalRequest<'_>,
    prompter: &mut dyn Prompter,
    machine: &mut ScopeMachine,
) -> RemovalOutcome {
    machine.fire(FlowEvent::Requested);

    let Some(scope) = prompter.choose_scope() else {
        machine.fire(FlowEvent::Dismissed);
        machine.fire(FlowEvent::Finished);
        return RemovalOutcome::Cancelled;
    };

    let outcome = run_scope(scope, req, prompter, machine);
    if let RemovalOutcome::Failed { message } = &outcome {
        prompter.error(message);
    }
    machine.fire(FlowEvent::Finished);
    outcome
}

fn run_scope(
    scope: RemovalScope,
    req: &RemovalRequest<'_>,
    prompter: &mut dyn Prompter,
    machine: &mut ScopeMachine,
) -> RemovalOutcome {
    let planned = match scope {
        RemovalScope::CurrentFile => collect_current_file(req),
        RemovalScope::Workspace => {
            if req.root.is_some() {
                prompter.info("Searching for TLOGs...");
            }
            collect_workspace(req)
        }
    };

    let (pending, count) = match planned {
        Ok(p) => p,
        Err(TlogError::MissingContext(msg)) => {
            prompter.warn(&msg);
            machine.fire(FlowEvent::Dismissed);
            return RemovalOutcome::Cancelled;
        }
        Err(e) => {
            machine.fire(FlowEvent::Dismissed);
            return RemovalOutcome::Failed { message: e.to_string() };
        }
    };

    machine.fire(FlowEvent::Counted { scope, count });
    if count == 0 {
        prompter.info(&format!("No TLOG statements found in {}", scope.describe()));
        return RemovalOutcome::NothingFound { scope };
    }

    let question = format!(
        "Found {count} TLOG statement(s) in {}. Remove them?",
        scope.describe()
    );
    let confirmed = prompter.confirm(&question);
    machine.fire(FlowEvent::Answered(confirmed));
    if !confirmed {
        return RemovalOutcome::Cancelled;
    }

    match execute(pending, req.host) {
        Ok(_) => {
            prompter.info(&format!(
                "Removed {count} TLOG statement(s) from {}",
                scope.describe()
            ));
            RemovalOutcome::Removed { scope, count }
        }
        Err(e) => RemovalOutcome::Failed {
            message: format!("Failed to remove TLOG statements: {e}"),
        },
    }
}

fn collect_current_file(req: &RemovalRequest<'_>) -> TlogResult<(PendingEdit, usize)> {
    let path = req
        .current_file
        .ok_or_else(|| TlogError::MissingContext("No active editor found".into()))?;
    let document = req.host.open(path)?;
    let ranges = find_tlog_ranges(&document);
    let count = ranges.len();
    Ok((PendingEdit::Document { document, ranges }, count))
}

fn collect_workspace(req: &RemovalRequest<'_>) -> TlogResult<(PendingEdit, usize)> {
    let root: PathBuf = req
        .root
        .ok_or_else(|| TlogError::MissingContext("No workspace folder found".into()))?
        .to_path_buf();
    let occurrences = scan_occurrences(req.tool, &root, req.strict)?;
    let count = occurrences.len();
    Ok((PendingEdit::LineMap(line_map(&occurrences)), count))
}
