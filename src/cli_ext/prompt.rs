//! Terminal-backed prompts and reports.

use std::io::{self, BufRead, Write};

use owo_colors::OwoColorize;

use crate::core::scope::{CONFIRMATION_YES, Prompter, RemovalScope};

/// Scope menu shown when no scope was passed on the command line.
const SCOPE_MENU: &str = "\
Select removal scope:
  1) Current File Only   Remove TLOGs from the currently active file
  2) Entire Workspace    Remove TLOGs from all files in the workspace";

/// Prompts on `output`, reads answers from `input`.
///
/// Informational reports are suppressed by `quiet`; warnings and errors go to
/// stderr.
pub struct TerminalPrompter<R, W>
{
    input: R,
    output: W,
    preset_scope: Option<RemovalScope>,
    assume_yes: bool,
    quiet: bool,
    color: bool,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout>
{
    pub fn stdio(
        preset_scope: Option<RemovalScope>,
        assume_yes: bool,
        quiet: bool,
        color: bool,
    ) -> Self
    {
        Self::new(io::stdin().lock(), io::stdout(), preset_scope, assume_yes, quiet, color)
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W>
{
    pub fn new(
        input: R,
        output: W,
        preset_scope: Option<RemovalScope>,
        assume_yes: bool,
        quiet: bool,
        color: bool,
    ) -> Self
    {
        Self { input, output, preset_scope, assume_yes, quiet, color }
    }

    pub fn into_output(self) -> W
    {
        self.output
    }

    /// One trimmed line, or `None` at end of input.
    fn read_answer(&mut self) -> Option<String>
    {
        let mut line = String::new();
        match self.input.read_line(&mut line)
        {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn ask(
        &mut self,
        question: &str,
    ) -> Option<String>
    {
        let _ = write!(self.output, "{question}");
        let _ = self.output.flush();
        self.read_answer()
    }
}

/// Menu answer → scope. Numbers and names are both accepted.
pub fn parse_scope_answer(answer: &str) -> Option<RemovalScope>
{
    match answer.trim().to_ascii_lowercase().as_str()
    {
        "1" | "file" | "current" | "current file" => Some(RemovalScope::CurrentFile),
        "2" | "workspace" | "entire workspace" => Some(RemovalScope::Workspace),
        _ => None,
    }
}

/// Only an explicit yes confirms.
pub fn is_affirmative(answer: &str) -> bool
{
    let answer = answer.trim();
    answer.eq_ignore_ascii_case(CONFIRMATION_YES) || answer.eq_ignore_ascii_case("y")
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W>
{
    fn choose_scope(&mut self) -> Option<RemovalScope>
    {
        if let Some(scope) = self.preset_scope
        {
            return Some(scope);
        }
        let _ = writeln!(self.output, "{SCOPE_MENU}");
        self.ask("> ")
            .as_deref()
            .and_then(parse_scope_answer)
    }

    fn confirm(
        &mut self,
        message: &str,
    ) -> bool
    {
        if self.assume_yes
        {
            if !self.quiet
            {
                let _ = writeln!(self.output, "{message} {CONFIRMATION_YES}");
            }
            return true;
        }
        self.ask(&format!("{message} [Yes/No] "))
            .is_some_and(|a| is_affirmative(&a))
    }

    fn info(
        &mut self,
        message: &str,
    )
    {
        if !self.quiet
        {
            let _ = writeln!(self.output, "{message}");
        }
    }

    fn warn(
        &mut self,
        message: &str,
    )
    {
        if self.color
        {
            eprintln!("{} {message}", "warning:".yellow().bold());
        }
        else
        {
            eprintln!("warning: {message}");
        }
    }

    fn error(
        &mut self,
        message: &str,
    )
    {
        if self.color
        {
            eprintln!("{} {message}", "error:".red().bold());
        }
        else
        {
            eprintln!("error: {message}");
        }
    }
}
