//! Handlers for `remove`, `remove-file`, `remove-dir` and `remove-one`.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Result, bail};
use tracing::instrument;

use crate::cli::{AppContext, RemoveArgs, RemoveDirArgs, RemoveFileArgs, RemoveOneArgs};
use crate::cli_ext::prompt::TerminalPrompter;
use crate::cli_ext::workspace::{Workspace, resolve_path};
use crate::core::parse::Occurrence;
use crate::core::remove::{EditHost, find_tlog_lines};
use crate::core::scope::{Prompter, RemovalOutcome, RemovalRequest, ScopeMachine, remove_all};
use crate::core::tree::FileGroup;
use crate::error::TlogError;

fn color(ctx: &AppContext) -> bool
{
    !ctx.no_color && io::stdout().is_terminal()
}

/// Remove-all with scope selection.
#[instrument(skip_all)]
pub fn run(
    args: RemoveArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let ws = Workspace::open(ctx)?;
    let tool = ws.tool(None);
    let host = ws.host(ctx);

    let current_file = match &args.file
    {
        Some(f) => Some(resolve_path(f)?),
        None => None,
    };

    let request = RemovalRequest {
        current_file: current_file.as_deref(),
        root: ws.root.as_deref(),
        tool: &tool,
        host: &host,
        strict: ws.config.search.strict,
    };

    // JSON output replaces the informational chatter on stdout.
    let quiet = ctx.quiet || args.json;
    let mut prompter = TerminalPrompter::stdio(args.scope, args.yes, quiet, color(ctx));
    let mut machine = ScopeMachine::default();
    let outcome = remove_all(&request, &mut prompter, &mut machine);

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match outcome
    {
        RemovalOutcome::Failed { .. } => Err(TlogError::Reported.into()),
        _ => Ok(()),
    }
}

/// Tagged lines of `path` as a file group, read straight from disk.
pub fn scan_file(
    host: &dyn EditHost,
    path: &Path,
) -> Result<FileGroup>
{
    let document = host.open(path)?;
    let items = find_tlog_lines(&document)
        .into_iter()
        .map(|line| Occurrence {
            file_path: path.to_path_buf(),
            line,
            column: 0,
            content: document
                .line_text(line)
                .unwrap_or_default()
                .to_string(),
        })
        .collect();
    Ok(FileGroup { file_path: path.to_path_buf(), items })
}

#[instrument(skip_all)]
pub fn run_file(
    args: RemoveFileArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let ws = Workspace::open(ctx)?;
    let explorer = ws.explorer(None)?;
    let host = ws.host(ctx);
    let path = resolve_path(&args.file)?;
    let mut prompter = TerminalPrompter::stdio(None, args.yes, ctx.quiet, color(ctx));

    let group = scan_file(&host, &path)?;
    if group.items.is_empty()
    {
        prompter.info(&format!("No TLOG statements found in {}", group.file_name()));
        return Ok(());
    }

    explorer.remove_file_group(&group, &host, &mut prompter)?;
    Ok(())
}

#[instrument(skip_all)]
pub fn run_dir(
    args: RemoveDirArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let ws = Workspace::open(ctx)?;
    let explorer = ws.explorer(None)?;
    let host = ws.host(ctx);
    let dir = resolve_path(&args.dir)?;
    let mut prompter = TerminalPrompter::stdio(None, args.yes, ctx.quiet, color(ctx));

    let tree = explorer.refresh()?;
    let Some(node) = tree.find_dir(&dir)
    else
    {
        prompter.info(&format!("No TLOG statements found in {}", dir.display()));
        return Ok(());
    };
    if node.is_empty()
    {
        prompter.info(&format!("No TLOG statements found in {}", dir.display()));
        return Ok(());
    }

    if explorer.remove_directory(node, &host, &mut prompter)? == 0
    {
        return Err(TlogError::Reported.into());
    }
    Ok(())
}

#[instrument(skip_all)]
pub fn run_one(
    args: RemoveOneArgs,
    ctx: &AppContext,
) -> Result<()>
{
    if args.line == 0
    {
        bail!("--line is 1-based");
    }

    let ws = Workspace::open(ctx)?;
    let explorer = ws.explorer(None)?;
    let host = ws.host(ctx);
    let path = resolve_path(&args.file)?;
    let mut prompter = TerminalPrompter::stdio(None, args.yes, ctx.quiet, color(ctx));

    let occurrence = Occurrence {
        file_path: path,
        line: args.line - 1,
        column: 0,
        content: String::new(),
    };

    if !explorer.remove_occurrence(&occurrence, &host, &mut prompter)?
    {
        return Err(TlogError::Reported.into());
    }
    Ok(())
}
