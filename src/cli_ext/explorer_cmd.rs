//! Handlers for `scan`, `watch`, `open` and `insert`.

use std::io::{self, IsTerminal};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use tracing::instrument;

use crate::cli::{AppContext, InsertArgs, OpenArgs, ScanArgs, WatchArgs};
use crate::cli_ext::prompt::TerminalPrompter;
use crate::cli_ext::workspace::{Workspace, resolve_path};
use crate::core::explorer::open_location;
use crate::core::insert::{Cursor, insert_snippet};
use crate::core::pattern::SNIPPET_TEMPLATE;
use crate::core::search::build_command;
use crate::core::tree::DirectoryNode;
use crate::core::view::render;
use crate::core::watch::{FileWatcher, WatchFilter};

fn color(ctx: &AppContext) -> bool
{
    !ctx.no_color && io::stdout().is_terminal()
}

fn print_tree(
    tree: &DirectoryNode,
    json: bool,
    color: bool,
) -> Result<()>
{
    if json
    {
        println!("{}", serde_json::to_string_pretty(tree)?);
    }
    else
    {
        print!("{}", render(tree, color)?);
    }
    Ok(())
}

#[instrument(skip_all)]
pub fn run_scan(
    args: ScanArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let ws = Workspace::open(ctx)?;
    let explorer = ws.explorer(args.mode)?;

    if ctx.dry_run
    {
        let tool = explorer.tool();
        let root = explorer.root().to_string_lossy();
        if !ctx.quiet
        {
            println!("{}", "DRY RUN: would run:".yellow());
        }
        println!("{}", build_command(&tool.program, &root, tool.mode));
        return Ok(());
    }

    // JSON output carries no notice.
    let mut prompter = TerminalPrompter::stdio(None, false, ctx.quiet || args.json, color(ctx));
    let tree = explorer.refresh_with_report(&mut prompter)?;
    print_tree(&tree, args.json, color(ctx))
}

#[instrument(skip_all)]
pub fn run_watch(
    args: WatchArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let ws = Workspace::open(ctx)?;
    let explorer = ws.explorer(None)?;
    let color = color(ctx);

    let watch_cfg = &ws.config.watch;
    let filter = WatchFilter::new(&watch_cfg.excluded_dirs, &watch_cfg.extensions)?;
    let delay = Duration::from_millis(args.debounce_ms.unwrap_or(watch_cfg.debounce_ms));

    print_tree(&explorer.refresh_or_empty(), false, color)?;

    let mut watcher = FileWatcher::new(filter, delay);
    watcher.start(explorer.root())?;

    let stop = AtomicBool::new(false);
    let mut render_error = None;
    watcher.run(&stop, || {
        let tree = explorer.refresh_or_empty();
        if !ctx.quiet
        {
            println!();
        }
        if let Err(e) = print_tree(&tree, false, color)
        {
            render_error = Some(e);
            stop.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    })?;

    match render_error
    {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[instrument(skip_all)]
pub fn run_open(
    args: OpenArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let ws = Workspace::open(ctx)?;
    let path = resolve_path(&args.file)?;
    let editor = ws.config.editor.command.as_deref();

    if ctx.dry_run
    {
        println!("{}:{}:{}", path.display(), args.line, args.column);
        return Ok(());
    }

    if let Some(location) = open_location(editor, &path, args.line, args.column)?
    {
        println!("{location}");
    }
    Ok(())
}

#[instrument(skip_all)]
pub fn run_insert(
    args: InsertArgs,
    ctx: &AppContext,
) -> Result<()>
{
    if args.print_snippet
    {
        println!("{SNIPPET_TEMPLATE}");
        return Ok(());
    }

    let Some(file) = args.file
    else
    {
        bail!("No active editor found");
    };
    if args.line == 0 || args.column == 0
    {
        bail!("--line and --column are 1-based");
    }

    let path = resolve_path(&file)?;
    let at = Cursor { line: args.line - 1, column: args.column - 1 };
    let inserted = insert_snippet(&path, at, &args.message, ctx.dry_run)?;

    if !ctx.quiet
    {
        println!(
            "{}:{}:{}",
            inserted.path.display(),
            inserted.cursor.line + 1,
            inserted.cursor.column + 1
        );
    }
    Ok(())
}
