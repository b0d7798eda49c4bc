use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tlog::cli::{AppContext, Cli, Commands};
use tlog::cli_ext::{explorer_cmd, remove_cmd};
use tlog::error::TlogError;

fn dispatch(
    command: Commands,
    ctx: &AppContext,
) -> Result<()> {
    match command {
        Commands::Insert(args) => explorer_cmd::run_insert(args, ctx),
        Commands::Remove(args) => remove_cmd::run(args, ctx),
        Commands::Open(args) => explorer_cmd::run_open(args, ctx),
        Commands::Scan(args) => explorer_cmd::run_scan(args, ctx),
        Commands::RemoveFile(args) => remove_cmd::run_file(args, ctx),
        Commands::RemoveDir(args) => remove_cmd::run_dir(args, ctx),
        Commands::RemoveOne(args) => remove_cmd::run_one(args, ctx),
        Commands::Watch(args) => explorer_cmd::run_watch(args, ctx),
        Commands::Init(args) => tlog::infra::config::init(args, ctx),
        Commands::Completions(args) => tlog::completion::run(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = cli.context();
    tlog::infra::logging::init(ctx.quiet, ctx.no_color);

    match dispatch(cli.command, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast::<TlogError>() {
            Ok(e) if e.is_silent() => ExitCode::SUCCESS,
            Ok(TlogError::Reported) => ExitCode::FAILURE,
            Ok(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                ExitCode::FAILURE
            }
            Err(other) => {
                eprintln!("Error: {other:#}");
                ExitCode::FAILURE
            }
        },
    }
}
