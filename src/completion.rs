//! Completion scripts for `tlog`, rendered from the clap command tree.

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::CommandFactory;
use clap_complete::{Shell as CompletionShell, generate};

use crate::cli::{Cli, CompletionsArgs, Shell};

/// Name the scripts complete for; matches the `[[bin]]` target.
pub const BIN_NAME: &str = "tlog";

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
            Shell::Elvish => CompletionShell::Elvish,
        }
    }
}

/// Script for `shell`, as bytes ready to write.
pub fn render(shell: CompletionShell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let mut out = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut out);
    out
}

/// File name the shell looks for, e.g. `tlog.bash` or `_tlog`.
pub fn file_name(shell: CompletionShell) -> String {
    match shell {
        CompletionShell::Bash => format!("{BIN_NAME}.bash"),
        CompletionShell::Zsh => format!("_{BIN_NAME}"),
        CompletionShell::Fish => format!("{BIN_NAME}.fish"),
        CompletionShell::PowerShell => format!("_{BIN_NAME}.ps1"),
        CompletionShell::Elvish => format!("{BIN_NAME}.elv"),
        _ => BIN_NAME.to_string(),
    }
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let shell: CompletionShell = args.shell.into();
    let script = render(shell);

    if args.stdout {
        io::stdout().lock().write_all(&script).context("write completion script")?;
        return Ok(());
    }

    let Some(dir) = args.out_dir
    else {
        bail!("--out-dir is required unless --stdout is set");
    };
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    let path = dir.join(file_name(shell));
    fs::write(&path, script).with_context(|| format!("write {}", path.display()))?;
    eprintln!("Wrote completion to {}", path.display());
    Ok(())
}
