//! Resolving the workspace root, its config, and the collaborators built from
//! them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::AppContext;
use crate::core::explorer::Explorer;
use crate::core::remove::FsHost;
use crate::core::search::{RipgrepTool, SearchMode};
use crate::error::TlogError;
use crate::infra::config::{Config, load_config};

/// Expand `~`/`$VAR` and canonicalize without UNC prefixes.
pub fn resolve_path(raw: &Path) -> Result<PathBuf>
{
    let text = raw.to_string_lossy();
    let expanded = shellexpand::full(&text)
        .with_context(|| format!("Failed to expand {text}"))?;
    dunce::canonicalize(&*expanded)
        .with_context(|| format!("Path not found: {expanded}"))
}

/// Workspace root plus loaded config.
#[derive(Debug, Clone)]
pub struct Workspace
{
    /// `None` when the requested root does not exist.
    pub root: Option<PathBuf>,
    pub config: Config,
}

impl Workspace
{
    pub fn open(ctx: &AppContext) -> Result<Self>
    {
        let requested = ctx
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let root = match resolve_path(&requested)
        {
            Ok(p) if p.is_dir() => Some(p),
            Ok(_) | Err(_) =>
            {
                debug!(root = %requested.display(), "workspace root unavailable");
                None
            }
        };

        let config = match &root
        {
            Some(r) => load_config(r)?,
            None => Config::default(),
        };

        Ok(Self { root, config })
    }

    /// Root, or the "no workspace" failure.
    pub fn require_root(&self) -> Result<&Path>
    {
        self.root
            .as_deref()
            .ok_or_else(|| TlogError::MissingContext("No workspace folder found".into()).into())
    }

    pub fn tool(
        &self,
        mode: Option<SearchMode>,
    ) -> RipgrepTool
    {
        let search = &self.config.search;
        RipgrepTool::new(search.program.clone(), mode.unwrap_or(search.mode))
            .with_excludes(search.exclude_globs.clone())
    }

    pub fn host(
        &self,
        ctx: &AppContext,
    ) -> FsHost
    {
        FsHost { dry_run: ctx.dry_run }
    }

    pub fn explorer(
        &self,
        mode: Option<SearchMode>,
    ) -> Result<Explorer<RipgrepTool>>
    {
        let root = self.require_root()?;
        Ok(Explorer::new(root, self.tool(mode)).with_strict(self.config.search.strict))
    }
}
