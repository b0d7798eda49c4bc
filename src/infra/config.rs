use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{AppContext, InitArgs};
use crate::core::search::{DEFAULT_PROGRAM, SearchMode};
use crate::core::watch::{DEFAULT_DEBOUNCE_MS, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS};
use crate::error::{TlogError, TlogResult};

/// Config file names probed in the workspace root, first hit wins.
pub const CONFIG_FILES: [&str; 2] = ["tlog.toml", ".tlog.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// External search tool settings
    pub search: SearchConfig,

    /// Live refresh settings
    pub watch: WatchConfig,

    /// Navigation settings
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig
{
    pub program: String,
    pub mode: SearchMode,
    /// Extra `-g` globs passed to the tool (prefix with `!` to exclude)
    pub exclude_globs: Vec<String>,
    /// Re-check tool matches against the in-memory pattern
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig
{
    pub debounce_ms: u64,
    pub extensions: Vec<String>,
    pub excluded_dirs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig
{
    /// e.g. `code --goto {file}:{line}:{column}`; unset prints the location
    pub command: Option<String>,
}

impl Default for SearchConfig
{
    fn default() -> Self
    {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            mode: SearchMode::Json,
            exclude_globs: Vec::new(),
            strict: true,
        }
    }
}

impl Default for WatchConfig
{
    fn default() -> Self
    {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// First config file present in `root`, if any.
pub fn find_config_file(root: &Path) -> Option<PathBuf>
{
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

/// Defaults, then the workspace config file, then `TLOG_*` variables
/// (`TLOG_SEARCH__PROGRAM=ugrep`).
pub fn load_config(root: &Path) -> TlogResult<Config>
{
    let mut builder = config::Config::builder();

    if let Some(path) = find_config_file(root)
    {
        debug!(file = %path.display(), "loading config");
        builder = builder.add_source(config::File::from(path.as_path()));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TLOG")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .map_err(|e| TlogError::Config(e.to_string()))?;
    cfg.try_deserialize()
        .map_err(|e| TlogError::Config(e.to_string()))
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let toml_string =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("DRY RUN: would write {}", config_path.display());
            print!("{toml_string}");
        }
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() -> TlogResult<()>
    {
        let tmp = TempDir::new()?;
        let cfg = load_config(tmp.path())?;
        assert_eq!(cfg.search.program, "rg");
        assert!(cfg.search.strict);
        assert_eq!(cfg.watch.debounce_ms, 300);
        assert!(cfg.watch.excluded_dirs.iter().any(|d| d == "node_modules"));
        Ok(())
    }

    #[test]
    fn partial_file_overrides_only_named_keys() -> TlogResult<()>
    {
        let tmp = TempDir::new()?;
        std::fs::write(
            tmp.path().join(".tlog.toml"),
            "[search]\nmode = \"lines\"\n\n[editor]\ncommand = \"vim +{line} {file}\"\n",
        )?;

        let cfg = load_config(tmp.path())?;
        assert_eq!(cfg.search.mode, SearchMode::Lines);
        assert_eq!(cfg.search.program, "rg");
        assert_eq!(cfg.editor.command.as_deref(), Some("vim +{line} {file}"));
        Ok(())
    }

    #[test]
    fn default_config_round_trips_through_toml() -> Result<()>
    {
        let text = toml::to_string_pretty(&Config::default())?;
        let back: Config = toml::from_str(&text)?;
        assert_eq!(back, Config::default());
        Ok(())
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let ctx = AppContext { quiet: true, no_color: true, ..Default::default() };
        let args = || InitArgs { path: tmp.path().to_path_buf(), force: false };

        init(args(), &ctx)?;
        assert!(tmp.path().join("tlog.toml").is_file());
        assert!(init(args(), &ctx).is_err());
        init(InitArgs { force: true, ..args() }, &ctx)?;
        Ok(())
    }
}
