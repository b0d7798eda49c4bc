//! Shared test utilities for integration tests
//!
//! Provides a fake search tool, a scripted prompter and fixture builders
//! used across multiple test files.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_fs::prelude::*;
use serde_json::json;

use tlog::core::scope::{Prompter, RemovalScope};
use tlog::core::search::{SearchMode, SearchTool};
use tlog::error::TlogResult;

/// Stands in for `rg --json`: walks the root and reports every line holding
/// both `console.log` and `[TLOG]`, with begin/end noise and one malformed
/// record like a real stream might carry.
pub struct FakeRg;

impl SearchTool for FakeRg
{
    fn mode(&self) -> SearchMode
    {
        SearchMode::Json
    }

    fn run(
        &self,
        root: &Path,
    ) -> TlogResult<String>
    {
        let mut out = String::new();
        for file in walk(root)
        {
            let text = fs::read_to_string(&file)?;
            let path = file.display().to_string();
            out.push_str(&json!({"type": "begin", "data": {"path": {"text": path}}}).to_string());
            out.push('\n');

            for (i, line) in text.lines().enumerate()
            {
                let Some(start) = line.find("console.log")
                else
                {
                    continue;
                };
                if !line.contains("[TLOG]")
                {
                    continue;
                }
                let record = json!({
                    "type": "match",
                    "data": {
                        "path": {"text": path},
                        "lines": {"text": format!("{line}\n")},
                        "line_number": i + 1,
                        "absolute_offset": 0,
                        "submatches": [{"match": {"text": "console.log"}, "start": start, "end": start + 11}]
                    }
                });
                out.push_str(&record.to_string());
                out.push('\n');
            }
            out.push_str("{not json\n");
        }
        Ok(out)
    }
}

/// [`FakeRg`] that counts how often it was run.
#[derive(Default)]
pub struct CountingRg
{
    pub calls: AtomicUsize,
}

impl CountingRg
{
    pub fn calls(&self) -> usize
    {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SearchTool for CountingRg
{
    fn mode(&self) -> SearchMode
    {
        SearchMode::Json
    }

    fn run(
        &self,
        root: &Path,
    ) -> TlogResult<String>
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        FakeRg.run(root)
    }
}

/// Canned output, for tool failures and odd records.
pub struct CannedTool
{
    pub mode: SearchMode,
    pub output: Result<String, String>,
}

impl SearchTool for CannedTool
{
    fn mode(&self) -> SearchMode
    {
        self.mode
    }

    fn run(
        &self,
        _root: &Path,
    ) -> TlogResult<String>
    {
        match &self.output
        {
            Ok(s) => Ok(s.clone()),
            Err(diagnostic) => Err(tlog::TlogError::ToolInvocation {
                program: "rg".into(),
                diagnostic: diagnostic.clone(),
            }),
        }
    }
}

fn walk(dir: &Path) -> Vec<PathBuf>
{
    let mut files = Vec::new();
    let Ok(entries) = fs::read_dir(dir)
    else
    {
        return files;
    };
    let mut entries: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    entries.sort();
    for path in entries
    {
        if path.file_name().is_some_and(|n| n == "node_modules")
        {
            continue;
        }
        if path.is_dir()
        {
            files.extend(walk(&path));
        }
        else
        {
            files.push(path);
        }
    }
    files
}

/// Prompter with preset answers that records everything it is asked.
#[derive(Default)]
pub struct ScriptedPrompter
{
    pub scope: Option<RemovalScope>,
    pub answers: VecDeque<bool>,
    pub questions: Vec<String>,
    pub infos: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ScriptedPrompter
{
    pub fn new(
        scope: Option<RemovalScope>,
        answers: &[bool],
    ) -> Self
    {
        Self { scope, answers: answers.iter().copied().collect(), ..Default::default() }
    }
}

impl Prompter for ScriptedPrompter
{
    fn choose_scope(&mut self) -> Option<RemovalScope>
    {
        self.scope
    }

    fn confirm(
        &mut self,
        message: &str,
    ) -> bool
    {
        self.questions.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }

    fn info(
        &mut self,
        message: &str,
    )
    {
        self.infos.push(message.to_string());
    }

    fn warn(
        &mut self,
        message: &str,
    )
    {
        self.warnings.push(message.to_string());
    }

    fn error(
        &mut self,
        message: &str,
    )
    {
        self.errors.push(message.to_string());
    }
}

/// `a.ts` with one tagged line at 0-based line 2, `src/b.ts` with tagged
/// lines at 0 and 5, and a tagged file under node_modules that must be ignored.
pub fn make_workspace() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child("a.ts")
        .write_str("const a = 1;\nfoo();\nconsole.log('[TLOG] in a');\nbar();\n")
        .expect("write a.ts");

    tmp.child("src/b.ts")
        .write_str(concat!(
            "console.log(\"[TLOG] first\");\n",
            "one();\n",
            "two();\n",
            "three();\n",
            "four();\n",
            "  console.log(`[TLOG] second`);\n",
            "six();\n",
        ))
        .expect("write src/b.ts");

    tmp.child("node_modules/dep/index.js")
        .write_str("console.log('[TLOG] vendored');\n")
        .expect("write vendored");

    tmp
}

/// Canonical root so paths compare equal to what the tree stores.
pub fn root_of(tmp: &assert_fs::TempDir) -> PathBuf
{
    dunce::canonicalize(tmp.path()).expect("canonical root")
}
