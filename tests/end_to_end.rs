//! Scan → tree → remove-all → rescan, against a real temp workspace.

mod util;

use std::fs;

use anyhow::Result;

use tlog::core::explorer::Explorer;
use tlog::core::remove::FsHost;
use tlog::core::scope::{FlowState, RemovalOutcome, RemovalRequest, RemovalScope, ScopeMachine, remove_all};
use tlog::core::search::SearchMode;
use util::{CannedTool, FakeRg, ScriptedPrompter, make_workspace, root_of};

#[test]
fn scan_builds_expected_tree() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);

    let explorer = Explorer::new(&root, FakeRg);
    let tree = explorer.refresh()?;

    assert_eq!(tree.files.len(), 1);
    assert_eq!(tree.files[0].file_path, root.join("a.ts"));
    assert_eq!(tree.files[0].items[0].line, 2);

    let src = &tree.children["src"];
    assert_eq!(src.files.len(), 1);
    let lines: Vec<usize> = src.files[0].items.iter().map(|o| o.line).collect();
    assert_eq!(lines, vec![0, 5]);

    assert!(!tree.children.contains_key("node_modules"));
    assert_eq!(tree.total_count(), 3);
    Ok(())
}

#[test]
fn workspace_removal_then_rescan_is_empty() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let host = FsHost::default();

    let request = RemovalRequest {
        current_file: None,
        root: Some(root.as_path()),
        tool: &FakeRg,
        host: &host,
        strict: true,
    };
    let mut prompter = ScriptedPrompter::new(Some(RemovalScope::Workspace), &[true]);
    let mut machine = ScopeMachine::default();

    let outcome = remove_all(&request, &mut prompter, &mut machine);

    assert_eq!(outcome, RemovalOutcome::Removed { scope: RemovalScope::Workspace, count: 3 });
    assert_eq!(prompter.questions, vec!["Found 3 TLOG statement(s) in workspace. Remove them?"]);
    assert!(prompter.infos.contains(&"Removed 3 TLOG statement(s) from workspace".to_string()));
    assert_eq!(machine.state(), FlowState::Idle);

    assert_eq!(fs::read_to_string(root.join("a.ts"))?, "const a = 1;\nfoo();\nbar();\n");
    assert_eq!(
        fs::read_to_string(root.join("src/b.ts"))?,
        "one();\ntwo();\nthree();\nfour();\nsix();\n"
    );

    let tree = Explorer::new(&root, FakeRg).refresh()?;
    assert!(tree.is_empty());
    Ok(())
}

#[test]
fn declined_confirmation_touches_nothing() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let before = fs::read_to_string(root.join("a.ts"))?;
    let host = FsHost::default();

    let request = RemovalRequest {
        current_file: None,
        root: Some(root.as_path()),
        tool: &FakeRg,
        host: &host,
        strict: true,
    };
    let mut prompter = ScriptedPrompter::new(Some(RemovalScope::Workspace), &[false]);
    let mut machine = ScopeMachine::default();

    assert_eq!(remove_all(&request, &mut prompter, &mut machine), RemovalOutcome::Cancelled);
    assert_eq!(fs::read_to_string(root.join("a.ts"))?, before);
    assert!(machine.trail().contains(&FlowState::Cancelled));
    assert_eq!(machine.state(), FlowState::Idle);
    Ok(())
}

#[test]
fn dismissed_scope_prompt_cancels() {
    let host = FsHost::default();
    let request = RemovalRequest {
        current_file: None,
        root: None,
        tool: &FakeRg,
        host: &host,
        strict: true,
    };
    let mut prompter = ScriptedPrompter::new(None, &[]);
    let mut machine = ScopeMachine::default();

    assert_eq!(remove_all(&request, &mut prompter, &mut machine), RemovalOutcome::Cancelled);
    assert!(prompter.questions.is_empty());
    assert_eq!(machine.state(), FlowState::Idle);
}

#[test]
fn current_file_scope_without_file_warns() {
    let host = FsHost::default();
    let request = RemovalRequest {
        current_file: None,
        root: None,
        tool: &FakeRg,
        host: &host,
        strict: true,
    };
    let mut prompter = ScriptedPrompter::new(Some(RemovalScope::CurrentFile), &[true]);
    let mut machine = ScopeMachine::default();

    assert_eq!(remove_all(&request, &mut prompter, &mut machine), RemovalOutcome::Cancelled);
    assert_eq!(prompter.warnings, vec!["No active editor found"]);
    assert!(prompter.questions.is_empty());
}

#[test]
fn current_file_scope_removes_only_that_file() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let file = root.join("src/b.ts");
    let host = FsHost::default();

    let request = RemovalRequest {
        current_file: Some(file.as_path()),
        root: Some(root.as_path()),
        tool: &FakeRg,
        host: &host,
        strict: true,
    };
    let mut prompter = ScriptedPrompter::new(Some(RemovalScope::CurrentFile), &[true]);
    let mut machine = ScopeMachine::default();

    let outcome = remove_all(&request, &mut prompter, &mut machine);
    assert_eq!(outcome, RemovalOutcome::Removed { scope: RemovalScope::CurrentFile, count: 2 });
    assert_eq!(prompter.questions, vec!["Found 2 TLOG statement(s) in current file. Remove them?"]);
    assert!(fs::read_to_string(root.join("a.ts"))?.contains("[TLOG]"));
    assert!(!fs::read_to_string(&file)?.contains("[TLOG]"));
    Ok(())
}

#[test]
fn zero_matches_is_informational() -> Result<()> {
    let tmp = assert_fs::TempDir::new()?;
    fs::write(tmp.path().join("clean.ts"), "ok();\n")?;
    let root = root_of(&tmp);
    let host = FsHost::default();

    let request = RemovalRequest {
        current_file: None,
        root: Some(root.as_path()),
        tool: &FakeRg,
        host: &host,
        strict: true,
    };
    let mut prompter = ScriptedPrompter::new(Some(RemovalScope::Workspace), &[true]);
    let mut machine = ScopeMachine::default();

    let outcome = remove_all(&request, &mut prompter, &mut machine);
    assert_eq!(outcome, RemovalOutcome::NothingFound { scope: RemovalScope::Workspace });
    assert!(prompter.questions.is_empty());
    assert!(prompter.infos.contains(&"No TLOG statements found in workspace".to_string()));
    assert!(prompter.errors.is_empty());
    assert_eq!(machine.state(), FlowState::Idle);
    Ok(())
}

#[test]
fn tool_failure_is_reported_and_returns_to_idle() {
    let host = FsHost::default();
    let tool = CannedTool { mode: SearchMode::Json, output: Err("rg: permission denied".into()) };
    let root = std::env::temp_dir();
    let request = RemovalRequest {
        current_file: None,
        root: Some(root.as_path()),
        tool: &tool,
        host: &host,
        strict: true,
    };
    let mut prompter = ScriptedPrompter::new(Some(RemovalScope::Workspace), &[true]);
    let mut machine = ScopeMachine::default();

    let outcome = remove_all(&request, &mut prompter, &mut machine);
    assert!(matches!(outcome, RemovalOutcome::Failed { .. }));
    assert_eq!(prompter.errors.len(), 1);
    assert!(prompter.errors[0].contains("permission denied"));
    assert_eq!(machine.state(), FlowState::Idle);
}

#[test]
fn background_refresh_failure_shows_empty_tree() {
    let tool = CannedTool { mode: SearchMode::Lines, output: Err("boom".into()) };
    let explorer = Explorer::new(std::env::temp_dir(), tool);
    assert!(explorer.refresh().is_err());
    assert!(explorer.refresh_or_empty().is_empty());
}
