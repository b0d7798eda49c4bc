//! Deletion engine and tree-item removal against files on disk.

mod util;

use std::fs;

use anyhow::Result;
use indexmap::IndexMap;
use tempfile::TempDir;

use tlog::core::explorer::Explorer;
use tlog::core::remove::{EditHost, FsHost, PendingEdit, execute, plan, remove_from_file};
use tlog::error::TlogError;
use util::{CountingRg, FakeRg, ScriptedPrompter, make_workspace, root_of};

fn numbered(n: usize) -> String {
    (0..n).map(|i| format!("line {i}\n")).collect()
}

#[test]
fn unsorted_duplicate_lines_delete_exact_originals() -> Result<()> {
    let tmp = TempDir::new()?;
    let p = tmp.path().join("a.ts");
    fs::write(&p, numbered(10))?;

    let mut map = IndexMap::new();
    map.insert(p.clone(), vec![3, 7, 1, 7]);
    let removed = execute(PendingEdit::LineMap(map), &FsHost::default())?;

    assert_eq!(removed, 3);
    let expected: String = [0, 2, 4, 5, 6, 8, 9].iter().map(|i| format!("line {i}\n")).collect();
    assert_eq!(fs::read_to_string(&p)?, expected);
    Ok(())
}

#[test]
fn cross_file_map_is_one_combined_edit() -> Result<()> {
    let tmp = TempDir::new()?;
    let a = tmp.path().join("a.ts");
    let b = tmp.path().join("b.ts");
    fs::write(&a, numbered(3))?;
    fs::write(&b, numbered(4))?;

    let mut map = IndexMap::new();
    map.insert(a.clone(), vec![0]);
    map.insert(b.clone(), vec![3, 0]);
    let edit = plan(PendingEdit::LineMap(map), &FsHost::default())?;

    assert_eq!(edit.files.len(), 2);
    assert_eq!(edit.line_count(), 3);
    let starts: Vec<usize> = edit.files[&b].ranges.iter().map(|r| r.start).collect();
    assert!(starts.windows(2).all(|w| w[0] > w[1]));

    FsHost::default().apply(&edit)?;
    assert_eq!(fs::read_to_string(&a)?, "line 1\nline 2\n");
    assert_eq!(fs::read_to_string(&b)?, "line 1\nline 2\n");
    Ok(())
}

#[test]
fn removal_on_clean_file_is_a_noop() -> Result<()> {
    let tmp = TempDir::new()?;
    let p = tmp.path().join("clean.ts");
    fs::write(&p, "const x = 1;\nconsole.log('plain');\n")?;
    let before = fs::metadata(&p)?.modified()?;

    assert_eq!(remove_from_file(&FsHost::default(), &p)?, 0);
    assert_eq!(fs::read_to_string(&p)?, "const x = 1;\nconsole.log('plain');\n");
    assert_eq!(fs::metadata(&p)?.modified()?, before);
    Ok(())
}

#[test]
fn directory_removal_counts_cleaned_files() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let explorer = Explorer::new(&root, FakeRg);
    let tree = explorer.refresh()?;
    let host = FsHost::default();

    let mut prompter = ScriptedPrompter::new(None, &[true]);
    let cleaned = explorer.remove_directory(&tree, &host, &mut prompter)?;

    assert_eq!(cleaned, 2);
    assert_eq!(
        prompter.questions,
        vec![format!("Remove 3 TLOG(s) from {} and all subdirectories?", root.display())]
    );
    assert!(explorer.refresh()?.is_empty());
    Ok(())
}

#[test]
fn file_group_removal_rescans_the_file() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let explorer = Explorer::new(&root, FakeRg);
    let tree = explorer.refresh()?;
    let group = tree.children["src"].files[0].clone();

    // A tag added after the scan is removed too.
    let b = root.join("src/b.ts");
    let mut text = fs::read_to_string(&b)?;
    text.push_str("console.log('[TLOG] late');\n");
    fs::write(&b, text)?;

    let mut prompter = ScriptedPrompter::new(None, &[true]);
    let removed = explorer.remove_file_group(&group, &FsHost::default(), &mut prompter)?;

    assert_eq!(removed, 3);
    assert_eq!(prompter.questions, vec!["Remove 2 TLOG(s) from b.ts?"]);
    assert!(!fs::read_to_string(&b)?.contains("[TLOG]"));
    assert_eq!(explorer.refresh()?.total_count(), 1);
    Ok(())
}

#[test]
fn tree_item_removals_do_not_rescan() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let explorer = Explorer::new(&root, CountingRg::default());
    let tree = explorer.refresh()?;
    let host = FsHost::default();
    assert_eq!(explorer.tool().calls(), 1);

    let occ = tree.files[0].items[0].clone();
    let mut prompter = ScriptedPrompter::new(None, &[true, true, true]);
    assert!(explorer.remove_occurrence(&occ, &host, &mut prompter)?);

    let group = tree.children["src"].files[0].clone();
    assert_eq!(explorer.remove_file_group(&group, &host, &mut prompter)?, 2);

    // Both files are clean by now and still count as cleaned.
    assert_eq!(explorer.remove_directory(&tree, &host, &mut prompter)?, 2);

    assert_eq!(explorer.tool().calls(), 1);
    assert_eq!(explorer.tree().total_count(), 3);
    Ok(())
}

#[test]
fn declining_a_tree_removal_is_a_silent_cancel() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let explorer = Explorer::new(&root, FakeRg);
    let tree = explorer.refresh()?;

    let mut prompter = ScriptedPrompter::new(None, &[false]);
    let err = explorer
        .remove_directory(&tree, &FsHost::default(), &mut prompter)
        .unwrap_err();

    assert!(matches!(err, TlogError::UserCancelled));
    assert!(err.is_silent());
    assert_eq!(explorer.tree().total_count(), 3);
    Ok(())
}

#[test]
fn single_removal_skips_moved_lines() -> Result<()> {
    let tmp = make_workspace();
    let root = root_of(&tmp);
    let explorer = Explorer::new(&root, FakeRg);
    let tree = explorer.refresh()?;
    let occ = tree.files[0].items[0].clone();
    let host = FsHost::default();

    // Shift the tagged line down by one.
    let a = root.join("a.ts");
    fs::write(&a, format!("// header\n{}", fs::read_to_string(&a)?))?;

    let mut prompter = ScriptedPrompter::new(None, &[true]);
    assert!(!explorer.remove_occurrence(&occ, &host, &mut prompter)?);
    assert_eq!(prompter.errors, vec!["Failed to remove TLOG"]);

    let moved = tlog::core::parse::Occurrence { line: occ.line + 1, ..occ };
    let mut prompter = ScriptedPrompter::new(None, &[true]);
    assert!(explorer.remove_occurrence(&moved, &host, &mut prompter)?);
    assert_eq!(prompter.questions, vec!["Remove this TLOG from line 4?"]);
    assert!(!fs::read_to_string(&a)?.contains("[TLOG]"));
    Ok(())
}
