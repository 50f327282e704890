//! Session behaviour through the public API.

use std::sync::Arc;
use std::thread;

use weft::hir::{ResolveResult, Scope};
use weft::parser::{SyntaxKind, TextEdit, TextRange, TextSize};
use weft::{FileId, Project, ProjectConfig, SubmitOutcome};

use crate::helpers::source_fixtures::*;

const MAIN: FileId = FileId::new(1);
const LIB: FileId = FileId::new(2);

#[test]
fn test_directive_is_queryable() {
    let project = Project::new();
    assert_eq!(
        project.submit_file(MAIN, SIMPLE_DIRECTIVE.as_bytes()).expect("utf8"),
        SubmitOutcome::Rebuilt
    );

    let hits = project.query_symbol("foo", Scope::Project);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, SyntaxKind::DIRECTIVE_DECL);
    assert_eq!(hits[0].file, MAIN);

    let node = project.navigate(&hits[0]).expect("navigable");
    assert_eq!(node.text().to_string(), SIMPLE_DIRECTIVE);
}

#[test]
fn test_identical_resubmit_does_no_work() {
    let project = Project::new();
    project.submit_file(MAIN, EXPORTS.as_bytes()).expect("utf8");
    let builds = project.build_count();
    let entries = project.index().entries_for_file(MAIN);

    for _ in 0..3 {
        assert_eq!(
            project.submit_file(MAIN, EXPORTS.as_bytes()).expect("utf8"),
            SubmitOutcome::Unchanged
        );
    }
    assert_eq!(project.build_count(), builds);
    assert_eq!(project.index().entries_for_file(MAIN), entries);
}

#[test]
fn test_edit_swaps_entries() {
    let project = Project::new();
    project.submit_file(MAIN, b"let before = 1;").expect("utf8");
    project.submit_file(MAIN, b"let after = 1;").expect("utf8");
    assert!(project.query_symbol("before", Scope::Project).is_empty());
    assert_eq!(project.query_symbol("after", Scope::Project).len(), 1);
}

#[test]
fn test_diagnostics_report_syntax_errors() {
    let project = Project::new();
    project.submit_file(MAIN, MISSING_INITIALIZER.as_bytes()).expect("utf8");
    let diagnostics = project.diagnostics(MAIN).expect("known");
    assert_eq!(diagnostics.syntax_errors.len(), 1);
    assert!(diagnostics.stub_error.is_none());
    // Broken files are still indexed
    assert_eq!(project.query_symbol("b", Scope::File(MAIN)).len(), 1);
}

#[test]
fn test_resolve_prefers_local_then_exports() {
    let project = Project::new();
    project.submit_file(LIB, b"export let shared = 1; let hidden = 2;").expect("utf8");
    let main = "let shared = 0; fn f(x) { x + shared + hidden; }";
    project.submit_file(MAIN, main.as_bytes()).expect("utf8");

    let at = |needle: &str| TextSize::new(main.rfind(needle).expect("needle") as u32);

    let ResolveResult::Found(local) = project.resolve("shared", MAIN, at("shared")) else {
        panic!("shared should resolve");
    };
    assert_eq!(local.file, MAIN);

    let ResolveResult::Found(param) = project.resolve("x", MAIN, at("x +")) else {
        panic!("x should resolve");
    };
    assert_eq!(param.kind, SyntaxKind::PARAM);

    // A lone candidate wins even when it is not exported
    let hidden = project.resolve("hidden", MAIN, at("hidden"));
    assert_eq!(hidden.found().map(|e| e.file), Some(LIB));
}

#[test]
fn test_concurrent_submits_end_consistent() {
    let project = Arc::new(Project::with_config(ProjectConfig::default().with_worker_threads(4)).expect("pool"));
    let writers: Vec<_> = (0..4u32)
        .map(|t| {
            let project = Arc::clone(&project);
            thread::spawn(move || {
                for round in 0..25u32 {
                    let source = format!("let v{t}_{round} = {round};");
                    project.submit_file(MAIN, source.as_bytes()).expect("utf8");
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().expect("writer panicked");
    }

    // Whatever content won, the index matches the tree for it
    let tree = project.get_syntax_tree(MAIN).expect("known");
    let text = tree.text().to_string();
    let entries = project.index().entries_for_file(MAIN);
    assert_eq!(entries.len(), 1);
    assert!(text.contains(entries[0].key.as_str()), "{text} vs {}", entries[0].key);
}

#[test]
fn test_batch_submit_indexes_every_file() {
    let project = Project::new();
    let batch: Vec<(FileId, Vec<u8>)> = ALL
        .iter()
        .enumerate()
        .map(|(i, source)| (FileId::new(i as u32 + 10), source.as_bytes().to_vec()))
        .collect();
    let results = project.submit_files(&batch);
    assert!(results.iter().all(|(_, outcome)| outcome.is_ok()));
    assert_eq!(project.files().len(), ALL.len());
    assert_eq!(project.query_symbol("layout", Scope::Project).len(), 1);
}

#[test]
fn test_edits_match_full_submit() {
    let edited = Project::new();
    let full = Project::new();
    edited.submit_file(MAIN, NESTED_SCOPES.as_bytes()).expect("utf8");

    let mut text = NESTED_SCOPES.to_string();
    let header = text.find("header").expect("fixture mentions header") as u32;
    let edits = [
        TextEdit::replace(TextRange::at(TextSize::new(header), TextSize::new(6)), "heading"),
        TextEdit::insert(TextSize::new(0), "export const top = `${1 + 2}`;\n"),
        TextEdit::delete(TextRange::new(TextSize::new(0), TextSize::new(7))),
    ];
    for edit in &edits {
        text = edit.apply(&text).expect("in bounds");
        assert_eq!(edited.edit_file(MAIN, edit).expect("fits"), SubmitOutcome::Rebuilt);
    }
    full.submit_file(MAIN, text.as_bytes()).expect("utf8");

    assert_eq!(
        edited.index().entries_for_file(MAIN),
        full.index().entries_for_file(MAIN)
    );
    assert_eq!(edited.query_symbol("heading", Scope::Project).len(), 1);
    assert_eq!(edited.query_symbol("top", Scope::Project).len(), 1);
    let tree = edited.get_syntax_tree(MAIN).expect("known");
    assert_eq!(tree.text().to_string(), text);
}
