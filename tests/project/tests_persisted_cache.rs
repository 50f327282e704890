//! Persisted stub cache: save from one session, warm-start another.

use std::fs;

use weft::hir::{FORMAT_VERSION, Scope};
use weft::project::PersistError;
use weft::{FileId, Project, ProjectConfig, ProjectError, SubmitOutcome};

use crate::helpers::source_fixtures::*;

const MAIN: FileId = FileId::new(1);
const LIB: FileId = FileId::new(2);

fn populated() -> Project {
    let project = Project::new();
    project.submit_file(MAIN, NESTED_SCOPES.as_bytes()).expect("utf8");
    project.submit_file(LIB, EXPORTS.as_bytes()).expect("utf8");
    project
}

#[test]
fn test_warm_start_answers_queries_without_parsing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("weft.stubs");
    assert_eq!(populated().save_cache(&path).expect("saved"), 2);

    let warm = Project::new();
    assert_eq!(warm.load_cache(&path).expect("loaded"), 2);
    assert_eq!(warm.build_count(), 0);

    let hits = warm.query_symbol("greet", Scope::Project);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file, LIB);
    assert!(hits[0].is_exported());

    // Same content as the cache: nothing to build
    assert_eq!(
        warm.submit_file(LIB, EXPORTS.as_bytes()).expect("utf8"),
        SubmitOutcome::Unchanged
    );
    assert_eq!(warm.build_count(), 0);

    // The tree itself is only built once somebody asks for it
    let node = warm.navigate(&hits[0]).expect("navigable");
    assert!(node.text().to_string().starts_with("export fn greet"));
    assert_eq!(warm.build_count(), 1);
}

#[test]
fn test_changed_content_replaces_warm_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("weft.stubs");
    populated().save_cache(&path).expect("saved");

    let warm = Project::new();
    warm.load_cache(&path).expect("loaded");
    assert_eq!(
        warm.submit_file(MAIN, b"let fresh = 1;").expect("utf8"),
        SubmitOutcome::Rebuilt
    );
    assert!(warm.query_symbol("layout", Scope::Project).is_empty());
    assert_eq!(warm.query_symbol("fresh", Scope::Project).len(), 1);
    // LIB is still served from the cache
    assert_eq!(warm.query_symbol("version", Scope::Project).len(), 1);
}

#[test]
fn test_version_mismatch_discards_whole_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("weft.stubs");
    populated().save_cache(&path).expect("saved");

    let mut bytes = fs::read(&path).expect("readable");
    bytes[0..4].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
    fs::write(&path, bytes).expect("writable");

    let project = Project::new();
    let err = project.load_cache(&path).expect_err("mismatch");
    assert!(matches!(
        err,
        ProjectError::Persist(PersistError::VersionMismatch { .. })
    ));
    assert!(project.index().is_empty());

    // Rebuilding from source still works
    project.submit_file(MAIN, NESTED_SCOPES.as_bytes()).expect("utf8");
    assert_eq!(project.query_symbol("layout", Scope::Project).len(), 1);
}

#[test]
fn test_save_and_restore_through_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ProjectConfig::default().with_cache_path(dir.path().join("weft.stubs"));

    let first = Project::with_config(config.clone()).expect("config");
    assert_eq!(first.restore().expect("nothing to restore"), None);
    first.submit_file(MAIN, SIMPLE_DIRECTIVE.as_bytes()).expect("utf8");
    assert_eq!(first.save().expect("saved"), Some(1));

    let second = Project::with_config(config).expect("config");
    assert_eq!(second.restore().expect("restored"), Some(1));
    assert_eq!(second.query_symbol("foo", Scope::Project).len(), 1);
}

#[test]
fn test_warm_stubs_survive_a_second_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first_path = dir.path().join("first.stubs");
    let second_path = dir.path().join("second.stubs");
    populated().save_cache(&first_path).expect("saved");

    let warm = Project::new();
    warm.load_cache(&first_path).expect("loaded");
    assert_eq!(warm.save_cache(&second_path).expect("saved"), 2);
    assert_eq!(
        fs::read(&first_path).expect("first"),
        fs::read(&second_path).expect("second")
    );
}

fn too_deep_for_stubs() -> String {
    let depth = weft::hir::MAX_STUB_DEPTH + 1;
    format!("{}{}", "fn f() {".repeat(depth), "}".repeat(depth))
}

#[test]
fn test_degraded_file_keeps_entries_through_rebuild_and_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("weft.stubs");

    let project = Project::new();
    project.submit_file(MAIN, b"export let kept = 1;").expect("utf8");
    project.submit_file(LIB, EXPORTS.as_bytes()).expect("utf8");
    assert_eq!(
        project.submit_file(MAIN, too_deep_for_stubs().as_bytes()).expect("utf8"),
        SubmitOutcome::Degraded
    );

    project.rebuild_index();
    assert_eq!(project.query_symbol("kept", Scope::Project).len(), 1);
    assert_eq!(project.save_cache(&path).expect("saved"), 2);

    let warm = Project::new();
    assert_eq!(warm.load_cache(&path).expect("loaded"), 2);
    let hits = warm.query_symbol("kept", Scope::Project);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file, MAIN);

    // The persisted hash is the last good content, so the deep text still rebuilds
    assert_eq!(
        warm.submit_file(MAIN, too_deep_for_stubs().as_bytes()).expect("utf8"),
        SubmitOutcome::Degraded
    );
    assert_eq!(warm.query_symbol("kept", Scope::Project).len(), 1);
}
