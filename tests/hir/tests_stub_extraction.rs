//! Stub extraction over multi-construct documents.

use weft::hir::{StubFlags, StubPath, StubTree, extract, navigate};
use weft::parser::{SyntaxKind, parse};

use crate::helpers::source_fixtures::*;

fn stubs(source: &str) -> StubTree {
    extract(&parse(source).syntax()).expect("extractable")
}

fn names(tree: &StubTree) -> Vec<(String, String)> {
    tree.iter()
        .map(|(path, stub)| (path.to_string(), stub.name().unwrap_or("").to_string()))
        .collect()
}

#[test]
fn test_nested_scopes_tree() {
    let tree = stubs(NESTED_SCOPES);
    let expected: Vec<(String, String)> = [
        ("/0", "layout"),
        ("/0/0", "title"),
        ("/0/1", "header"),
        ("/0/2", "item"),
        ("/0/2/0", "row"),
        ("/0/3", "banner"),
        ("/0/4", "banner"),
    ]
    .iter()
    .map(|(p, n)| (p.to_string(), n.to_string()))
    .collect();
    assert_eq!(names(&tree), expected);

    let item = tree.get(&StubPath::from_indices([0, 2])).expect("for binding");
    assert_eq!(item.kind, SyntaxKind::FOR_BLOCK);
    assert_eq!(item.flags, StubFlags::LOOP_BINDING);
}

#[test]
fn test_export_flags() {
    let tree = stubs(EXPORTS);
    let (_, version) = tree.find_by_name("version").next().expect("version");
    assert!(version.flags.contains(StubFlags::CONSTANT | StubFlags::EXPORTED | StubFlags::DEFINITION));

    let (path, greet) = tree.find_by_name("greet").next().expect("greet");
    assert_eq!(greet.kind, SyntaxKind::FN_DECL);
    assert!(greet.flags.contains(StubFlags::EXPORTED));
    assert_eq!(greet.children.len(), 2);

    let greeting = tree.get(&path.child(1)).expect("second param");
    assert_eq!(greeting.name(), Some("greeting"));
    assert!(greeting.flags.contains(StubFlags::PARAMETER | StubFlags::DEFINITION));
}

#[test]
fn test_import_targets() {
    let tree = stubs(IMPORTS);
    let imports: Vec<_> = tree.iter().map(|(_, stub)| stub.name().map(str::to_string)).collect();
    assert_eq!(imports, vec![Some("text".to_string()), Some("dict".to_string())]);
    assert!(tree.iter().all(|(_, stub)| stub.flags == StubFlags::IMPORT));
}

#[test]
fn test_every_stub_navigates_to_its_anchor() {
    for source in ALL {
        let parse = parse(source);
        let root = parse.syntax();
        let Ok(tree) = extract(&root) else {
            continue;
        };
        for (path, stub) in tree.iter() {
            let node = navigate(&root, &path).unwrap_or_else(|| panic!("{source:?}: {path} does not navigate"));
            assert_eq!(node.kind(), stub.kind);
            assert_eq!(Some(node.text_range()), stub.range);
        }
    }
}

#[test]
fn test_member_call_has_no_stubs() {
    assert!(stubs(MEMBER_CALL).is_empty());
}
