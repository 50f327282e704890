//! Error recovery: a broken statement costs one diagnostic and at most one
//! ERROR node, and the statement after it parses normally.

use rstest::rstest;
use weft::hir::extract;
use weft::parser::ast::{AstNode, Item, SourceFile};
use weft::parser::{ErrorCode, SyntaxKind, SyntaxNode, parse};

use crate::helpers::source_fixtures::*;

fn error_nodes(root: &SyntaxNode) -> usize {
    root.descendants()
        .filter(|n| n.kind() == SyntaxKind::ERROR)
        .count()
}

fn top_level_let_names(root: SyntaxNode) -> Vec<String> {
    let file = SourceFile::cast(root).expect("root");
    file.items()
        .filter_map(|item| match item {
            Item::Let(decl) => decl.name().and_then(|n| n.text()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_missing_initializer_recovers_at_next_statement() {
    let parse = parse(MISSING_INITIALIZER);
    let root = parse.syntax();

    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].code, ErrorCode::E0406);
    assert!(error_nodes(&root) <= 1);
    assert_eq!(top_level_let_names(root.clone()), vec!["a", "b"]);

    let file = SourceFile::cast(root.clone()).expect("root");
    let Some(Item::Let(b)) = file.items().nth(1) else {
        panic!("second item should be a let");
    };
    assert!(b.has_initializer());

    let stubs = extract(&root).expect("stubs");
    assert_eq!(stubs.find_by_name("b").count(), 1);
}

#[rstest]
#[case::missing_initializer("let a = ;")]
#[case::missing_name("let = 5;")]
#[case::bad_character("@")]
#[case::stray_brace("}")]
#[case::stray_end("end")]
#[case::import_without_path("import ;")]
#[case::dangling_operator("a + ;")]
fn test_recovery_is_local(#[case] broken: &str) {
    let source = format!("{broken} let ok = 1;");
    let parse = parse(&source);
    let root = parse.syntax();

    assert!(!parse.errors.is_empty(), "{source:?} should report an error");
    assert!(error_nodes(&root) <= 1, "{source:?}: {root:#?}");
    assert!(
        top_level_let_names(root.clone()).contains(&"ok".to_string()),
        "{source:?}: {root:#?}"
    );
    assert_eq!(root.text().to_string(), source);
}

#[test]
fn test_stray_closer_does_not_unwind_block() {
    let parse = parse(STRAY_END);
    let root = parse.syntax();

    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].code, ErrorCode::E0205);
    assert_eq!(error_nodes(&root), 1);
    let block = root
        .children()
        .find(|n| n.kind() == SyntaxKind::BLOCK)
        .expect("block");
    assert_eq!(
        block.last_token().map(|t| t.kind()),
        Some(SyntaxKind::R_BRACE)
    );
}

#[test]
fn test_unclosed_block_reports_opener() {
    let parse = parse(UNCLOSED_BLOCK);
    assert_eq!(parse.errors.len(), 1);
    assert_eq!(parse.errors[0].code, ErrorCode::E0202);
    assert!(parse.errors[0].has_related());

    let stubs = extract(&parse.syntax()).expect("stubs");
    assert_eq!(stubs.find_by_name("a").count(), 1);
}

#[test]
fn test_unterminated_string_keeps_next_line() {
    let parse = parse(UNTERMINATED_STRING);
    assert!(!parse.ok());
    assert!(top_level_let_names(parse.syntax()).contains(&"t".to_string()));
}

const DEEP: usize = 100_000;

#[rstest]
#[case::braces("{", "", "")]
#[case::parens("(", "x", "")]
#[case::brackets("[", "x", "")]
#[case::prefix("-", "x", "")]
#[case::right_assoc("a ** ", "a", "")]
#[case::if_blocks("if x ", "", "")]
#[case::templates("`${", "x", "")]
fn test_unclosed_deep_nesting_is_one_error_node(#[case] open: &str, #[case] inner: &str, #[case] close: &str) {
    let source = format!("{}{}{}", open.repeat(DEEP), inner, close.repeat(DEEP));
    let parse = parse(&source);
    let root = parse.syntax();

    assert_eq!(root.text().to_string(), source);
    let too_deep = parse.errors.iter().filter(|e| e.code == ErrorCode::E0207).count();
    assert_eq!(too_deep, 1);
    assert!(extract(&root).is_ok());
}

#[rstest]
#[case::braces("{", "let x;", "}")]
#[case::parens("(", "x", ")")]
#[case::brackets("[", "x", "]")]
#[case::if_blocks("if x ", "let y;", "end ")]
fn test_closed_deep_nesting_reports_only_depth(#[case] open: &str, #[case] inner: &str, #[case] close: &str) {
    let source = format!("{}{}{} let after = 1;", open.repeat(DEEP), inner, close.repeat(DEEP));
    let parse = parse(&source);
    let root = parse.syntax();

    assert_eq!(root.text().to_string(), source);
    assert_eq!(parse.errors.len(), 1, "{:?}", &parse.errors[..parse.errors.len().min(3)]);
    assert_eq!(parse.errors[0].code, ErrorCode::E0207);
    assert_eq!(error_nodes(&root), 1);

    let stubs = extract(&root).expect("stubs");
    assert_eq!(stubs.find_by_name("after").count(), 1);
}
