//! Whole-document lexing and parsing.

use weft::parser::ast::{AstNode, Expr, Item, SourceFile};
use weft::parser::{SyntaxKind, parse, tokenize};

use crate::helpers::source_fixtures::*;

fn non_trivia_kinds(source: &str) -> Vec<SyntaxKind> {
    tokenize(source)
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_trivia())
        .collect()
}

#[test]
fn test_member_call_tokens_and_tree() {
    assert_eq!(
        non_trivia_kinds(MEMBER_CALL),
        vec![
            SyntaxKind::IDENT,
            SyntaxKind::DOT,
            SyntaxKind::IDENT,
            SyntaxKind::L_PAREN,
            SyntaxKind::IDENT,
            SyntaxKind::R_PAREN,
        ]
    );

    let parse = parse(MEMBER_CALL);
    assert!(parse.ok(), "{:?}", parse.errors);
    let file = SourceFile::cast(parse.syntax()).expect("root is a source file");
    let items: Vec<_> = file.items().collect();
    assert_eq!(items.len(), 1);
    let Item::Expr(stmt) = &items[0] else {
        panic!("expected an expression statement, got {:?}", items[0]);
    };
    let Some(Expr::Call(call)) = stmt.expr() else {
        panic!("expected a call");
    };
    let callee = call.callee().expect("callee");
    assert_eq!(callee.syntax().kind(), SyntaxKind::MEMBER_EXPR);
    assert_eq!(call.args().count(), 1);
}

#[test]
fn test_directive_parses_clean() {
    let parse = parse(SIMPLE_DIRECTIVE);
    assert!(parse.ok());
    let file = SourceFile::cast(parse.syntax()).expect("root");
    let Some(Item::Directive(directive)) = file.items().next() else {
        panic!("expected a directive");
    };
    assert_eq!(
        directive.name().and_then(|n| n.text()).as_deref(),
        Some("foo")
    );
    assert!(directive.body().is_some());
}

#[test]
fn test_well_formed_fixtures_have_no_errors() {
    for source in [SIMPLE_LET, SIMPLE_DIRECTIVE, MEMBER_CALL, EXPORTS, NESTED_SCOPES, IMPORTS] {
        let parse = parse(source);
        assert!(parse.ok(), "{source:?}: {:?}", parse.errors);
    }
}

#[test]
fn test_nested_scopes_shape() {
    let parse = parse(NESTED_SCOPES);
    let root = parse.syntax();
    let count = |kind| root.descendants().filter(|n| n.kind() == kind).count();
    assert_eq!(count(SyntaxKind::DIRECTIVE_DECL), 1);
    assert_eq!(count(SyntaxKind::FOR_BLOCK), 1);
    assert_eq!(count(SyntaxKind::IF_BLOCK), 1);
    assert_eq!(count(SyntaxKind::ELSE_CLAUSE), 1);
    assert_eq!(count(SyntaxKind::LET_DECL), 4);
    assert_eq!(count(SyntaxKind::ERROR), 0);
}

#[test]
fn test_template_interpolation_nodes() {
    let parse = parse(EXPORTS);
    let root = parse.syntax();
    let interpolations = root
        .descendants()
        .filter(|n| n.kind() == SyntaxKind::INTERPOLATION)
        .count();
    assert_eq!(interpolations, 2);
}

#[test]
fn test_every_fixture_is_lossless() {
    for source in ALL {
        assert_eq!(parse(source).syntax().text().to_string(), *source);
    }
}
