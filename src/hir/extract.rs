//! Stub extraction: syntax tree → stub tree.
//!
//! A pure traversal driven by [`STUB_RULES`]. Kinds listed there become
//! stubs; everything else is transparent and its stub-producing descendants
//! attach to the nearest enclosing stub. Expression subtrees are never
//! entered since nothing inside them is referenceable by name.
//!
//! Extraction only looks at the tree it is given, so an unchanged tree always
//! yields the same stubs (and the same encoded bytes).

use thiserror::Error;

use super::stubs::{StubFlags, StubNode, StubPath, StubTree};
use crate::base::{Interner, Name, TextRange};
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, SyntaxNode};

/// Deepest stub nesting accepted; the root sits at level 0.
pub const MAX_STUB_DEPTH: usize = 256;

/// A tree shape the extractor cannot interpret. The file is marked degraded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("expected a source file root, found {found:?}")]
    UnexpectedRoot { found: SyntaxKind },
    #[error("name at {range:?} has no identifier")]
    EmptyName { range: TextRange },
    #[error("declarations nested deeper than {max} levels")]
    TooDeep { max: usize },
}

// ============================================================================
// INDEX-WORTHY TABLE
// ============================================================================

/// Where a stub's name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameSource {
    /// The `NAME` child node
    NameChild,
    /// The `as` alias, else the last import path segment
    ImportTarget,
}

struct StubRule {
    kind: SyntaxKind,
    name: NameSource,
    flags: fn(&SyntaxNode) -> StubFlags,
}

static STUB_RULES: &[StubRule] = &[
    StubRule {
        kind: SyntaxKind::LET_DECL,
        name: NameSource::NameChild,
        flags: let_flags,
    },
    StubRule {
        kind: SyntaxKind::DIRECTIVE_DECL,
        name: NameSource::NameChild,
        flags: directive_flags,
    },
    StubRule {
        kind: SyntaxKind::FN_DECL,
        name: NameSource::NameChild,
        flags: fn_flags,
    },
    StubRule {
        kind: SyntaxKind::PARAM,
        name: NameSource::NameChild,
        flags: param_flags,
    },
    StubRule {
        kind: SyntaxKind::FOR_BLOCK,
        name: NameSource::NameChild,
        flags: |_| StubFlags::LOOP_BINDING,
    },
    StubRule {
        kind: SyntaxKind::IMPORT_DECL,
        name: NameSource::ImportTarget,
        flags: |_| StubFlags::IMPORT,
    },
];

fn let_flags(node: &SyntaxNode) -> StubFlags {
    let mut flags = StubFlags::EMPTY;
    if let Some(decl) = ast::LetDecl::cast(node.clone()) {
        flags.set(StubFlags::CONSTANT, decl.is_const());
        flags.set(StubFlags::DEFINITION, decl.has_initializer());
        flags.set(StubFlags::EXPORTED, decl.is_exported());
    }
    flags
}

fn directive_flags(node: &SyntaxNode) -> StubFlags {
    let exported = ast::DirectiveDecl::cast(node.clone()).is_some_and(|d| d.is_exported());
    let mut flags = StubFlags::DEFINITION;
    flags.set(StubFlags::EXPORTED, exported);
    flags
}

fn fn_flags(node: &SyntaxNode) -> StubFlags {
    let exported = ast::FnDecl::cast(node.clone()).is_some_and(|d| d.is_exported());
    let mut flags = StubFlags::DEFINITION;
    flags.set(StubFlags::EXPORTED, exported);
    flags
}

fn param_flags(node: &SyntaxNode) -> StubFlags {
    let mut flags = StubFlags::PARAMETER;
    flags.set(
        StubFlags::DEFINITION,
        ast::Param::cast(node.clone()).is_some_and(|p| p.has_default()),
    );
    flags
}

fn rule_for(kind: SyntaxKind) -> Option<&'static StubRule> {
    STUB_RULES.iter().find(|rule| rule.kind == kind)
}

/// Whether nodes of `kind` can become stubs.
pub fn is_index_worthy(kind: SyntaxKind) -> bool {
    rule_for(kind).is_some()
}

/// Subtrees that can never contain a stub.
fn is_opaque(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    matches!(
        kind,
        NAME | NAME_REF
            | TYPE_ANNOTATION
            | IMPORT_PATH
            | LITERAL
            | PAREN_EXPR
            | ARRAY_EXPR
            | TEMPLATE_EXPR
            | INTERPOLATION
            | PREFIX_EXPR
            | BINARY_EXPR
            | CONDITIONAL_EXPR
            | CALL_EXPR
            | ARG_LIST
            | MEMBER_EXPR
            | INDEX_EXPR
    )
}

// ============================================================================
// TRAVERSAL
// ============================================================================

/// A syntax node that produces a stub, with its rule and name text.
struct StubSource {
    node: SyntaxNode,
    rule: &'static StubRule,
    name: String,
}

fn name_child_text(node: &SyntaxNode) -> Result<Option<String>, ExtractError> {
    match node.children().find_map(ast::Name::cast) {
        None => Ok(None),
        Some(name) => match name.text() {
            Some(text) => Ok(Some(text)),
            None => Err(ExtractError::EmptyName {
                range: name.syntax().text_range(),
            }),
        },
    }
}

fn stub_name(rule: &StubRule, node: &SyntaxNode) -> Result<Option<String>, ExtractError> {
    match rule.name {
        NameSource::NameChild => name_child_text(node),
        NameSource::ImportTarget => {
            if let Some(alias) = name_child_text(node)? {
                return Ok(Some(alias));
            }
            Ok(ast::ImportDecl::cast(node.clone())
                .and_then(|decl| decl.path())
                .and_then(|path| path.last_segment())
                .map(|token| token.text().to_string()))
        }
    }
}

/// Collect the nodes that become direct stub children of `node`.
///
/// Transparent nodes are walked with an explicit stack, in source order.
fn stub_sources(node: &SyntaxNode, out: &mut Vec<StubSource>) -> Result<(), ExtractError> {
    let mut pending = vec![node.children()];
    while let Some(children) = pending.last_mut() {
        let Some(child) = children.next() else {
            pending.pop();
            continue;
        };
        if is_opaque(child.kind()) {
            continue;
        }
        if let Some(rule) = rule_for(child.kind()) {
            if let Some(name) = stub_name(rule, &child)? {
                out.push(StubSource {
                    node: child,
                    rule,
                    name,
                });
                continue;
            }
        }
        // Transparent, or a declaration that lost its name
        pending.push(child.children());
    }
    Ok(())
}

fn build_children(
    node: &SyntaxNode,
    level: usize,
    interner: &mut Interner,
) -> Result<Vec<StubNode>, ExtractError> {
    let mut sources = Vec::new();
    stub_sources(node, &mut sources)?;
    if sources.is_empty() {
        return Ok(Vec::new());
    }
    if level > MAX_STUB_DEPTH {
        return Err(ExtractError::TooDeep { max: MAX_STUB_DEPTH });
    }

    let mut stubs = Vec::with_capacity(sources.len());
    for source in sources {
        let name: Name = interner.intern(&source.name);
        let children = build_children(&source.node, level + 1, interner)?;
        stubs.push(
            StubNode::new(source.rule.kind, Some(name), (source.rule.flags)(&source.node))
                .with_range(source.node.text_range())
                .with_children(children),
        );
    }
    Ok(stubs)
}

/// Reduce a parsed file to its stub tree.
pub fn extract(root: &SyntaxNode) -> Result<StubTree, ExtractError> {
    if root.kind() != SyntaxKind::SOURCE_FILE {
        return Err(ExtractError::UnexpectedRoot { found: root.kind() });
    }
    let mut interner = Interner::new();
    let children = build_children(root, 1, &mut interner)?;
    Ok(StubTree::new(
        StubNode::new(SyntaxKind::SOURCE_FILE, None, StubFlags::EMPTY)
            .with_range(root.text_range())
            .with_children(children),
    ))
}

/// Follow a stub path back into a syntax tree.
///
/// Replays the extractor's traversal, so it works on any tree whose stubs
/// would have this path, including one rebuilt after the stubs were cached.
pub fn navigate(root: &SyntaxNode, path: &StubPath) -> Option<SyntaxNode> {
    if root.kind() != SyntaxKind::SOURCE_FILE {
        return None;
    }
    let mut current = root.clone();
    for &index in path.indices() {
        let mut sources = Vec::new();
        stub_sources(&current, &mut sources).ok()?;
        current = sources.into_iter().nth(index as usize)?.node;
    }
    Some(current)
}
