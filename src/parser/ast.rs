//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == kind)
}

fn first_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }
}

// ============================================================================
// Items
// ============================================================================

/// Any statement-level construct
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Let(LetDecl),
    Directive(DirectiveDecl),
    Fn(FnDecl),
    Import(ImportDecl),
    If(IfBlock),
    For(ForBlock),
    Block(Block),
    Expr(ExprStmt),
}

impl AstNode for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::LET_DECL
                | SyntaxKind::DIRECTIVE_DECL
                | SyntaxKind::FN_DECL
                | SyntaxKind::IMPORT_DECL
                | SyntaxKind::IF_BLOCK
                | SyntaxKind::FOR_BLOCK
                | SyntaxKind::BLOCK
                | SyntaxKind::EXPR_STMT
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LET_DECL => Some(Self::Let(LetDecl(node))),
            SyntaxKind::DIRECTIVE_DECL => Some(Self::Directive(DirectiveDecl(node))),
            SyntaxKind::FN_DECL => Some(Self::Fn(FnDecl(node))),
            SyntaxKind::IMPORT_DECL => Some(Self::Import(ImportDecl(node))),
            SyntaxKind::IF_BLOCK => Some(Self::If(IfBlock(node))),
            SyntaxKind::FOR_BLOCK => Some(Self::For(ForBlock(node))),
            SyntaxKind::BLOCK => Some(Self::Block(Block(node))),
            SyntaxKind::EXPR_STMT => Some(Self::Expr(ExprStmt(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Let(n) => n.syntax(),
            Self::Directive(n) => n.syntax(),
            Self::Fn(n) => n.syntax(),
            Self::Import(n) => n.syntax(),
            Self::If(n) => n.syntax(),
            Self::For(n) => n.syntax(),
            Self::Block(n) => n.syntax(),
            Self::Expr(n) => n.syntax(),
        }
    }
}

ast_node!(LetDecl, LET_DECL);

impl LetDecl {
    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn is_const(&self) -> bool {
        has_token(&self.0, SyntaxKind::CONST_KW)
    }

    pub fn is_exported(&self) -> bool {
        has_token(&self.0, SyntaxKind::EXPORT_KW)
    }

    pub fn has_initializer(&self) -> bool {
        has_token(&self.0, SyntaxKind::EQ)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        self.0.children().find_map(TypeAnnotation::cast)
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(DirectiveDecl, DIRECTIVE_DECL);

impl DirectiveDecl {
    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn is_exported(&self) -> bool {
        has_token(&self.0, SyntaxKind::EXPORT_KW)
    }

    pub fn params(&self) -> Option<ParamList> {
        self.0.children().find_map(ParamList::cast)
    }

    pub fn body(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

ast_node!(FnDecl, FN_DECL);

impl FnDecl {
    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn is_exported(&self) -> bool {
        has_token(&self.0, SyntaxKind::EXPORT_KW)
    }

    pub fn params(&self) -> Option<ParamList> {
        self.0.children().find_map(ParamList::cast)
    }

    pub fn body(&self) -> Option<Block> {
        self.0.children().find_map(Block::cast)
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + '_ {
        self.0.children().filter_map(Param::cast)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn name(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        self.0.children().find_map(TypeAnnotation::cast)
    }

    pub fn has_default(&self) -> bool {
        has_token(&self.0, SyntaxKind::EQ)
    }
}

ast_node!(TypeAnnotation, TYPE_ANNOTATION);

impl TypeAnnotation {
    pub fn target(&self) -> Option<NameRef> {
        self.0.children().find_map(NameRef::cast)
    }
}

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    pub fn path(&self) -> Option<ImportPath> {
        self.0.children().find_map(ImportPath::cast)
    }

    /// The `as` alias, if any
    pub fn alias(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }
}

ast_node!(ImportPath, IMPORT_PATH);

impl ImportPath {
    pub fn segments(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
    }

    pub fn last_segment(&self) -> Option<SyntaxToken> {
        self.segments().last()
    }
}

ast_node!(IfBlock, IF_BLOCK);

impl IfBlock {
    pub fn condition(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }

    pub fn elif_clauses(&self) -> impl Iterator<Item = ElifClause> + '_ {
        self.0.children().filter_map(ElifClause::cast)
    }

    pub fn else_clause(&self) -> Option<ElseClause> {
        self.0.children().find_map(ElseClause::cast)
    }

    /// Whether the block is closed by `end`
    pub fn is_closed(&self) -> bool {
        has_token(&self.0, SyntaxKind::END_KW)
    }
}

ast_node!(ElifClause, ELIF_CLAUSE);

impl ElifClause {
    pub fn condition(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }
}

ast_node!(ElseClause, ELSE_CLAUSE);

impl ElseClause {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }
}

ast_node!(ForBlock, FOR_BLOCK);

impl ForBlock {
    /// The loop variable
    pub fn binding(&self) -> Option<Name> {
        self.0.children().find_map(Name::cast)
    }

    pub fn iterable(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }

    pub fn is_closed(&self) -> bool {
        has_token(&self.0, SyntaxKind::END_KW)
    }
}

ast_node!(Block, BLOCK);

impl Block {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

// ============================================================================
// Names
// ============================================================================

ast_node!(Name, NAME);

impl Name {
    pub fn ident(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::IDENT)
    }

    pub fn text(&self) -> Option<String> {
        self.ident().map(|t| t.text().to_string())
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn ident(&self) -> Option<SyntaxToken> {
        first_token(&self.0, SyntaxKind::IDENT)
    }

    pub fn text(&self) -> Option<String> {
        self.ident().map(|t| t.text().to_string())
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(Literal),
    NameRef(NameRef),
    Paren(ParenExpr),
    Array(ArrayExpr),
    Template(TemplateExpr),
    Prefix(PrefixExpr),
    Binary(BinaryExpr),
    Conditional(ConditionalExpr),
    Call(CallExpr),
    Member(MemberExpr),
    Index(IndexExpr),
}

impl AstNode for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::LITERAL
                | SyntaxKind::NAME_REF
                | SyntaxKind::PAREN_EXPR
                | SyntaxKind::ARRAY_EXPR
                | SyntaxKind::TEMPLATE_EXPR
                | SyntaxKind::PREFIX_EXPR
                | SyntaxKind::BINARY_EXPR
                | SyntaxKind::CONDITIONAL_EXPR
                | SyntaxKind::CALL_EXPR
                | SyntaxKind::MEMBER_EXPR
                | SyntaxKind::INDEX_EXPR
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::LITERAL => Some(Self::Literal(Literal(node))),
            SyntaxKind::NAME_REF => Some(Self::NameRef(NameRef(node))),
            SyntaxKind::PAREN_EXPR => Some(Self::Paren(ParenExpr(node))),
            SyntaxKind::ARRAY_EXPR => Some(Self::Array(ArrayExpr(node))),
            SyntaxKind::TEMPLATE_EXPR => Some(Self::Template(TemplateExpr(node))),
            SyntaxKind::PREFIX_EXPR => Some(Self::Prefix(PrefixExpr(node))),
            SyntaxKind::BINARY_EXPR => Some(Self::Binary(BinaryExpr(node))),
            SyntaxKind::CONDITIONAL_EXPR => Some(Self::Conditional(ConditionalExpr(node))),
            SyntaxKind::CALL_EXPR => Some(Self::Call(CallExpr(node))),
            SyntaxKind::MEMBER_EXPR => Some(Self::Member(MemberExpr(node))),
            SyntaxKind::INDEX_EXPR => Some(Self::Index(IndexExpr(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Literal(n) => n.syntax(),
            Self::NameRef(n) => n.syntax(),
            Self::Paren(n) => n.syntax(),
            Self::Array(n) => n.syntax(),
            Self::Template(n) => n.syntax(),
            Self::Prefix(n) => n.syntax(),
            Self::Binary(n) => n.syntax(),
            Self::Conditional(n) => n.syntax(),
            Self::Call(n) => n.syntax(),
            Self::Member(n) => n.syntax(),
            Self::Index(n) => n.syntax(),
        }
    }
}

ast_node!(Literal, LITERAL);

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.first_token()
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn expr(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(ArrayExpr, ARRAY_EXPR);

impl ArrayExpr {
    pub fn elements(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0.children().filter_map(Expr::cast)
    }
}

ast_node!(TemplateExpr, TEMPLATE_EXPR);

impl TemplateExpr {
    pub fn interpolations(&self) -> impl Iterator<Item = Interpolation> + '_ {
        self.0.children().filter_map(Interpolation::cast)
    }
}

ast_node!(Interpolation, INTERPOLATION);

impl Interpolation {
    pub fn expr(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(PrefixExpr, PREFIX_EXPR);

impl PrefixExpr {
    pub fn op_kind(&self) -> Option<SyntaxKind> {
        self.0.first_token().map(|t| t.kind())
    }

    pub fn operand(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn rhs(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }

    /// The operator token (first non-trivia token directly under the node)
    pub fn op_kind(&self) -> Option<SyntaxKind> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
            .map(|t| t.kind())
    }
}

ast_node!(ConditionalExpr, CONDITIONAL_EXPR);

impl ConditionalExpr {
    pub fn condition(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn then_branch(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }

    pub fn else_branch(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(2)
    }
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn args(&self) -> impl Iterator<Item = Expr> + '_ {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::ARG_LIST)
            .flat_map(|list| list.children().filter_map(Expr::cast).collect::<Vec<_>>())
    }
}

ast_node!(MemberExpr, MEMBER_EXPR);

impl MemberExpr {
    pub fn receiver(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    /// The name after the `.`
    pub fn member(&self) -> Option<NameRef> {
        self.0
            .children_with_tokens()
            .skip_while(|e| e.kind() != SyntaxKind::DOT)
            .filter_map(|e| e.into_node())
            .find_map(NameRef::cast)
    }
}

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    pub fn base(&self) -> Option<Expr> {
        self.0.children().find_map(Expr::cast)
    }

    pub fn index(&self) -> Option<Expr> {
        self.0.children().filter_map(Expr::cast).nth(1)
    }
}
