//! Parse context tracking for context-aware error messages
//!
//! Each open paired construct records the context it was opened in, so an
//! error inside it can say where in the source structure it happened.

use crate::parser::SyntaxKind;
use crate::parser::token_set::TokenSet;

/// Represents the current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseContext {
    /// At the top level of a file
    #[default]
    TopLevel,
    /// Inside `{ ... }`
    Block,
    /// Inside an `if` or `elif` branch
    IfBlock,
    /// Inside an `else` branch
    ElseBranch,
    /// Inside a `for` loop body
    ForBlock,

    /// Parsing a parameter list
    ParameterList,
    /// Parsing call arguments or array elements
    ArgumentList,
}

/// Tokens that start a statement, shared by every statement-level recovery set
const STATEMENT_START: TokenSet = TokenSet::new(&[
    SyntaxKind::LET_KW,
    SyntaxKind::CONST_KW,
    SyntaxKind::FN_KW,
    SyntaxKind::DIRECTIVE_KW,
    SyntaxKind::IMPORT_KW,
    SyntaxKind::EXPORT_KW,
    SyntaxKind::IF_KW,
    SyntaxKind::FOR_KW,
]);

/// Statement boundaries: statement starts, `;`, braces and block closers
pub const STATEMENT_RECOVERY: TokenSet = STATEMENT_START.union(TokenSet::new(&[
    SyntaxKind::SEMICOLON,
    SyntaxKind::L_BRACE,
    SyntaxKind::R_BRACE,
    SyntaxKind::ELIF_KW,
    SyntaxKind::ELSE_KW,
    SyntaxKind::END_KW,
]));

impl ParseContext {
    /// Get a human-readable description of this context for error messages
    pub fn description(&self) -> &'static str {
        match self {
            Self::TopLevel => "at top level",
            Self::Block => "in block",
            Self::IfBlock => "in if block",
            Self::ElseBranch => "in else branch",
            Self::ForBlock => "in for block",
            Self::ParameterList => "in parameter list",
            Self::ArgumentList => "in argument list",
        }
    }

    /// Get a description of what tokens are expected in this context
    pub fn expected_description(&self) -> &'static str {
        match self {
            Self::TopLevel => "a declaration, import, or statement",
            Self::Block => "a statement or '}'",
            Self::IfBlock => "a statement, 'elif', 'else', or 'end'",
            Self::ElseBranch | Self::ForBlock => "a statement or 'end'",
            Self::ParameterList => "a parameter",
            Self::ArgumentList => "an argument",
        }
    }

    /// Get the recovery tokens appropriate for this context
    pub fn recovery_tokens(&self) -> TokenSet {
        match self {
            Self::TopLevel | Self::Block | Self::IfBlock | Self::ElseBranch | Self::ForBlock => {
                STATEMENT_RECOVERY
            }
            Self::ParameterList => TokenSet::new(&[
                SyntaxKind::R_PAREN,
                SyntaxKind::COMMA,
                SyntaxKind::L_BRACE,
                SyntaxKind::SEMICOLON,
            ]),
            Self::ArgumentList => STATEMENT_RECOVERY.union(TokenSet::new(&[
                SyntaxKind::R_PAREN,
                SyntaxKind::R_BRACKET,
                SyntaxKind::COMMA,
                SyntaxKind::INTERP_END,
            ])),
        }
    }
}
