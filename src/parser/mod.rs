//! Lossless, error-recovering parser for weft
//!
//! This module provides the syntax layer using:
//! - **logos** for fast, restartable lexing
//! - **rowan** for the CST (Concrete Syntax Tree)
//!
//! Every byte of the input lands in the tree exactly once, whitespace,
//! comments and bad input included. Errors are collected on the side.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos, modal) → Tokens with SyntaxKind, checkpoints via LexState
//!     ↓
//! Parser (recursive descent + Pratt, expectation stack) → GreenNode tree
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! AST layer → Typed wrappers over SyntaxNode
//!     ↓
//! HIR → Stub trees and the symbol index
//! ```
//!
//! ## Incremental Relexing
//!
//! When text changes, [`relex::relex`] resumes lexing from the last saved
//! [`LexState`] before the edit and splices the unchanged tail back in as
//! soon as the lexer state converges.

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
pub mod errors;
pub mod expectation;
pub mod grammar;
pub mod keywords;
pub mod lexer;
pub mod relex;
mod syntax_kind;
pub mod token_set;

pub use errors::{ErrorCode, ParseContext, SyntaxError};
pub use expectation::ExpectationStack;
pub use lexer::{LexMode, LexState, Lexer, Token, TokenValue, tokenize};
pub use parser::{Parse, parse, parse_cancellable, parse_tokens};
pub use relex::{LexedText, TextEdit};
pub use syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, WeftLanguage, kind_to_name};
pub use token_set::TokenSet;

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
