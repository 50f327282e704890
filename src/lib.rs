//! # weft-base
//!
//! Language-agnostic front-end and incremental symbol index for the weft
//! directive/template language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Project session: submit, query, persisted stub cache
//!   ↓
//! hir       → Stub trees, stub codec, file cache, index store, resolver
//!   ↓
//! parser    → Logos lexer, relexer, rowan parser, typed AST, syntax errors
//!   ↓
//! base      → Primitives (FileId, ContentHash, Name interning, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → hir → project)
// ============================================================================

/// Foundation types: FileId, ContentHash, Name interning, TextRange
pub mod base;

/// Parser: logos lexer, recursive-descent + Pratt parser, typed AST
pub mod parser;

/// High-level IR: stubs, codec, file cache, index, resolver
pub mod hir;

/// Project sessions: submit/query, parallel builds, persisted cache
pub mod project;

// Re-export commonly needed items
pub use parser::keywords;

// Re-export foundation types
pub use base::{ContentHash, FileId, Interner, Name, TextRange, TextSize};

pub use hir::{IndexEntry, Scope, StubFlags, StubNode, StubPath, StubTree};
pub use parser::{Parse, SyntaxKind, SyntaxNode, parse, tokenize};
pub use project::{Project, ProjectConfig, ProjectError, SubmitOutcome};
