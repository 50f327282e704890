//! High-level IR (HIR): stub trees and the symbol index.
//!
//! Everything here is derived from syntax trees and can be rebuilt from
//! source text at any time.
//!
//! ## Key Types
//!
//! - [`StubTree`] / [`StubNode`] - Index-worthy summary of one file
//! - [`extract`] - Syntax tree → stub tree (pure, deterministic)
//! - [`encode`] / [`decode`] - Versioned binary stub format
//! - [`FileCache`] / [`FileRecord`] - Per-file build results keyed by content hash
//! - [`IndexStore`] - Project-wide name → [`IndexEntry`] map
//! - [`Resolver`] - Name resolution over the index
//!
//! ## Data Flow
//!
//! ```text
//! source text
//!     │  tokenize + parse
//!     ▼
//! SyntaxNode ──extract──▶ StubTree ──encode──▶ blob
//!     │                       │
//!     └──── FileRecord ◀──────┘
//!                │
//!                ▼
//!           IndexStore ◀── Resolver
//! ```

mod cache;
mod codec;
mod extract;
mod index;
mod resolve;
mod stubs;

pub use cache::{FileCache, FileRecord};
pub use codec::{CodecError, FORMAT_VERSION, MAGIC, decode, encode, peek_version};
pub use extract::{ExtractError, MAX_STUB_DEPTH, extract, is_index_worthy, navigate};
pub use index::{IndexEntry, IndexStore, Scope, entries_from_stubs};
pub use resolve::{ResolveResult, Resolver};
pub use stubs::{StubFlags, StubIter, StubNode, StubPath, StubTree};
