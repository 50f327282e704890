//! Parser error handling module
//!
//! This module provides error handling for the weft parser:
//! - Categorized error codes for filtering and documentation
//! - Context-aware error messages
//! - Suggestions/hints for common mistakes
//! - Related span tracking (e.g., "opened here" for unclosed blocks)

mod codes;
mod context;
mod error;

pub use codes::ErrorCode;
pub use context::{ParseContext, STATEMENT_RECOVERY};
pub use error::{RelatedInfo, SyntaxError, SyntaxErrorBuilder, context_message};
