//! Error code definitions for parser diagnostics
//!
//! Error codes follow a naming convention: E{category}{number}
//! - E01xx: Lexical errors (invalid tokens)
//! - E02xx: Structural errors (blocks, delimiters, semicolons)
//! - E03xx: Declaration errors (let, directive, fn, parameters)
//! - E04xx: Expression errors
//! - E05xx: Import errors
//! - E09xx: Generic/fallback errors

use std::fmt;

/// Error codes for parser diagnostics
///
/// Each error code represents a specific category of parse error,
/// enabling filtering, documentation, and IDE integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // E01xx: Lexical errors (invalid tokens)
    // =========================================================================
    /// Invalid or unexpected character in source
    E0101,
    /// Unterminated string literal
    E0102,
    /// Unterminated block comment
    E0103,
    /// Integer literal out of range
    E0104,

    // =========================================================================
    // E02xx: Structural errors (blocks, delimiters, semicolons)
    // =========================================================================
    /// Missing semicolon
    E0201,
    /// Unclosed block (`{`, `if`, `for`)
    E0202,
    /// Unclosed parenthesis `(`
    E0203,
    /// Unclosed bracket `[`
    E0204,
    /// Closing token that does not match the open construct
    E0205,
    /// Unterminated template string
    E0206,
    /// Constructs nested past the parser's depth limit
    E0207,

    // =========================================================================
    // E03xx: Declaration errors
    // =========================================================================
    /// Missing identifier/name
    E0301,
    /// Missing parameter list
    E0302,
    /// Missing body
    E0303,
    /// Invalid parameter
    E0304,
    /// Missing type name after `:`
    E0305,

    // =========================================================================
    // E04xx: Expression errors
    // =========================================================================
    /// Missing operand in expression
    E0402,
    /// Missing `:` in conditional expression
    E0403,
    /// Unclosed call argument list
    E0404,
    /// Missing expression where expected
    E0406,

    // =========================================================================
    // E05xx: Import errors
    // =========================================================================
    /// Invalid import path
    E0501,
    /// Invalid alias declaration
    E0503,

    // =========================================================================
    // E09xx: Generic/fallback errors
    // =========================================================================
    /// Unexpected token in current context
    E0901,
    /// Expected a specific token
    E0902,
}

impl ErrorCode {
    /// Get the string representation of the error code (e.g., "E0201")
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexical
            Self::E0101 => "E0101",
            Self::E0102 => "E0102",
            Self::E0103 => "E0103",
            Self::E0104 => "E0104",
            // Structural
            Self::E0201 => "E0201",
            Self::E0202 => "E0202",
            Self::E0203 => "E0203",
            Self::E0204 => "E0204",
            Self::E0205 => "E0205",
            Self::E0206 => "E0206",
            Self::E0207 => "E0207",
            // Declaration
            Self::E0301 => "E0301",
            Self::E0302 => "E0302",
            Self::E0303 => "E0303",
            Self::E0304 => "E0304",
            Self::E0305 => "E0305",
            // Expression
            Self::E0402 => "E0402",
            Self::E0403 => "E0403",
            Self::E0404 => "E0404",
            Self::E0406 => "E0406",
            // Import
            Self::E0501 => "E0501",
            Self::E0503 => "E0503",
            // Generic
            Self::E0901 => "E0901",
            Self::E0902 => "E0902",
        }
    }

    /// Get a short description of the error category
    pub fn category_description(&self) -> &'static str {
        match self {
            Self::E0101 | Self::E0102 | Self::E0103 | Self::E0104 => "lexical error",
            Self::E0201
            | Self::E0202
            | Self::E0203
            | Self::E0204
            | Self::E0205
            | Self::E0206
            | Self::E0207 => "structural error",
            Self::E0301 | Self::E0302 | Self::E0303 | Self::E0304 | Self::E0305 => "declaration error",
            Self::E0402 | Self::E0403 | Self::E0404 | Self::E0406 => "expression error",
            Self::E0501 | Self::E0503 => "import error",
            Self::E0901 | Self::E0902 => "syntax error",
        }
    }

    /// Get the default message template for this error code
    pub fn default_message(&self) -> &'static str {
        match self {
            // Lexical
            Self::E0101 => "invalid character",
            Self::E0102 => "unterminated string literal",
            Self::E0103 => "unterminated block comment",
            Self::E0104 => "integer literal out of range",
            // Structural
            Self::E0201 => "missing semicolon",
            Self::E0202 => "unclosed block",
            Self::E0203 => "unclosed parenthesis",
            Self::E0204 => "unclosed bracket",
            Self::E0205 => "unexpected closing token",
            Self::E0206 => "unterminated template string",
            Self::E0207 => "nesting too deep",
            // Declaration
            Self::E0301 => "missing identifier",
            Self::E0302 => "missing parameter list",
            Self::E0303 => "missing body",
            Self::E0304 => "invalid parameter",
            Self::E0305 => "missing type name",
            // Expression
            Self::E0402 => "missing operand",
            Self::E0403 => "missing ':' in conditional",
            Self::E0404 => "unclosed function call",
            Self::E0406 => "expected expression",
            // Import
            Self::E0501 => "invalid import path",
            Self::E0503 => "invalid alias",
            // Generic
            Self::E0901 => "unexpected token",
            Self::E0902 => "expected token",
        }
    }

    /// Check if this is a structural error (delimiter-related)
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::E0201
                | Self::E0202
                | Self::E0203
                | Self::E0204
                | Self::E0205
                | Self::E0206
                | Self::E0207
        )
    }

    /// Check if this error was produced by the lexer
    pub fn is_lexical(&self) -> bool {
        matches!(self, Self::E0101 | Self::E0102 | Self::E0103 | Self::E0104)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
