//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Token kinds come first and must stay below 128 so they fit in a
//! [`TokenSet`](super::TokenSet).

/// All syntax kinds (tokens and nodes) of the weft grammar
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (declarations, blocks, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,        // identifier
    INT_NUMBER,   // 42
    FLOAT_NUMBER, // 3.14
    STRING,       // "hello" or 'hello'

    // =========================================================================
    // TEMPLATE STRINGS
    // =========================================================================
    BACKTICK,      // `
    TEMPLATE_TEXT, // literal text inside a template string
    INTERP_START,  // ${
    INTERP_END,    // } closing an interpolation

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,           // {
    R_BRACE,           // }
    L_PAREN,           // (
    R_PAREN,           // )
    L_BRACKET,         // [
    R_BRACKET,         // ]
    SEMICOLON,         // ;
    COMMA,             // ,
    DOT,               // .
    COLON,             // :
    QUESTION,          // ?
    QUESTION_QUESTION, // ??
    EQ,                // =
    EQ_EQ,             // ==
    BANG_EQ,           // !=
    LT,                // <
    LT_EQ,             // <=
    GT,                // >
    GT_EQ,             // >=
    PLUS,              // +
    MINUS,             // -
    STAR,              // *
    STAR_STAR,         // **
    SLASH,             // /
    PERCENT,           // %
    BANG,              // !
    AMP_AMP,           // &&
    PIPE_PIPE,         // ||
    PIPE,              // |

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    LET_KW,
    CONST_KW,
    FN_KW,
    DIRECTIVE_KW,
    IMPORT_KW,
    EXPORT_KW,
    AS_KW,
    IF_KW,
    ELIF_KW,
    ELSE_KW,
    FOR_KW,
    IN_KW,
    END_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    AND_KW,
    OR_KW,
    NOT_KW,

    /// Unrecognized input; never aborts lexing
    BAD_TOKEN,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,

    // Declarations
    LET_DECL,
    DIRECTIVE_DECL,
    FN_DECL,
    PARAM_LIST,
    PARAM,
    IMPORT_DECL,
    IMPORT_PATH,
    TYPE_ANNOTATION,
    NAME,
    NAME_REF,

    // Paired constructs
    IF_BLOCK,
    ELIF_CLAUSE,
    ELSE_CLAUSE,
    FOR_BLOCK,
    BLOCK,
    EXPR_STMT,

    // Expressions
    LITERAL,
    PAREN_EXPR,
    ARRAY_EXPR,
    TEMPLATE_EXPR,
    INTERPOLATION,
    PREFIX_EXPR,
    BINARY_EXPR,
    CONDITIONAL_EXPR,
    CALL_EXPR,
    ARG_LIST,
    MEMBER_EXPR,
    INDEX_EXPR,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::LET_KW as u16) && (self as u16) <= (Self::NOT_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::PIPE as u16)
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INT_NUMBER | Self::FLOAT_NUMBER | Self::STRING | Self::TRUE_KW | Self::FALSE_KW | Self::NULL_KW
        )
    }

    /// Check if this kind is a token (leaf) rather than a node
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::BAD_TOKEN as u16)
    }

    /// Convert a raw tag back into a kind, rejecting out-of-range values.
    ///
    /// Used by the stub codec, which must never trust bytes it reads.
    pub fn from_raw(raw: u16) -> Option<Self> {
        if raw < SyntaxKind::__LAST as u16 {
            // Safety: we control all syntax kinds and check bounds above
            Some(unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) })
        } else {
            None
        }
    }
}

/// Human-readable name for a kind, used in diagnostics.
pub fn kind_to_name(kind: SyntaxKind) -> &'static str {
    use SyntaxKind::*;
    match kind {
        WHITESPACE => "whitespace",
        LINE_COMMENT | BLOCK_COMMENT => "comment",
        IDENT => "identifier",
        INT_NUMBER | FLOAT_NUMBER => "number",
        STRING => "string",
        BACKTICK => "'`'",
        TEMPLATE_TEXT => "template text",
        INTERP_START => "'${'",
        INTERP_END => "'}'",
        L_BRACE => "'{'",
        R_BRACE => "'}'",
        L_PAREN => "'('",
        R_PAREN => "')'",
        L_BRACKET => "'['",
        R_BRACKET => "']'",
        SEMICOLON => "';'",
        COMMA => "','",
        DOT => "'.'",
        COLON => "':'",
        QUESTION => "'?'",
        QUESTION_QUESTION => "'??'",
        EQ => "'='",
        EQ_EQ => "'=='",
        BANG_EQ => "'!='",
        LT => "'<'",
        LT_EQ => "'<='",
        GT => "'>'",
        GT_EQ => "'>='",
        PLUS => "'+'",
        MINUS => "'-'",
        STAR => "'*'",
        STAR_STAR => "'**'",
        SLASH => "'/'",
        PERCENT => "'%'",
        BANG => "'!'",
        AMP_AMP => "'&&'",
        PIPE_PIPE => "'||'",
        PIPE => "'|'",
        LET_KW => "'let'",
        CONST_KW => "'const'",
        FN_KW => "'fn'",
        DIRECTIVE_KW => "'directive'",
        IMPORT_KW => "'import'",
        EXPORT_KW => "'export'",
        AS_KW => "'as'",
        IF_KW => "'if'",
        ELIF_KW => "'elif'",
        ELSE_KW => "'else'",
        FOR_KW => "'for'",
        IN_KW => "'in'",
        END_KW => "'end'",
        TRUE_KW => "'true'",
        FALSE_KW => "'false'",
        NULL_KW => "'null'",
        AND_KW => "'and'",
        OR_KW => "'or'",
        NOT_KW => "'not'",
        BAD_TOKEN => "invalid input",
        SOURCE_FILE => "source file",
        LET_DECL => "let declaration",
        DIRECTIVE_DECL => "directive",
        FN_DECL => "function",
        PARAM_LIST => "parameter list",
        PARAM => "parameter",
        IMPORT_DECL => "import",
        IMPORT_PATH => "import path",
        TYPE_ANNOTATION => "type annotation",
        NAME => "name",
        NAME_REF => "name reference",
        IF_BLOCK => "if block",
        ELIF_CLAUSE => "elif clause",
        ELSE_CLAUSE => "else clause",
        FOR_BLOCK => "for block",
        BLOCK => "block",
        EXPR_STMT => "expression statement",
        LITERAL => "literal",
        PAREN_EXPR | ARRAY_EXPR | TEMPLATE_EXPR | INTERPOLATION | PREFIX_EXPR | BINARY_EXPR
        | CONDITIONAL_EXPR | CALL_EXPR | ARG_LIST | MEMBER_EXPR | INDEX_EXPR => "expression",
        ERROR => "error",
        __LAST => "<end>",
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeftLanguage {}

impl rowan::Language for WeftLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<WeftLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<WeftLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<WeftLanguage>;
