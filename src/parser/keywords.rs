//! Keyword table.
//!
//! Identifiers are lexed first and then looked up here, so a keyword is only
//! recognised when it spans a whole identifier (`letter` stays an identifier).

use super::SyntaxKind;

/// All reserved words of the grammar, in source spelling.
pub const KEYWORDS: &[(&str, SyntaxKind)] = &[
    ("let", SyntaxKind::LET_KW),
    ("const", SyntaxKind::CONST_KW),
    ("fn", SyntaxKind::FN_KW),
    ("directive", SyntaxKind::DIRECTIVE_KW),
    ("import", SyntaxKind::IMPORT_KW),
    ("export", SyntaxKind::EXPORT_KW),
    ("as", SyntaxKind::AS_KW),
    ("if", SyntaxKind::IF_KW),
    ("elif", SyntaxKind::ELIF_KW),
    ("else", SyntaxKind::ELSE_KW),
    ("for", SyntaxKind::FOR_KW),
    ("in", SyntaxKind::IN_KW),
    ("end", SyntaxKind::END_KW),
    ("true", SyntaxKind::TRUE_KW),
    ("false", SyntaxKind::FALSE_KW),
    ("null", SyntaxKind::NULL_KW),
    ("and", SyntaxKind::AND_KW),
    ("or", SyntaxKind::OR_KW),
    ("not", SyntaxKind::NOT_KW),
];

/// Look up the keyword kind for an identifier's text.
pub fn lookup(text: &str) -> Option<SyntaxKind> {
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == text)
        .map(|(_, kind)| *kind)
}
