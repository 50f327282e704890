//! Logos-based lexer for weft
//!
//! Fast tokenization using the logos crate. Every byte of the input ends up
//! in exactly one token (trivia included), so the parser can build a
//! lossless tree.
//!
//! The lexer is modal: a backtick opens a template string, `${` inside it
//! opens a nested code region, and a `}` at depth 0 of that region closes it
//! again. The mode stack plus the current offset is all the state carried
//! across a token boundary, which is what [`LexState`] captures. Resuming
//! from a saved state reproduces exactly the tail a full tokenization would
//! have produced.

use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use unicode_ident::{is_xid_continue, is_xid_start};

use super::keywords;
use super::syntax_kind::SyntaxKind;

/// A token with its kind, position and optional decoded value
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub value: Option<TokenValue>,
}

impl Token {
    pub fn offset(&self) -> TextSize {
        self.range.start()
    }

    pub fn len(&self) -> TextSize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Slice this token's text out of the source it was lexed from.
    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        &source[self.range]
    }
}

/// Decoded literal payload
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    Str(SmolStr),
}

/// One level of the lexer's mode stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexMode {
    /// Ordinary code; `depth` counts open braces inside an interpolation
    Code { depth: u32 },
    /// Inside a backtick template string
    Template,
}

/// Everything needed to restart the lexer at a token boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexState {
    offset: TextSize,
    modes: Vec<LexMode>,
}

impl LexState {
    /// State at the very start of a file.
    pub fn initial() -> Self {
        Self {
            offset: TextSize::new(0),
            modes: vec![LexMode::Code { depth: 0 }],
        }
    }

    /// Absolute offset this state was saved at.
    pub fn offset(&self) -> TextSize {
        self.offset
    }

    pub fn modes(&self) -> &[LexMode] {
        &self.modes
    }

    /// True when no template string or interpolation is open.
    pub fn is_base(&self) -> bool {
        self.modes.len() == 1
    }

    /// Same modes, shifted to a new absolute offset.
    pub(crate) fn shifted(&self, offset: TextSize) -> Self {
        Self {
            offset,
            modes: self.modes.clone(),
        }
    }
}

impl Default for LexState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Restartable lexer over a piece of source text
pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    base: TextSize,
    modes: Vec<LexMode>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::resume(&LexState::initial(), input)
    }

    /// Continue lexing `suffix` from a previously saved state.
    ///
    /// `suffix` must be the source text starting at `state.offset()`; token
    /// ranges are reported in absolute offsets.
    pub fn resume(state: &LexState, suffix: &'a str) -> Self {
        let mut modes = state.modes.clone();
        if modes.is_empty() {
            modes.push(LexMode::Code { depth: 0 });
        }
        Self {
            text: suffix,
            pos: 0,
            base: state.offset,
            modes,
        }
    }

    /// Snapshot the state at the current token boundary.
    pub fn save_state(&self) -> LexState {
        LexState {
            offset: self.base + TextSize::new(self.pos as u32),
            modes: self.modes.clone(),
        }
    }

    fn mode(&self) -> LexMode {
        self.modes.last().copied().unwrap_or(LexMode::Code { depth: 0 })
    }

    fn lex_code(&mut self, rest: &'a str) -> (SyntaxKind, usize, Option<TokenValue>) {
        let mut lex = CodeToken::lexer(rest);
        let result = lex.next();
        let end = lex.span().end;
        let token = match result {
            Some(Ok(token)) => token,
            Some(Err(())) | None => return (SyntaxKind::BAD_TOKEN, bad_len(rest, end), None),
        };
        let text = &rest[..end];

        let kind = match token {
            CodeToken::Ident | CodeToken::UnicodeIdent => {
                keywords::lookup(text).unwrap_or(SyntaxKind::IDENT)
            }
            CodeToken::BlockComment(false) | CodeToken::Str(false) => SyntaxKind::BAD_TOKEN,
            CodeToken::Backtick => {
                self.modes.push(LexMode::Template);
                SyntaxKind::BACKTICK
            }
            CodeToken::LBrace => {
                self.adjust_depth(1);
                SyntaxKind::L_BRACE
            }
            CodeToken::RBrace => {
                if self.modes.len() > 1 && self.mode() == (LexMode::Code { depth: 0 }) {
                    self.modes.pop();
                    SyntaxKind::INTERP_END
                } else {
                    self.adjust_depth(-1);
                    SyntaxKind::R_BRACE
                }
            }
            other => other.into(),
        };

        let value = match kind {
            SyntaxKind::INT_NUMBER => text.parse::<i64>().ok().map(TokenValue::Int),
            SyntaxKind::FLOAT_NUMBER => text.parse::<f64>().ok().map(TokenValue::Float),
            SyntaxKind::STRING => Some(TokenValue::Str(unescape(&text[1..text.len() - 1]))),
            _ => None,
        };

        (kind, end, value)
    }

    fn lex_template(&mut self, rest: &'a str) -> (SyntaxKind, usize, Option<TokenValue>) {
        let mut lex = TemplateToken::lexer(rest);
        let result = lex.next();
        let end = lex.span().end;
        let kind = match result {
            Some(Ok(TemplateToken::Backtick)) => {
                self.modes.pop();
                SyntaxKind::BACKTICK
            }
            Some(Ok(TemplateToken::InterpStart)) => {
                self.modes.push(LexMode::Code { depth: 0 });
                SyntaxKind::INTERP_START
            }
            Some(Ok(TemplateToken::Text | TemplateToken::Dollar | TemplateToken::Escape)) => {
                SyntaxKind::TEMPLATE_TEXT
            }
            Some(Err(())) | None => return (SyntaxKind::BAD_TOKEN, bad_len(rest, end), None),
        };
        (kind, end, None)
    }

    fn adjust_depth(&mut self, delta: i32) {
        if self.modes.len() < 2 {
            return;
        }
        if let Some(LexMode::Code { depth }) = self.modes.last_mut() {
            *depth = depth.saturating_add_signed(delta);
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }

        let (kind, len, value) = match self.mode() {
            LexMode::Code { .. } => self.lex_code(rest),
            LexMode::Template => self.lex_template(rest),
        };

        let start = self.base + TextSize::new(self.pos as u32);
        self.pos += len;
        Some(Token {
            kind,
            range: TextRange::at(start, TextSize::new(len as u32)),
            value,
        })
    }
}

/// Length of an unrecognised run: at least one whole character.
fn bad_len(rest: &str, matched: usize) -> usize {
    let mut end = matched.max(rest.chars().next().map_or(1, char::len_utf8));
    while end < rest.len() && !rest.is_char_boundary(end) {
        end += 1;
    }
    end.min(rest.len())
}

fn unescape(body: &str) -> SmolStr {
    if !body.contains('\\') {
        return SmolStr::new(body);
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    SmolStr::new(out)
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

/// Tokenize the remainder of a file from a saved state
pub fn resume(state: &LexState, suffix: &str) -> Vec<Token> {
    Lexer::resume(state, suffix).collect()
}

/// The state at token boundary `k` of `input` (after `k` tokens).
///
/// Returns `None` if `input` has fewer than `k` tokens.
pub fn save_state_at(input: &str, k: usize) -> Option<LexState> {
    let mut lexer = Lexer::new(input);
    for _ in 0..k {
        lexer.next()?;
    }
    Some(lexer.save_state())
}

// =============================================================================
// Logos token definitions
// =============================================================================

fn ident_tail(lex: &mut logos::Lexer<CodeToken>) {
    let extra: usize = lex
        .remainder()
        .chars()
        .take_while(|c| is_xid_continue(*c))
        .map(char::len_utf8)
        .sum();
    lex.bump(extra);
}

fn unicode_ident(lex: &mut logos::Lexer<CodeToken>) -> bool {
    let starts_ident = lex.slice().chars().next().is_some_and(is_xid_start);
    if starts_ident {
        ident_tail(lex);
    }
    starts_ident
}

/// Returns whether the comment was terminated.
fn block_comment(lex: &mut logos::Lexer<CodeToken>) -> Option<bool> {
    match lex.remainder().find("*/") {
        Some(idx) => {
            lex.bump(idx + 2);
            Some(true)
        }
        None => {
            lex.bump(lex.remainder().len());
            Some(false)
        }
    }
}

/// Returns whether the string was terminated on the same line.
fn string_literal(lex: &mut logos::Lexer<CodeToken>) -> Option<bool> {
    let quote = lex.slice().chars().next()?;
    let mut chars = lex.remainder().char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' => {
                lex.bump(idx);
                return Some(false);
            }
            c if c == quote => {
                lex.bump(idx + c.len_utf8());
                return Some(true);
            }
            _ => {}
        }
    }
    lex.bump(lex.remainder().len());
    Some(false)
}

fn template_escape(lex: &mut logos::Lexer<TemplateToken>) -> bool {
    match lex.remainder().chars().next() {
        Some(c) => {
            lex.bump(c.len_utf8());
            true
        }
        None => false,
    }
}

/// Logos token enum for code mode - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum CodeToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment(bool),

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", ident_tail)]
    Ident,

    #[regex(r"[^\x00-\x7F]", unicode_ident)]
    UnicodeIdent,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Float,

    #[token("\"", string_literal)]
    #[token("'", string_literal)]
    Str(bool),

    #[token("`")]
    Backtick,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("??")]
    QuestionQuestion,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("**")]
    StarStar,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
}

impl From<CodeToken> for SyntaxKind {
    fn from(token: CodeToken) -> Self {
        use CodeToken::*;
        match token {
            Whitespace => SyntaxKind::WHITESPACE,
            LineComment => SyntaxKind::LINE_COMMENT,
            BlockComment(true) => SyntaxKind::BLOCK_COMMENT,
            BlockComment(false) => SyntaxKind::BAD_TOKEN,
            Ident | UnicodeIdent => SyntaxKind::IDENT,
            Integer => SyntaxKind::INT_NUMBER,
            Float => SyntaxKind::FLOAT_NUMBER,
            Str(true) => SyntaxKind::STRING,
            Str(false) => SyntaxKind::BAD_TOKEN,
            Backtick => SyntaxKind::BACKTICK,
            QuestionQuestion => SyntaxKind::QUESTION_QUESTION,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            StarStar => SyntaxKind::STAR_STAR,
            AmpAmp => SyntaxKind::AMP_AMP,
            PipePipe => SyntaxKind::PIPE_PIPE,
            LBrace => SyntaxKind::L_BRACE,
            RBrace => SyntaxKind::R_BRACE,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            LBracket => SyntaxKind::L_BRACKET,
            RBracket => SyntaxKind::R_BRACKET,
            Semicolon => SyntaxKind::SEMICOLON,
            Comma => SyntaxKind::COMMA,
            Dot => SyntaxKind::DOT,
            Colon => SyntaxKind::COLON,
            Question => SyntaxKind::QUESTION,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,
            Bang => SyntaxKind::BANG,
            Pipe => SyntaxKind::PIPE,
        }
    }
}

/// Logos token enum for the inside of a template string
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum TemplateToken {
    #[token("`")]
    Backtick,

    #[token("${")]
    InterpStart,

    #[regex(r"[^`$\\]+")]
    Text,

    #[token("$")]
    Dollar,

    #[token("\\", template_escape)]
    Escape,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_member_call() {
        let tokens = tokenize("a.b(c)");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::DOT,
                SyntaxKind::IDENT,
                SyntaxKind::L_PAREN,
                SyntaxKind::IDENT,
                SyntaxKind::R_PAREN,
            ]
        );
        assert_eq!(tokens[2].text("a.b(c)"), "b");
    }

    #[test]
    fn test_lex_keywords_only_whole_identifiers() {
        assert_eq!(
            kinds("let letter"),
            vec![SyntaxKind::LET_KW, SyntaxKind::WHITESPACE, SyntaxKind::IDENT]
        );
    }

    #[test]
    fn test_lex_unicode_identifier() {
        let tokens = tokenize("café größe");
        assert_eq!(tokens[0].kind, SyntaxKind::IDENT);
        assert_eq!(tokens[0].text("café größe"), "café");
        assert_eq!(tokens[2].kind, SyntaxKind::IDENT);
    }

    #[test]
    fn test_lex_comment_is_retained() {
        assert_eq!(
            kinds("// comment\nlet"),
            vec![SyntaxKind::LINE_COMMENT, SyntaxKind::WHITESPACE, SyntaxKind::LET_KW]
        );
        assert_eq!(kinds("/* a */"), vec![SyntaxKind::BLOCK_COMMENT]);
    }

    #[test]
    fn test_lex_unterminated_block_comment() {
        let tokens = tokenize("a /* never closed");
        assert_eq!(tokens.last().map(|t| t.kind), Some(SyntaxKind::BAD_TOKEN));
        assert_eq!(tokens.last().map(|t| t.range.end()), Some(TextSize::new(17)));
    }

    #[test]
    fn test_lex_numbers_carry_payload() {
        let tokens = tokenize("42 3.5 1..2");
        assert_eq!(tokens[0].value, Some(TokenValue::Int(42)));
        assert_eq!(tokens[2].value, Some(TokenValue::Float(3.5)));
        assert_eq!(tokens[4].kind, SyntaxKind::INT_NUMBER);
        assert_eq!(tokens[5].kind, SyntaxKind::DOT);
        assert_eq!(tokens[6].kind, SyntaxKind::DOT);
    }

    #[test]
    fn test_lex_string_payload_is_unescaped() {
        let tokens = tokenize(r#""a\"b\n""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, SyntaxKind::STRING);
        assert_eq!(tokens[0].value, Some(TokenValue::Str(SmolStr::new("a\"b\n"))));
    }

    #[test]
    fn test_lex_unterminated_string_stops_at_newline() {
        assert_eq!(
            kinds("\"abc\nlet"),
            vec![SyntaxKind::BAD_TOKEN, SyntaxKind::WHITESPACE, SyntaxKind::LET_KW]
        );
    }

    #[test]
    fn test_lex_bad_character_is_a_token() {
        let input = "a @ b";
        let tokens = tokenize(input);
        assert_eq!(tokens[2].kind, SyntaxKind::BAD_TOKEN);
        assert_eq!(tokens[2].text(input), "@");
    }

    #[test]
    fn test_lex_non_identifier_unicode_is_bad_token() {
        let input = "a → b";
        let tokens = tokenize(input);
        assert_eq!(tokens[2].kind, SyntaxKind::BAD_TOKEN);
        assert_eq!(tokens[2].text(input), "→");
    }

    #[test]
    fn test_lex_template_with_interpolation() {
        assert_eq!(
            kinds("`hi ${ {a} } $x`"),
            vec![
                SyntaxKind::BACKTICK,
                SyntaxKind::TEMPLATE_TEXT,
                SyntaxKind::INTERP_START,
                SyntaxKind::WHITESPACE,
                SyntaxKind::L_BRACE,
                SyntaxKind::IDENT,
                SyntaxKind::R_BRACE,
                SyntaxKind::WHITESPACE,
                SyntaxKind::INTERP_END,
                SyntaxKind::TEMPLATE_TEXT,
                SyntaxKind::TEMPLATE_TEXT,
                SyntaxKind::TEMPLATE_TEXT,
                SyntaxKind::BACKTICK,
            ]
        );
    }

    #[test]
    fn test_stray_brace_at_top_level_is_plain() {
        assert_eq!(kinds("}"), vec![SyntaxKind::R_BRACE]);
    }

    #[test]
    fn test_tokens_cover_input() {
        let input = "let s = `a${b}c` /* x */ @ 'q";
        let rebuilt: String = tokenize(input).iter().map(|t| t.text(input)).collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_resume_matches_tail() {
        let input = "let s = `a ${ f(x) } b`;\nfn g() { }";
        let full = tokenize(input);
        for k in 0..=full.len() {
            let state = save_state_at(input, k).expect("boundary exists");
            let suffix = &input[usize::from(state.offset())..];
            assert_eq!(resume(&state, suffix), full[k..].to_vec(), "split at token {k}");
        }
    }

    #[test]
    fn test_state_inside_template_is_not_base() {
        let state = save_state_at("`abc ${x", 3).expect("boundary exists");
        assert!(!state.is_base());
        assert_eq!(state.modes(), &[LexMode::Code { depth: 0 }, LexMode::Template, LexMode::Code { depth: 0 }]);
    }
}
