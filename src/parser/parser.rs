//! Recursive descent parser for weft
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST: every token,
//! trivia and bad input included, lands in the tree exactly once.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};
use text_size::{TextRange, TextSize};
use tokio_util::sync::CancellationToken;

use super::errors::{ErrorCode, SyntaxError};
use super::expectation::ExpectationStack;
use super::grammar::{self, ExpressionParser, ItemParser};
use super::lexer::{self, Token};
use super::syntax_kind::{SyntaxKind, SyntaxNode};
use super::token_set::TokenSet;

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse weft source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens = lexer::tokenize(input);
    parse_tokens(input, &tokens)
}

/// Parse an already tokenized source.
///
/// `tokens` must be the tokenization of `input` (for instance the output of
/// an incremental relex).
pub fn parse_tokens(input: &str, tokens: &[Token]) -> Parse {
    let mut parser = Parser::new(input, tokens, None);
    grammar::parse_source_file(&mut parser);
    parser.finish()
}

/// Parse with cooperative cancellation, polled between items.
///
/// Returns `None` if `cancel` fired before the tree was complete; the
/// partial tree is dropped.
pub fn parse_cancellable(input: &str, tokens: &[Token], cancel: &CancellationToken) -> Option<Parse> {
    let mut parser = Parser::new(input, tokens, Some(cancel));
    grammar::parse_source_file(&mut parser);
    if parser.cancelled {
        tracing::trace!("parse cancelled at token {}", parser.pos);
        return None;
    }
    Some(parser.finish())
}

/// The parser state
struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    expectations: ExpectationStack,
    /// Constructs currently open on the call stack
    depth: usize,
    cancel: Option<&'a CancellationToken>,
    cancelled: bool,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, tokens: &'a [Token], cancel: Option<&'a CancellationToken>) -> Self {
        Self {
            text,
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            expectations: ExpectationStack::new(grammar::CLOSING_TOKENS),
            depth: 0,
            cancel,
            cancelled: false,
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn end_offset(&self) -> TextSize {
        TextSize::of(self.text)
    }

    /// Lexical errors travel with their tokens; report them as they enter the tree.
    fn report_lexical(&mut self, token: &Token) {
        let text = token.text(self.text);
        let (code, message) = match token.kind {
            SyntaxKind::BAD_TOKEN if text.starts_with("/*") => {
                (ErrorCode::E0103, "unterminated block comment".to_string())
            }
            SyntaxKind::BAD_TOKEN if text.starts_with('"') || text.starts_with('\'') => {
                (ErrorCode::E0102, "unterminated string literal".to_string())
            }
            SyntaxKind::BAD_TOKEN => (ErrorCode::E0101, format!("invalid character {:?}", text)),
            SyntaxKind::INT_NUMBER if token.value.is_none() => {
                (ErrorCode::E0104, format!("integer literal {} is out of range", text))
            }
            _ => return,
        };
        self.errors.push(SyntaxError::new(message, token.range, code));
    }
}

impl ExpressionParser for Parser<'_> {
    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn current_range(&self) -> TextRange {
        self.current()
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(self.end_offset()))
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_set(&self, set: TokenSet) -> bool {
        set.contains(self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek_kind(&self, n: usize) -> SyntaxKind {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn get_pos(&self) -> usize {
        self.pos
    }

    fn bump(&mut self) {
        let tokens = self.tokens;
        let Some(token) = tokens.get(self.pos) else {
            return;
        };
        self.report_lexical(token);
        self.builder.token(token.kind.into(), token.text(self.text));
        self.pos += 1;
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().is_some_and(|t| t.kind.is_trivia()) {
            self.bump();
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.builder.checkpoint()
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn enter_nesting(&mut self) -> bool {
        if self.depth >= grammar::MAX_NESTING {
            return false;
        }
        self.depth += 1;
        true
    }

    fn exit_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(SyntaxError::new(message, range, code));
    }

    fn push_error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    /// Record an error and wrap tokens up to the next recovery token in one
    /// ERROR node. Consumes at least one token unless already at a recovery
    /// token or end of input.
    fn error_recover(&mut self, code: ErrorCode, message: impl Into<String>, recovery: TokenSet) {
        // A bad token reports its own lexical error when bumped
        if !self.at(SyntaxKind::BAD_TOKEN) {
            self.error(code, message);
        }
        if self.at_eof() || self.at_set(recovery) {
            return;
        }
        self.builder.start_node(SyntaxKind::ERROR.into());
        self.bump();
        while !self.at_eof() && !self.at_set(recovery) {
            self.bump();
        }
        self.builder.finish_node();
    }
}

impl ItemParser for Parser<'_> {
    fn expectations(&self) -> &ExpectationStack {
        &self.expectations
    }

    fn expectations_mut(&mut self) -> &mut ExpectationStack {
        &mut self.expectations
    }

    fn is_cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancel.is_some_and(CancellationToken::is_cancelled) {
            self.cancelled = true;
        }
        self.cancelled
    }

    fn current_text(&self) -> &str {
        self.current().map(|t| t.text(self.text)).unwrap_or("")
    }
}
