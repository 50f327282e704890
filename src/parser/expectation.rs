//! Expectation stack for paired block constructs
//!
//! Opening a construct (`if`, `for`, `{`) pushes the token kinds allowed to
//! close it. A closing token is accepted only when the innermost entry lists
//! it; any other closing token is stray and gets reported by the parser
//! without popping anything. The grammar supplies the universe of closing
//! tokens, so one stack serves every paired construct.

use text_size::TextRange;

use super::errors::ParseContext;
use super::syntax_kind::SyntaxKind;
use super::token_set::TokenSet;

/// One open construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    /// Tokens that may close (or continue) this construct
    pub closers: TokenSet,
    pub context: ParseContext,
    /// Keyword or brace that opened the construct
    pub opener_kind: SyntaxKind,
    pub opener: TextRange,
}

/// How the stack classifies a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// Closes (or continues) the innermost construct
    Accepted,
    /// A closing token the innermost construct does not accept
    Stray,
    /// Not a closing token at all
    NotCloser,
}

#[derive(Debug, Clone)]
pub struct ExpectationStack {
    closing: TokenSet,
    entries: Vec<Expectation>,
}

impl ExpectationStack {
    /// Create an empty stack for a grammar whose closing tokens are `closing`.
    pub fn new(closing: TokenSet) -> Self {
        Self {
            closing,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, closers: TokenSet, context: ParseContext, opener_kind: SyntaxKind, opener: TextRange) {
        self.entries.push(Expectation {
            closers,
            context,
            opener_kind,
            opener,
        });
    }

    pub fn pop(&mut self) -> Option<Expectation> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<&Expectation> {
        self.entries.last()
    }

    /// Narrow the innermost construct, e.g. after `else` only `end` may follow.
    pub fn replace_top(&mut self, closers: TokenSet, context: ParseContext) {
        if let Some(top) = self.entries.last_mut() {
            top.closers = closers;
            top.context = context;
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Context of the innermost construct, or top level.
    pub fn context(&self) -> ParseContext {
        self.top().map_or(ParseContext::TopLevel, |e| e.context)
    }

    pub fn classify(&self, kind: SyntaxKind) -> Closing {
        if !self.closing.contains(kind) {
            return Closing::NotCloser;
        }
        match self.top() {
            Some(top) if top.closers.contains(kind) => Closing::Accepted,
            _ => Closing::Stray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_size::TextSize;

    const CLOSING: TokenSet = TokenSet::new(&[
        SyntaxKind::R_BRACE,
        SyntaxKind::END_KW,
        SyntaxKind::ELSE_KW,
    ]);

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    #[test]
    fn test_empty_stack_treats_closers_as_stray() {
        let stack = ExpectationStack::new(CLOSING);
        assert_eq!(stack.classify(SyntaxKind::END_KW), Closing::Stray);
        assert_eq!(stack.classify(SyntaxKind::IDENT), Closing::NotCloser);
        assert_eq!(stack.context(), ParseContext::TopLevel);
    }

    #[test]
    fn test_only_innermost_entry_accepts() {
        let mut stack = ExpectationStack::new(CLOSING);
        stack.push(
            TokenSet::new(&[SyntaxKind::END_KW, SyntaxKind::ELSE_KW]),
            ParseContext::IfBlock,
            SyntaxKind::IF_KW,
            range(0, 2),
        );
        stack.push(TokenSet::new(&[SyntaxKind::R_BRACE]), ParseContext::Block, SyntaxKind::L_BRACE, range(5, 6));

        assert_eq!(stack.classify(SyntaxKind::END_KW), Closing::Stray);
        assert_eq!(stack.classify(SyntaxKind::R_BRACE), Closing::Accepted);

        let block = stack.pop().expect("block entry");
        assert_eq!(block.opener, range(5, 6));
        assert_eq!(stack.classify(SyntaxKind::END_KW), Closing::Accepted);
    }

    #[test]
    fn test_replace_top_narrows_closers() {
        let mut stack = ExpectationStack::new(CLOSING);
        stack.push(
            TokenSet::new(&[SyntaxKind::END_KW, SyntaxKind::ELSE_KW]),
            ParseContext::IfBlock,
            SyntaxKind::IF_KW,
            range(0, 2),
        );
        stack.replace_top(TokenSet::new(&[SyntaxKind::END_KW]), ParseContext::ElseBranch);

        assert_eq!(stack.classify(SyntaxKind::ELSE_KW), Closing::Stray);
        assert_eq!(stack.context(), ParseContext::ElseBranch);
        assert_eq!(stack.top().map(|e| e.opener_kind), Some(SyntaxKind::IF_KW));
        assert_eq!(stack.depth(), 1);
    }
}
