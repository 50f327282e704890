//! Expression parsing for weft
//!
//! Precedence climbing over a static operator table. Binary operators bind
//! by the table below, prefix operators bind tighter than everything except
//! `**`, and postfix forms (call, member access, indexing) bind tightest.
//!
//! ```text
//! 1  |            left     6  == !=              left
//! 2  ? :          right    7  < <= > >= in       left
//! 3  ??           left     8  + -                left
//! 4  || or        left     9  * / %              left
//! 5  && and       left     10 **                 right
//! ```

use rowan::Checkpoint;
use text_size::TextRange;

use crate::parser::errors::{ErrorCode, ParseContext, SyntaxError};
use crate::parser::syntax_kind::SyntaxKind;
use crate::parser::token_set::TokenSet;

/// Trait for expression parsing operations
///
/// This trait defines the interface between the expression grammar and the
/// main parser. The main parser implements it to provide token access and
/// tree building.
pub trait ExpressionParser {
    // Token inspection
    fn current_kind(&self) -> SyntaxKind;
    fn current_range(&self) -> TextRange;
    fn at(&self, kind: SyntaxKind) -> bool;
    fn at_set(&self, set: TokenSet) -> bool;
    fn at_eof(&self) -> bool;

    /// Peek at the kind of the nth token ahead (skipping trivia)
    fn peek_kind(&self, n: usize) -> SyntaxKind;

    fn get_pos(&self) -> usize;

    // Token consumption
    fn bump(&mut self);
    fn eat(&mut self, kind: SyntaxKind) -> bool;
    fn skip_trivia(&mut self);

    // Nesting
    /// Open one more nested construct; false once [`MAX_NESTING`] are open.
    fn enter_nesting(&mut self) -> bool;
    fn exit_nesting(&mut self);

    // Node building
    fn start_node(&mut self, kind: SyntaxKind);
    fn finish_node(&mut self);
    fn checkpoint(&mut self) -> Checkpoint;
    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind);

    // Errors
    fn error(&mut self, code: ErrorCode, message: impl Into<String>);
    fn push_error(&mut self, error: SyntaxError);
    fn error_recover(&mut self, code: ErrorCode, message: impl Into<String>, recovery: TokenSet);
}

/// How many blocks and subexpressions may be open at once. Anything deeper
/// is kept as a single ERROR node instead of being parsed.
pub const MAX_NESTING: usize = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Binary operators: (token, precedence, associativity)
pub static INFIX_OPERATORS: &[(SyntaxKind, u8, Assoc)] = &[
    (SyntaxKind::PIPE, 1, Assoc::Left),
    (SyntaxKind::QUESTION, 2, Assoc::Right),
    (SyntaxKind::QUESTION_QUESTION, 3, Assoc::Left),
    (SyntaxKind::PIPE_PIPE, 4, Assoc::Left),
    (SyntaxKind::OR_KW, 4, Assoc::Left),
    (SyntaxKind::AMP_AMP, 5, Assoc::Left),
    (SyntaxKind::AND_KW, 5, Assoc::Left),
    (SyntaxKind::EQ_EQ, 6, Assoc::Left),
    (SyntaxKind::BANG_EQ, 6, Assoc::Left),
    (SyntaxKind::LT, 7, Assoc::Left),
    (SyntaxKind::LT_EQ, 7, Assoc::Left),
    (SyntaxKind::GT, 7, Assoc::Left),
    (SyntaxKind::GT_EQ, 7, Assoc::Left),
    (SyntaxKind::IN_KW, 7, Assoc::Left),
    (SyntaxKind::PLUS, 8, Assoc::Left),
    (SyntaxKind::MINUS, 8, Assoc::Left),
    (SyntaxKind::STAR, 9, Assoc::Left),
    (SyntaxKind::SLASH, 9, Assoc::Left),
    (SyntaxKind::PERCENT, 9, Assoc::Left),
    (SyntaxKind::STAR_STAR, 10, Assoc::Right),
];

pub const PREFIX_OPERATORS: TokenSet = TokenSet::new(&[
    SyntaxKind::MINUS,
    SyntaxKind::PLUS,
    SyntaxKind::BANG,
    SyntaxKind::NOT_KW,
]);

/// Sits between `* / %` (18/19) and `**` (20/20).
const PREFIX_BINDING_POWER: u8 = 19;

const LITERALS: TokenSet = TokenSet::new(&[
    SyntaxKind::INT_NUMBER,
    SyntaxKind::FLOAT_NUMBER,
    SyntaxKind::STRING,
    SyntaxKind::TRUE_KW,
    SyntaxKind::FALSE_KW,
    SyntaxKind::NULL_KW,
]);

/// Tokens that can begin an expression
pub const EXPR_FIRST: TokenSet = LITERALS.union(PREFIX_OPERATORS).union(TokenSet::new(&[
    SyntaxKind::IDENT,
    SyntaxKind::L_PAREN,
    SyntaxKind::L_BRACKET,
    SyntaxKind::BACKTICK,
]));

/// (left, right) binding power of a binary operator.
///
/// Left-associative operators bind one tighter on the right, so an equal
/// operator to the right stops the inner loop.
pub fn infix_binding_power(kind: SyntaxKind) -> Option<(u8, u8)> {
    INFIX_OPERATORS
        .iter()
        .find(|(op, _, _)| *op == kind)
        .map(|(_, prec, assoc)| {
            let left = prec * 2;
            match assoc {
                Assoc::Left => (left, left + 1),
                Assoc::Right => (left, left),
            }
        })
}

/// Parse an expression, returning true if any tokens were consumed
pub fn parse_expression<P: ExpressionParser>(p: &mut P) -> bool {
    expr_bp(p, 0)
}

fn expr_bp<P: ExpressionParser>(p: &mut P, min_bp: u8) -> bool {
    p.skip_trivia();
    if !p.enter_nesting() {
        if !p.at_set(EXPR_FIRST) {
            return false;
        }
        skip_too_deep(p);
        return true;
    }
    let parsed = expr_bp_nested(p, min_bp);
    p.exit_nesting();
    parsed
}

fn expr_bp_nested<P: ExpressionParser>(p: &mut P, min_bp: u8) -> bool {
    let checkpoint = p.checkpoint();
    if !parse_prefix_or_primary(p) {
        return false;
    }
    parse_postfix(p, checkpoint);

    loop {
        let op = p.peek_kind(0);
        let Some((left_bp, right_bp)) = infix_binding_power(op) else {
            break;
        };
        if left_bp < min_bp {
            break;
        }
        p.skip_trivia();

        if op == SyntaxKind::QUESTION {
            p.start_node_at(checkpoint, SyntaxKind::CONDITIONAL_EXPR);
            p.bump();
            if !parse_expression(p) {
                p.error(ErrorCode::E0406, "expected expression after '?'");
            }
            if p.peek_kind(0) == SyntaxKind::COLON {
                p.skip_trivia();
                p.bump();
                if !expr_bp(p, right_bp) {
                    p.error(ErrorCode::E0402, "expected expression after ':'");
                }
            } else {
                p.error(ErrorCode::E0403, "expected ':' in conditional expression");
            }
            p.finish_node();
            continue;
        }

        p.start_node_at(checkpoint, SyntaxKind::BINARY_EXPR);
        p.bump();
        if !expr_bp(p, right_bp) {
            p.error(ErrorCode::E0402, "expected right-hand operand");
        }
        p.finish_node();
    }
    true
}

fn parse_prefix_or_primary<P: ExpressionParser>(p: &mut P) -> bool {
    if p.at_set(PREFIX_OPERATORS) {
        p.start_node(SyntaxKind::PREFIX_EXPR);
        p.bump();
        if !expr_bp(p, PREFIX_BINDING_POWER) {
            p.error(ErrorCode::E0402, "expected operand after prefix operator");
        }
        p.finish_node();
        return true;
    }
    parse_primary(p)
}

/// PrimaryExpression = Literal | NameRef | '(' Expr ')' | '[' Args ']' | Template
fn parse_primary<P: ExpressionParser>(p: &mut P) -> bool {
    match p.current_kind() {
        kind if LITERALS.contains(kind) => {
            p.start_node(SyntaxKind::LITERAL);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::IDENT => {
            p.start_node(SyntaxKind::NAME_REF);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::L_PAREN => {
            let opener = p.current_range();
            p.start_node(SyntaxKind::PAREN_EXPR);
            p.bump();
            if !parse_expression(p) {
                p.error(ErrorCode::E0406, "expected expression inside parentheses");
            }
            p.skip_trivia();
            close_delimiter(p, SyntaxKind::R_PAREN, ErrorCode::E0203, opener);
            p.finish_node();
        }
        SyntaxKind::L_BRACKET => {
            let opener = p.current_range();
            p.start_node(SyntaxKind::ARRAY_EXPR);
            p.bump();
            parse_comma_separated(p, SyntaxKind::R_BRACKET);
            p.skip_trivia();
            close_delimiter(p, SyntaxKind::R_BRACKET, ErrorCode::E0204, opener);
            p.finish_node();
        }
        SyntaxKind::BACKTICK => parse_template(p),
        _ => return false,
    }
    true
}

/// Postfix forms wrap everything parsed since `checkpoint`.
fn parse_postfix<P: ExpressionParser>(p: &mut P, checkpoint: Checkpoint) {
    loop {
        match p.peek_kind(0) {
            SyntaxKind::DOT => {
                p.skip_trivia();
                p.start_node_at(checkpoint, SyntaxKind::MEMBER_EXPR);
                p.bump();
                p.skip_trivia();
                if p.at(SyntaxKind::IDENT) {
                    p.start_node(SyntaxKind::NAME_REF);
                    p.bump();
                    p.finish_node();
                } else {
                    p.error(ErrorCode::E0301, "expected member name after '.'");
                }
                p.finish_node();
            }
            SyntaxKind::L_PAREN => {
                p.skip_trivia();
                p.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
                parse_arg_list(p);
                p.finish_node();
            }
            SyntaxKind::L_BRACKET => {
                p.skip_trivia();
                let opener = p.current_range();
                p.start_node_at(checkpoint, SyntaxKind::INDEX_EXPR);
                p.bump();
                if !parse_expression(p) {
                    p.error(ErrorCode::E0406, "expected index expression");
                }
                p.skip_trivia();
                close_delimiter(p, SyntaxKind::R_BRACKET, ErrorCode::E0204, opener);
                p.finish_node();
            }
            _ => break,
        }
    }
}

/// ArgList = '(' (Expr (',' Expr)* ','?)? ')'
fn parse_arg_list<P: ExpressionParser>(p: &mut P) {
    let opener = p.current_range();
    p.start_node(SyntaxKind::ARG_LIST);
    p.bump();
    parse_comma_separated(p, SyntaxKind::R_PAREN);
    p.skip_trivia();
    close_delimiter(p, SyntaxKind::R_PAREN, ErrorCode::E0404, opener);
    p.finish_node();
}

fn parse_comma_separated<P: ExpressionParser>(p: &mut P, closer: SyntaxKind) {
    let recovery = ParseContext::ArgumentList.recovery_tokens();
    loop {
        p.skip_trivia();
        if p.at(closer) || p.at_eof() {
            break;
        }
        if !parse_expression(p) {
            if p.at_set(recovery) {
                break;
            }
            p.error_recover(ErrorCode::E0406, "expected an argument", recovery);
        }
        if p.peek_kind(0) != SyntaxKind::COMMA {
            break;
        }
        p.skip_trivia();
        p.bump();
    }
}

fn close_delimiter<P: ExpressionParser>(p: &mut P, closer: SyntaxKind, code: ErrorCode, opener: TextRange) {
    if p.eat(closer) {
        return;
    }
    let error = SyntaxError::builder(code)
        .range(p.current_range())
        .related("opened here", opener)
        .build();
    p.push_error(error);
}

/// Template = '`' (TEMPLATE_TEXT | Interpolation)* '`'
fn parse_template<P: ExpressionParser>(p: &mut P) {
    let opener = p.current_range();
    p.start_node(SyntaxKind::TEMPLATE_EXPR);
    p.bump();
    loop {
        match p.current_kind() {
            SyntaxKind::BACKTICK => {
                p.bump();
                break;
            }
            SyntaxKind::INTERP_START => parse_interpolation(p),
            _ if p.at_eof() => {
                let error = SyntaxError::builder(ErrorCode::E0206)
                    .range(p.current_range())
                    .hint("add '`' to close the template string")
                    .related("template string starts here", opener)
                    .build();
                p.push_error(error);
                break;
            }
            _ => p.bump(),
        }
    }
    p.finish_node();
}

/// Interpolation = '${' Expr '}'
fn parse_interpolation<P: ExpressionParser>(p: &mut P) {
    p.start_node(SyntaxKind::INTERPOLATION);
    p.bump();
    if !parse_expression(p) {
        p.error(ErrorCode::E0406, "expected expression in interpolation");
    }
    p.skip_trivia();
    if !p.at(SyntaxKind::INTERP_END) && !p.at_eof() {
        skip_to_interpolation_end(p);
    }
    p.eat(SyntaxKind::INTERP_END);
    p.finish_node();
}

/// Wrap leftover tokens up to the matching `}` in one ERROR node, stepping
/// over nested interpolations.
fn skip_to_interpolation_end<P: ExpressionParser>(p: &mut P) {
    p.error(ErrorCode::E0901, "unexpected tokens in interpolation");
    p.start_node(SyntaxKind::ERROR);
    let mut depth = 0u32;
    while !p.at_eof() {
        match p.current_kind() {
            SyntaxKind::INTERP_START => depth += 1,
            SyntaxKind::INTERP_END if depth == 0 => break,
            SyntaxKind::INTERP_END => depth -= 1,
            _ => {}
        }
        p.bump();
    }
    p.finish_node();
}

const NESTING_OPENERS: TokenSet = TokenSet::new(&[
    SyntaxKind::L_PAREN,
    SyntaxKind::L_BRACKET,
    SyntaxKind::L_BRACE,
    SyntaxKind::INTERP_START,
    SyntaxKind::IF_KW,
    SyntaxKind::FOR_KW,
]);

const NESTING_CLOSERS: TokenSet = TokenSet::new(&[
    SyntaxKind::R_PAREN,
    SyntaxKind::R_BRACKET,
    SyntaxKind::R_BRACE,
    SyntaxKind::INTERP_END,
    SyntaxKind::END_KW,
]);

/// Where a skip that did not start on an opener stops
const NESTING_STOPS: TokenSet = NESTING_CLOSERS.union(TokenSet::new(&[
    SyntaxKind::ELIF_KW,
    SyntaxKind::ELSE_KW,
    SyntaxKind::SEMICOLON,
]));

/// Wrap a construct that would open past [`MAX_NESTING`] in one ERROR node
/// without descending into it.
///
/// Starting on an opener (a bracket, `if`, `for` or a template), the skip
/// runs through the matching closer. Otherwise it runs up to the first
/// unmatched closer or `;`. Closers are counted flat, so a mismatched pair
/// still balances; end of input always stops it.
pub fn skip_too_deep<P: ExpressionParser>(p: &mut P) {
    p.error(
        ErrorCode::E0207,
        format!("nesting exceeds {} levels; the rest of this construct is not parsed", MAX_NESTING),
    );
    let balanced = p.at_set(NESTING_OPENERS) || p.at(SyntaxKind::BACKTICK);
    let mut open: Vec<SyntaxKind> = Vec::new();
    p.start_node(SyntaxKind::ERROR);
    while !p.at_eof() {
        let kind = p.current_kind();
        if !balanced && open.is_empty() && NESTING_STOPS.contains(kind) {
            break;
        }
        match kind {
            // Inside a template, a backtick can only close it
            SyntaxKind::BACKTICK if open.last() == Some(&SyntaxKind::BACKTICK) => {
                open.pop();
            }
            SyntaxKind::BACKTICK => open.push(kind),
            _ if NESTING_OPENERS.contains(kind) => open.push(kind),
            _ if NESTING_CLOSERS.contains(kind) => {
                open.pop();
            }
            _ => {}
        }
        p.bump();
        if balanced && open.is_empty() {
            break;
        }
    }
    p.finish_node();
}
