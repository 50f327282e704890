//! Statement-level grammar for weft
//!
//! Recursive descent over declarations, imports and paired block constructs.
//! `if`/`elif`/`else`/`end`, `for`/`end` and `{`/`}` all go through the
//! parser's [`ExpectationStack`], so a closer that belongs to an outer
//! construct is reported once and never unwinds the inner one.

use crate::parser::errors::{ErrorCode, ParseContext, STATEMENT_RECOVERY, SyntaxError, context_message};
use crate::parser::expectation::{Closing, ExpectationStack};
use crate::parser::syntax_kind::{SyntaxKind, kind_to_name};
use crate::parser::token_set::TokenSet;

use super::expressions::{EXPR_FIRST, ExpressionParser, parse_expression, skip_too_deep};

/// Tokens that close (or continue) a paired construct
pub const CLOSING_TOKENS: TokenSet = TokenSet::new(&[
    SyntaxKind::R_BRACE,
    SyntaxKind::END_KW,
    SyntaxKind::ELIF_KW,
    SyntaxKind::ELSE_KW,
]);

const IF_CLOSERS: TokenSet = TokenSet::new(&[SyntaxKind::ELIF_KW, SyntaxKind::ELSE_KW, SyntaxKind::END_KW]);
const END_ONLY: TokenSet = TokenSet::new(&[SyntaxKind::END_KW]);
const BRACE_CLOSER: TokenSet = TokenSet::new(&[SyntaxKind::R_BRACE]);

/// Trait for statement-level parsing on top of [`ExpressionParser`]
pub trait ItemParser: ExpressionParser {
    fn expectations(&self) -> &ExpectationStack;
    fn expectations_mut(&mut self) -> &mut ExpectationStack;

    /// Poll for cancellation; once true, stays true.
    fn is_cancelled(&mut self) -> bool;

    /// Current token's text, used in messages
    fn current_text(&self) -> &str;
}

/// SourceFile = Item*
pub fn parse_source_file<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::SOURCE_FILE);
    parse_items(p);
    p.skip_trivia();
    // Anything left over (only possible after cancellation) still belongs in the tree
    while !p.at_eof() {
        p.bump();
    }
    p.finish_node();
}

/// Parse items until end of input or a closer the innermost construct accepts.
pub fn parse_items<P: ItemParser>(p: &mut P) {
    loop {
        p.skip_trivia();
        if p.at_eof() || p.is_cancelled() {
            break;
        }
        match p.expectations().classify(p.current_kind()) {
            Closing::Accepted => break,
            Closing::Stray => {
                stray_closer(p);
                continue;
            }
            Closing::NotCloser => {}
        }

        let pos_before = p.get_pos();
        parse_item(p);
        // Safety: if we didn't make progress, force-skip a token
        if p.get_pos() == pos_before && !p.at_eof() {
            p.error(ErrorCode::E0901, format!("unexpected {}", kind_to_name(p.current_kind())));
            p.start_node(SyntaxKind::ERROR);
            p.bump();
            p.finish_node();
        }
    }
}

/// Item = LetDecl | Directive | FnDecl | Import | IfBlock | ForBlock | Block | ExprStmt
pub fn parse_item<P: ItemParser>(p: &mut P) {
    match p.current_kind() {
        SyntaxKind::EXPORT_KW => match p.peek_kind(1) {
            SyntaxKind::LET_KW | SyntaxKind::CONST_KW => parse_let_decl(p),
            SyntaxKind::DIRECTIVE_KW => parse_directive(p),
            SyntaxKind::FN_KW => parse_fn_decl(p),
            _ => {
                p.error(
                    ErrorCode::E0901,
                    "'export' must be followed by 'let', 'const', 'directive' or 'fn'",
                );
                p.start_node(SyntaxKind::ERROR);
                p.bump();
                p.finish_node();
            }
        },
        SyntaxKind::LET_KW | SyntaxKind::CONST_KW => parse_let_decl(p),
        SyntaxKind::DIRECTIVE_KW => parse_directive(p),
        SyntaxKind::FN_KW => parse_fn_decl(p),
        SyntaxKind::IMPORT_KW => parse_import(p),
        SyntaxKind::IF_KW => parse_if_block(p),
        SyntaxKind::FOR_KW => parse_for_block(p),
        SyntaxKind::L_BRACE => parse_block(p),
        // Empty statement
        SyntaxKind::SEMICOLON => p.bump(),
        kind if EXPR_FIRST.contains(kind) => parse_expr_stmt(p),
        _ => {
            let found = describe_current(p);
            let message = context_message(&found, p.expectations().context());
            p.error_recover(ErrorCode::E0901, message, STATEMENT_RECOVERY);
        }
    }
}

/// A closing token the innermost construct does not accept: one error, one
/// ERROR node, nothing popped.
fn stray_closer<P: ItemParser>(p: &mut P) {
    let found = describe_current(p);
    let mut builder = SyntaxError::builder(ErrorCode::E0205)
        .message(format!("unexpected {}", found))
        .range(p.current_range());
    if let Some(open) = p.expectations().top() {
        let expected: Vec<_> = open.closers.iter().map(kind_to_name).collect();
        builder = builder
            .hint(format!("expected {}", expected.join(" or ")))
            .related(format!("{} opened here", kind_to_name(open.opener_kind)), open.opener);
    }
    p.push_error(builder.build());
    p.start_node(SyntaxKind::ERROR);
    p.bump();
    p.finish_node();
}

fn describe_current<P: ItemParser>(p: &P) -> String {
    match p.current_kind() {
        SyntaxKind::IDENT => format!("identifier '{}'", p.current_text()),
        kind => kind_to_name(kind).to_string(),
    }
}

/// Pop the innermost construct at end of input and report it as unclosed.
fn report_unclosed<P: ItemParser>(p: &mut P, closer_hint: &str) {
    let cancelled = p.is_cancelled();
    let Some(open) = p.expectations_mut().pop() else {
        return;
    };
    if cancelled {
        return;
    }
    let error = SyntaxError::builder(ErrorCode::E0202)
        .message(format!("{} is never closed", kind_to_name(open.opener_kind)))
        .range(p.current_range())
        .hint(format!("add {} to close it", closer_hint))
        .related("opened here", open.opener)
        .build();
    p.push_error(error);
}

/// Name = IDENT
fn parse_name<P: ItemParser>(p: &mut P, code: ErrorCode, message: &str) -> bool {
    if p.at(SyntaxKind::IDENT) {
        p.start_node(SyntaxKind::NAME);
        p.bump();
        p.finish_node();
        true
    } else {
        p.error(code, message);
        false
    }
}

/// TypeAnnotation = ':' NameRef
fn parse_type_annotation<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::TYPE_ANNOTATION);
    p.bump();
    p.skip_trivia();
    if p.at(SyntaxKind::IDENT) {
        p.start_node(SyntaxKind::NAME_REF);
        p.bump();
        p.finish_node();
    } else {
        p.error(ErrorCode::E0305, "expected type name after ':'");
    }
    p.finish_node();
}

/// `= expr` initializer or default value
fn parse_initializer<P: ItemParser>(p: &mut P) {
    p.skip_trivia();
    p.bump();
    if !parse_expression(p) {
        p.error(ErrorCode::E0406, "expected expression after '='");
    }
}

fn expect_semicolon<P: ItemParser>(p: &mut P, after: &str) {
    p.skip_trivia();
    if p.eat(SyntaxKind::SEMICOLON) {
        return;
    }
    let message = format!("expected ';' after {}", after);
    if p.at_eof() || p.at_set(STATEMENT_RECOVERY) {
        p.error(ErrorCode::E0201, message);
        return;
    }
    p.error_recover(ErrorCode::E0201, message, STATEMENT_RECOVERY);
    p.eat(SyntaxKind::SEMICOLON);
}

/// LetDecl = 'export'? ('let' | 'const') Name TypeAnnotation? ('=' Expr)? ';'
pub fn parse_let_decl<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::LET_DECL);
    if p.eat(SyntaxKind::EXPORT_KW) {
        p.skip_trivia();
    }
    p.bump(); // let | const
    p.skip_trivia();
    parse_name(p, ErrorCode::E0301, "expected a name after 'let'");

    if p.peek_kind(0) == SyntaxKind::COLON {
        p.skip_trivia();
        parse_type_annotation(p);
    }
    if p.peek_kind(0) == SyntaxKind::EQ {
        parse_initializer(p);
    }
    expect_semicolon(p, "declaration");
    p.finish_node();
}

/// Directive = 'export'? 'directive' Name ParamList? Block
pub fn parse_directive<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::DIRECTIVE_DECL);
    if p.eat(SyntaxKind::EXPORT_KW) {
        p.skip_trivia();
    }
    p.bump(); // directive
    p.skip_trivia();
    parse_name(p, ErrorCode::E0301, "expected a directive name");

    if p.peek_kind(0) == SyntaxKind::L_PAREN {
        p.skip_trivia();
        parse_param_list(p);
    }
    if p.peek_kind(0) == SyntaxKind::L_BRACE {
        p.skip_trivia();
        parse_block(p);
    } else {
        p.skip_trivia();
        p.error(ErrorCode::E0303, "expected '{' to open the directive body");
    }
    p.finish_node();
}

/// FnDecl = 'export'? 'fn' Name ParamList Block
pub fn parse_fn_decl<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::FN_DECL);
    if p.eat(SyntaxKind::EXPORT_KW) {
        p.skip_trivia();
    }
    p.bump(); // fn
    p.skip_trivia();
    parse_name(p, ErrorCode::E0301, "expected a function name");

    p.skip_trivia();
    if p.at(SyntaxKind::L_PAREN) {
        parse_param_list(p);
    } else {
        p.error(ErrorCode::E0302, "expected '(' to start the parameter list");
    }
    if p.peek_kind(0) == SyntaxKind::L_BRACE {
        p.skip_trivia();
        parse_block(p);
    } else {
        p.skip_trivia();
        p.error(ErrorCode::E0303, "expected '{' to open the function body");
    }
    p.finish_node();
}

/// ParamList = '(' (Param (',' Param)* ','?)? ')'
fn parse_param_list<P: ItemParser>(p: &mut P) {
    let opener = p.current_range();
    let recovery = ParseContext::ParameterList.recovery_tokens();
    p.start_node(SyntaxKind::PARAM_LIST);
    p.bump(); // (
    loop {
        p.skip_trivia();
        if p.at(SyntaxKind::R_PAREN) || p.at_eof() {
            break;
        }
        if p.at(SyntaxKind::IDENT) {
            parse_param(p);
        } else if p.at_set(recovery) {
            p.error(ErrorCode::E0304, "expected a parameter name");
        } else {
            p.error_recover(ErrorCode::E0304, "expected a parameter name", recovery);
        }
        if p.peek_kind(0) != SyntaxKind::COMMA {
            break;
        }
        p.skip_trivia();
        p.bump();
    }
    p.skip_trivia();
    if !p.eat(SyntaxKind::R_PAREN) {
        let error = SyntaxError::builder(ErrorCode::E0203)
            .message("expected ')' to close the parameter list")
            .range(p.current_range())
            .related("opened here", opener)
            .build();
        p.push_error(error);
    }
    p.finish_node();
}

/// Param = Name TypeAnnotation? ('=' Expr)?
fn parse_param<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::PARAM);
    parse_name(p, ErrorCode::E0304, "expected a parameter name");
    if p.peek_kind(0) == SyntaxKind::COLON {
        p.skip_trivia();
        parse_type_annotation(p);
    }
    if p.peek_kind(0) == SyntaxKind::EQ {
        parse_initializer(p);
    }
    p.finish_node();
}

/// Import = 'import' ImportPath ('as' Name)? ';'
pub fn parse_import<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::IMPORT_DECL);
    p.bump(); // import
    p.skip_trivia();

    if p.at(SyntaxKind::IDENT) {
        parse_import_path(p);
    } else {
        p.error(ErrorCode::E0501, "expected an import path");
    }

    if p.peek_kind(0) == SyntaxKind::AS_KW {
        p.skip_trivia();
        p.bump();
        p.skip_trivia();
        parse_name(p, ErrorCode::E0503, "expected an alias name after 'as'");
    }
    expect_semicolon(p, "import");
    p.finish_node();
}

/// ImportPath = IDENT ('.' IDENT)*
fn parse_import_path<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::IMPORT_PATH);
    p.bump();
    while p.peek_kind(0) == SyntaxKind::DOT {
        p.skip_trivia();
        p.bump();
        p.skip_trivia();
        if !p.eat(SyntaxKind::IDENT) {
            p.error(ErrorCode::E0501, "expected an identifier after '.'");
            break;
        }
    }
    p.finish_node();
}

/// IfBlock = 'if' Expr Item* ('elif' Expr Item*)* ('else' Item*)? 'end'
pub fn parse_if_block<P: ItemParser>(p: &mut P) {
    if !p.enter_nesting() {
        skip_too_deep(p);
        return;
    }
    let opener = p.current_range();
    p.start_node(SyntaxKind::IF_BLOCK);
    p.bump(); // if
    if !parse_expression(p) {
        p.error(ErrorCode::E0406, "expected a condition after 'if'");
    }
    p.expectations_mut()
        .push(IF_CLOSERS, ParseContext::IfBlock, SyntaxKind::IF_KW, opener);
    parse_items(p);

    loop {
        match p.current_kind() {
            SyntaxKind::ELIF_KW => {
                p.start_node(SyntaxKind::ELIF_CLAUSE);
                p.bump();
                if !parse_expression(p) {
                    p.error(ErrorCode::E0406, "expected a condition after 'elif'");
                }
                parse_items(p);
                p.finish_node();
            }
            SyntaxKind::ELSE_KW => {
                p.expectations_mut().replace_top(END_ONLY, ParseContext::ElseBranch);
                p.start_node(SyntaxKind::ELSE_CLAUSE);
                p.bump();
                parse_items(p);
                p.finish_node();
            }
            SyntaxKind::END_KW => {
                p.bump();
                p.expectations_mut().pop();
                break;
            }
            _ => {
                report_unclosed(p, "'end'");
                break;
            }
        }
    }
    p.finish_node();
    p.exit_nesting();
}

/// ForBlock = 'for' Name 'in' Expr Item* 'end'
pub fn parse_for_block<P: ItemParser>(p: &mut P) {
    if !p.enter_nesting() {
        skip_too_deep(p);
        return;
    }
    let opener = p.current_range();
    p.start_node(SyntaxKind::FOR_BLOCK);
    p.bump(); // for
    p.skip_trivia();
    parse_name(p, ErrorCode::E0301, "expected a loop variable after 'for'");
    p.skip_trivia();
    if p.eat(SyntaxKind::IN_KW) {
        if !parse_expression(p) {
            p.error(ErrorCode::E0406, "expected an expression after 'in'");
        }
    } else {
        p.error(ErrorCode::E0902, "expected 'in' after the loop variable");
    }

    p.expectations_mut()
        .push(END_ONLY, ParseContext::ForBlock, SyntaxKind::FOR_KW, opener);
    parse_items(p);
    if p.at(SyntaxKind::END_KW) {
        p.bump();
        p.expectations_mut().pop();
    } else {
        report_unclosed(p, "'end'");
    }
    p.finish_node();
    p.exit_nesting();
}

/// Block = '{' Item* '}'
pub fn parse_block<P: ItemParser>(p: &mut P) {
    if !p.enter_nesting() {
        skip_too_deep(p);
        return;
    }
    let opener = p.current_range();
    p.start_node(SyntaxKind::BLOCK);
    p.bump(); // {
    p.expectations_mut()
        .push(BRACE_CLOSER, ParseContext::Block, SyntaxKind::L_BRACE, opener);
    parse_items(p);
    if p.at(SyntaxKind::R_BRACE) {
        p.bump();
        p.expectations_mut().pop();
    } else {
        report_unclosed(p, "'}'");
    }
    p.finish_node();
    p.exit_nesting();
}

/// ExprStmt = Expr ';'?
pub fn parse_expr_stmt<P: ItemParser>(p: &mut P) {
    p.start_node(SyntaxKind::EXPR_STMT);
    parse_expression(p);
    if p.peek_kind(0) == SyntaxKind::SEMICOLON {
        p.skip_trivia();
        p.bump();
    }
    p.finish_node();
}
