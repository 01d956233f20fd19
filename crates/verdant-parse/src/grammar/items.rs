use verdant_yellow::SyntaxKind::*;
use verdant_yellow::TokenKind::*;
use verdant_yellow::TokenSet;

use super::{EXPR_FIRST, delimited, exprs, name};
use crate::parser::Parser;

pub(crate) fn source(p: &mut Parser<'_>) {
    let m = p.start();

    while !p.at(EOF) {
        if p.at(RIGHT_BRACE) {
            let m = p.start();
            p.error("unmatched `}`");
            p.advance();
            m.complete(p, ERROR);
            continue;
        }
        stmt(p);
    }

    p.flush_trailing_trivia();
    m.complete(p, SOURCE);
}

/// `{ stmt* }`. Parses the same way wherever it appears, which is what lets a
/// block be reparsed on its own.
pub(crate) fn block(p: &mut Parser<'_>) {
    debug_assert!(p.at(LEFT_BRACE));

    let m = p.start();
    p.advance();

    while !p.at(RIGHT_BRACE) && !p.at(EOF) {
        stmt(p);
    }

    p.expect(RIGHT_BRACE);
    m.complete(p, BLOCK);
}

/// Callers never invoke this at `}` or at the end of input.
pub(crate) fn stmt(p: &mut Parser<'_>) {
    match p.peek_kind() {
        VAR_KW => var_decl(p),
        FUNCTION_KW => function_decl(p),
        RETURN_KW => return_stmt(p),
        IF_KW => if_stmt(p),
        WHILE_KW => while_stmt(p),
        BREAK_KW => keyword_stmt(p, BREAK_STMT),
        CONTINUE_KW => keyword_stmt(p, CONTINUE_STMT),
        LEFT_BRACE => block(p),
        SEMICOLON => {
            let m = p.start();
            p.advance();
            m.complete(p, EMPTY_STMT);
        }
        kind if EXPR_FIRST.contains(kind) => expr_stmt(p),
        _ => p.err_recover("expected a statement", TokenSet::EMPTY),
    }
}

/// Statement position that may legitimately be missing, as in `if (x) }`.
fn nested_stmt(p: &mut Parser<'_>) {
    if p.at(RIGHT_BRACE) || p.at(EOF) {
        p.error("expected a statement");
    } else {
        stmt(p);
    }
}

fn var_decl(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    name(p, TokenSet::new([EQ]));
    if p.eat(EQ) {
        exprs::expr(p);
    }
    p.eat(SEMICOLON);
    m.complete(p, VAR_DECL);
}

fn function_decl(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    name(p, TokenSet::new([LEFT_PAREN, LEFT_BRACE]));

    if p.at(LEFT_PAREN) {
        param_list(p);
    } else {
        p.error("expected a parameter list");
    }

    if p.at(LEFT_BRACE) {
        block(p);
    } else {
        p.error("expected a function body");
    }

    m.complete(p, FUNCTION_DECL);
}

fn param_list(p: &mut Parser<'_>) {
    let m = p.start();
    delimited(
        p,
        LEFT_PAREN,
        RIGHT_PAREN,
        TokenSet::new([LEFT_BRACE, RIGHT_BRACE]),
        TokenSet::new([IDENT]),
        "expected a parameter",
        |p| {
            if !p.at(IDENT) {
                return false;
            }
            let m = p.start();
            name(p, TokenSet::EMPTY);
            m.complete(p, PARAM);
            true
        },
    );
    m.complete(p, PARAM_LIST);
}

fn return_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    if p.at_set(EXPR_FIRST) {
        exprs::expr(p);
    }
    p.eat(SEMICOLON);
    m.complete(p, RETURN_STMT);
}

fn if_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    condition(p);
    nested_stmt(p);

    if p.at(ELSE_KW) {
        let else_branch = p.start();
        p.advance();
        nested_stmt(p);
        else_branch.complete(p, ELSE_BRANCH);
    }

    m.complete(p, IF_STMT);
}

fn while_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    condition(p);
    nested_stmt(p);
    m.complete(p, WHILE_STMT);
}

fn condition(p: &mut Parser<'_>) {
    if p.expect(LEFT_PAREN) {
        exprs::expr(p);
        p.expect(RIGHT_PAREN);
    } else if p.at_set(EXPR_FIRST) && !p.at(LEFT_BRACE) {
        exprs::expr(p);
    }
}

fn keyword_stmt(p: &mut Parser<'_>, kind: verdant_yellow::SyntaxKind) {
    let m = p.start();
    p.advance();
    p.eat(SEMICOLON);
    m.complete(p, kind);
}

fn expr_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    exprs::expr(p);
    p.eat(SEMICOLON);
    m.complete(p, EXPR_STMT);
}
