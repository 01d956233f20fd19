use verdant_yellow::SyntaxKind::*;
use verdant_yellow::TokenKind::{self, *};
use verdant_yellow::TokenSet;

use crate::parser::Parser;

mod exprs;
pub(crate) mod items;

pub(crate) use items::block;

/// Tokens that may begin an expression.
pub(crate) const EXPR_FIRST: TokenSet = TokenSet::new([
    INT_NUMBER,
    FLOAT_NUMBER,
    STRING,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    IDENT,
    LEFT_PAREN,
    LEFT_BRACE,
    LEFT_BRACKET,
    BANG,
    MINUS,
]);

/// Tokens that start a statement of their own and end any broken construct
/// in front of them.
pub(crate) const STMT_RECOVERY: TokenSet = TokenSet::new([
    VAR_KW,
    FUNCTION_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    WHILE_KW,
    BREAK_KW,
    CONTINUE_KW,
    SEMICOLON,
]);

pub(crate) fn name(p: &mut Parser<'_>, recovery: TokenSet) {
    match p.peek_kind() {
        IDENT => {
            let m = p.start();
            p.advance();
            m.complete(p, NAME);
        }
        _ => p.err_recover("expected a name", recovery.union(STMT_RECOVERY)),
    }
}

/// Parses `bra element (, element)* ,? ket`.
///
/// `element` returns `false` when it cannot start at the current token, which
/// ends the list. A list also ends early at any token in `stop`.
pub(crate) fn delimited(
    p: &mut Parser<'_>,
    bra: TokenKind,
    ket: TokenKind,
    stop: TokenSet,
    first_set: TokenSet,
    unexpected_delim_message: &'static str,
    mut element: impl FnMut(&mut Parser<'_>) -> bool,
) {
    debug_assert_eq!(p.peek_kind(), bra);
    p.advance();

    while !p.at(ket) && !p.at(EOF) && !p.at_set(stop) {
        if p.at(COMMA) {
            let m = p.start();
            p.error(unexpected_delim_message);
            p.advance();
            m.complete(p, ERROR);
            continue;
        }

        if !element(p) {
            break;
        }

        if !p.eat(COMMA) {
            if first_set.contains(p.peek_kind()) {
                p.expect(COMMA);
            } else {
                break;
            }
        }
    }

    p.expect(ket);
}
