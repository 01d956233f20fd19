use verdant_yellow::SyntaxKind::*;
use verdant_yellow::TokenKind::{self, *};
use verdant_yellow::TokenSet;

use super::{EXPR_FIRST, STMT_RECOVERY, delimited};
use crate::parser::{CompletedMarker, Parser};

const EXPR_RECOVERY: TokenSet =
    TokenSet::new([RIGHT_PAREN, RIGHT_BRACKET, COMMA, COLON]).union(STMT_RECOVERY);

pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, 0)
}

/// Left and right binding power of an infix operator. `=` is the only
/// right-associative one.
fn infix_binding_power(op: TokenKind) -> Option<(u8, u8)> {
    let bp = match op {
        EQ => (2, 1),
        PIPE_PIPE => (3, 4),
        AMP_AMP => (5, 6),
        EQ_EQ | BANG_EQ => (7, 8),
        LT | LT_EQ | GT | GT_EQ => (9, 10),
        PLUS | MINUS => (11, 12),
        STAR | SLASH | PERCENT => (13, 14),
        _ => return None,
    };
    Some(bp)
}

fn expr_bp(p: &mut Parser<'_>, min_bp: u8) -> Option<CompletedMarker> {
    let mut lhs = prefix_expr(p)?;

    while let Some((l_bp, r_bp)) = infix_binding_power(p.peek_kind()) {
        if l_bp < min_bp {
            break;
        }

        let m = lhs.precede(p);
        p.advance();
        expr_bp(p, r_bp);
        lhs = m.complete(p, BINARY_EXPR);
    }

    Some(lhs)
}

fn prefix_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        BANG | MINUS => {
            let m = p.start();
            p.advance();
            prefix_expr(p);
            m.complete(p, PREFIX_EXPR).into()
        }
        _ => postfix_expr(p),
    }
}

fn postfix_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = primary_expr(p)?;

    loop {
        lhs = match p.peek_kind() {
            LEFT_PAREN => {
                let m = lhs.precede(p);
                arg_list(p);
                m.complete(p, CALL_EXPR)
            }
            DOT => {
                let m = lhs.precede(p);
                p.advance();
                if p.at(IDENT) {
                    name_ref(p);
                } else {
                    p.error("expected a member name");
                }
                m.complete(p, MEMBER_EXPR)
            }
            LEFT_BRACKET => {
                let m = lhs.precede(p);
                p.advance();
                expr(p);
                p.expect(RIGHT_BRACKET);
                m.complete(p, INDEX_EXPR)
            }
            _ => break,
        };
    }

    lhs.into()
}

fn primary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        INT_NUMBER | FLOAT_NUMBER | STRING | TRUE_KW | FALSE_KW | NULL_KW => {
            let m = p.start();
            p.advance();
            m.complete(p, LITERAL).into()
        }
        IDENT => name_ref(p).into(),
        LEFT_PAREN => {
            let m = p.start();
            p.advance();
            expr(p);
            p.expect(RIGHT_PAREN);
            m.complete(p, PAREN_EXPR).into()
        }
        LEFT_BRACE => object_expr(p).into(),
        LEFT_BRACKET => array_expr(p).into(),
        _ => {
            p.err_recover("expected an expression", EXPR_RECOVERY);
            None
        }
    }
}

fn name_ref(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.advance();
    m.complete(p, NAME_REF)
}

fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    delimited(
        p,
        LEFT_PAREN,
        RIGHT_PAREN,
        STMT_RECOVERY,
        EXPR_FIRST,
        "expected an argument",
        |p| expr(p).is_some(),
    );
    m.complete(p, ARG_LIST);
}

fn object_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    delimited(
        p,
        LEFT_BRACE,
        RIGHT_BRACE,
        STMT_RECOVERY,
        TokenSet::new([IDENT, STRING]),
        "expected a property",
        |p| {
            if !p.at(IDENT) && !p.at(STRING) {
                return false;
            }
            let property = p.start();
            let key = p.start();
            p.advance();
            key.complete(p, NAME);
            if p.expect(COLON) {
                expr(p);
            }
            property.complete(p, OBJECT_PROPERTY);
            true
        },
    );
    m.complete(p, OBJECT_EXPR)
}

fn array_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    delimited(
        p,
        LEFT_BRACKET,
        RIGHT_BRACKET,
        STMT_RECOVERY.union(TokenSet::new([RIGHT_BRACE])),
        EXPR_FIRST,
        "expected an element",
        |p| expr(p).is_some(),
    );
    m.complete(p, ARRAY_EXPR)
}
