use refix_tree::SyntaxKind::*;

use super::{delimited, items, types};
use crate::parser::{CompletedMarker, Parser};

pub(crate) fn block(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), LEFT_BRACE);
    let m = p.start();
    p.advance();

    while !matches!(p.peek_kind(), RIGHT_BRACE | EOF) {
        stmt(p);
    }

    p.expect(RIGHT_BRACE);
    m.complete(p, BLOCK);
}

fn stmt(p: &mut Parser<'_>) {
    match p.peek_kind() {
        RIGHT_BRACE | EOF => p.error("expected a statement"),
        LEFT_BRACE => block(p),
        RETURN_KW => {
            let m = p.start();
            p.advance();
            if !p.at(SEMICOLON) {
                expr(p);
            }
            p.expect(SEMICOLON);
            m.complete(p, RETURN_STMT);
        }
        IF_KW => if_stmt(p),
        _ if at_local_var(p) => {
            let m = p.start();
            p.eat(FINAL_KW);
            types::type_(p);
            items::variable_declarators(p);
            p.expect(SEMICOLON);
            m.complete(p, LOCAL_VAR_DECL);
        }
        _ => {
            if let Some(lhs) = expr(p) {
                let m = lhs.precede(p);
                p.expect(SEMICOLON);
                m.complete(p, EXPR_STMT);
            }
        }
    }
}

fn at_local_var(p: &Parser<'_>) -> bool {
    match p.peek_kind() {
        FINAL_KW => true,
        kind if kind.is_primitive_type() => true,
        IDENT => p.nth(1) == IDENT || (p.nth(1) == LEFT_BRACKET && p.nth(2) == RIGHT_BRACKET),
        _ => false,
    }
}

fn if_stmt(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), IF_KW);

    let m = p.start();
    p.advance();
    p.expect(LEFT_PAREN);
    expr(p);
    p.expect(RIGHT_PAREN);
    stmt(p);
    if p.eat(ELSE_KW) {
        stmt(p);
    }
    m.complete(p, IF_STMT);
}

pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, 0)
}

fn expr_bp(p: &mut Parser<'_>, min_bp: u8) -> Option<CompletedMarker> {
    let mut lhs = primary_expr(p)?;

    while let Some((left, right)) = binding_power(p) {
        if left < min_bp {
            break;
        }
        let m = lhs.precede(p);
        p.advance();
        expr_bp(p, right);
        lhs = m.complete(p, BINARY_EXPR);
    }

    lhs.into()
}

/// Assignments bind right, everything else left.
fn binding_power(p: &Parser<'_>) -> Option<(u8, u8)> {
    let left = match (p.peek_kind(), p.peek_text()) {
        (EQ, _) | (OPERATOR, "+=" | "-=" | "*=" | "/=") => return Some((2, 1)),
        (OPERATOR, "||") => 3,
        (OPERATOR, "&&") => 5,
        (OPERATOR, "==" | "!=") => 7,
        (OPERATOR, "<" | ">" | "<=" | ">=") => 9,
        (OPERATOR, "+" | "-") => 11,
        (OPERATOR, "*" | "/" | "%") => 13,
        _ => return None,
    };
    Some((left, left + 1))
}

fn primary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        INT_LITERAL | STRING_LITERAL | TRUE_KW | FALSE_KW | NULL_KW => {
            let m = p.start();
            p.advance();
            m.complete(p, LITERAL).into()
        }
        IDENT if p.nth(1) == LEFT_PAREN => {
            let m = p.start();
            p.advance();
            delimited(p, ARGUMENTS, LEFT_PAREN, RIGHT_PAREN, |p| expr(p).is_some());
            m.complete(p, CALL_EXPR).into()
        }
        IDENT => {
            let m = p.start();
            p.advance();
            m.complete(p, NAME_EXPR).into()
        }
        LEFT_PAREN => {
            let m = p.start();
            p.advance();
            expr(p);
            p.expect(RIGHT_PAREN);
            m.complete(p, PAREN_EXPR).into()
        }
        RIGHT_BRACE | EOF => {
            p.error("expected an expression");
            None
        }
        _ => {
            p.bump_error("expected an expression");
            None
        }
    }
}
