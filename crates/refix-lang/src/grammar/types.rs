use refix_tree::SyntaxKind::{self, *};

use crate::parser::Parser;

pub(crate) fn at_type(kind: SyntaxKind) -> bool {
    kind.is_primitive_type() || kind == IDENT
}

pub(crate) fn type_(p: &mut Parser<'_>) {
    let m = p.start();
    match p.peek_kind() {
        kind if kind.is_primitive_type() => {
            let inner = p.start();
            p.advance();
            inner.complete(p, PRIMITIVE_TYPE);
        }
        IDENT => {
            let inner = p.start();
            p.advance();
            inner.complete(p, CLASS_TYPE);
        }
        _ => p.error("expected a type"),
    }
    array_dims(p);
    m.complete(p, TYPE);
}

pub(crate) fn array_dims(p: &mut Parser<'_>) {
    while p.at(LEFT_BRACKET) && p.nth(1) == RIGHT_BRACKET {
        p.advance();
        p.advance();
    }
}
