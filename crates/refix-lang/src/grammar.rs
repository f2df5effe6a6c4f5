use refix_tree::SyntaxKind::{self, *};

use crate::parser::Parser;

mod exprs;
pub(crate) mod items;
mod types;

pub(crate) fn modifiers(p: &mut Parser<'_>) {
    while p.peek_kind().is_modifier() {
        p.advance();
    }
}

/// Number of modifier keywords in front of the current token.
pub(crate) fn modifier_run(p: &Parser<'_>) -> usize {
    (0..).find(|&n| !p.nth(n).is_modifier()).unwrap_or_default()
}

/// A `,`-separated list between `bra` and `ket`, completed as `kind`.
pub(crate) fn delimited(
    p: &mut Parser<'_>,
    kind: SyntaxKind,
    bra: SyntaxKind,
    ket: SyntaxKind,
    mut element: impl FnMut(&mut Parser<'_>) -> bool,
) {
    debug_assert_eq!(p.peek_kind(), bra);
    let m = p.start();
    p.advance();

    while !p.at(ket) && !p.at(EOF) {
        if p.at(COMMA) {
            p.bump_error("unexpected `,`");
            continue;
        }

        if !element(p) {
            break;
        }

        if !p.eat(COMMA) {
            break;
        }
    }

    p.expect(ket);
    m.complete(p, kind);
}
