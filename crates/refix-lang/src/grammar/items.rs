use refix_tree::SyntaxKind::*;

use super::{delimited, exprs, modifier_run, modifiers, types};
use crate::parser::{Marker, Parser};

pub(crate) fn compilation_unit(p: &mut Parser<'_>) {
    let m = p.start();
    while !p.at(EOF) {
        if p.nth(modifier_run(p)) == CLASS_KW {
            class_decl(p);
        } else {
            p.bump_error("expected a class declaration");
        }
    }
    m.complete(p, COMPILATION_UNIT);
}

fn class_decl(p: &mut Parser<'_>) {
    let m = p.start();
    modifiers(p);
    p.expect(CLASS_KW);
    p.expect(IDENT);
    if p.at(LEFT_BRACE) {
        class_body(p);
    } else {
        p.error("expected a class body");
    }
    m.complete(p, CLASS_DECL);
}

fn class_body(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), LEFT_BRACE);
    let m = p.start();
    p.advance();

    while !matches!(p.peek_kind(), RIGHT_BRACE | EOF) {
        member(p);
    }

    p.expect(RIGHT_BRACE);
    m.complete(p, CLASS_BODY);
}

fn member(p: &mut Parser<'_>) {
    let start = p.nth(modifier_run(p));
    if start != VOID_KW && !types::at_type(start) {
        p.bump_error("expected a field or a method");
        return;
    }

    let m = p.start();
    modifiers(p);
    if p.eat(VOID_KW) {
        return method_rest(p, m);
    }
    types::type_(p);
    if p.at(IDENT) && p.nth(1) == LEFT_PAREN {
        method_rest(p, m);
    } else {
        variable_declarators(p);
        p.expect(SEMICOLON);
        m.complete(p, FIELD_DECL);
    }
}

fn method_rest(p: &mut Parser<'_>, m: Marker) {
    p.expect(IDENT);
    if p.at(LEFT_PAREN) {
        delimited(p, FORMAL_PARAMS, LEFT_PAREN, RIGHT_PAREN, formal_param);
    } else {
        p.error("expected parameters");
    }
    if p.at(LEFT_BRACE) {
        exprs::block(p);
    } else {
        p.expect(SEMICOLON);
    }
    m.complete(p, METHOD_DECL);
}

fn formal_param(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    p.eat(FINAL_KW);
    types::type_(p);
    variable_id(p);
    m.complete(p, FORMAL_PARAM);
    true
}

pub(crate) fn variable_declarators(p: &mut Parser<'_>) {
    variable_declarator(p);
    while p.eat(COMMA) {
        variable_declarator(p);
    }
}

fn variable_declarator(p: &mut Parser<'_>) {
    let m = p.start();
    variable_id(p);
    if p.eat(EQ) {
        exprs::expr(p);
    }
    m.complete(p, VARIABLE_DECLARATOR);
}

fn variable_id(p: &mut Parser<'_>) {
    let m = p.start();
    p.expect(IDENT);
    types::array_dims(p);
    m.complete(p, VARIABLE_ID);
}
