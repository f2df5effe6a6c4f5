//! Grammar of every node kind the parser produces.

use std::sync::LazyLock;

use refix_grammar::{
    Grammar, GrammarTable, Reentrant, Symbol, TokenClass, alt, child, grammar_table, lit, opt,
    reentrant, seq, star,
};
use refix_tree::SyntaxKind::{self, *};
use rustc_hash::FxHashMap;

/// Canonical order of class modifiers.
pub const CLASS_MODIFIERS: &[SyntaxKind] =
    &[PUBLIC_KW, PROTECTED_KW, PRIVATE_KW, ABSTRACT_KW, STATIC_KW, FINAL_KW];

/// Canonical order of field and method modifiers.
pub const MEMBER_MODIFIERS: &[SyntaxKind] = &[
    PUBLIC_KW,
    PROTECTED_KW,
    PRIVATE_KW,
    ABSTRACT_KW,
    STATIC_KW,
    FINAL_KW,
    TRANSIENT_KW,
    VOLATILE_KW,
    SYNCHRONIZED_KW,
    NATIVE_KW,
];

pub const LOCAL_MODIFIERS: &[SyntaxKind] = &[FINAL_KW];

/// Token class spelling a node's image, for kinds that carry one.
pub fn image_class(kind: SyntaxKind) -> Option<TokenClass> {
    let class = match kind {
        CLASS_DECL | METHOD_DECL | CLASS_TYPE | VARIABLE_ID | NAME_EXPR | CALL_EXPR => {
            TokenClass::Identifier
        }
        PRIMITIVE_TYPE => TokenClass::PrimitiveKeyword,
        LITERAL => TokenClass::Literal,
        BINARY_EXPR => TokenClass::Operator,
        _ => return None,
    };
    Some(class)
}

/// The language's grammar table.
#[derive(Debug, Clone, Copy, Default)]
pub struct LangGrammars;

impl GrammarTable for LangGrammars {
    fn grammar(&self, kind: SyntaxKind) -> Option<&Grammar> {
        GRAMMARS.get(&kind)
    }
}

static GRAMMARS: LazyLock<FxHashMap<SyntaxKind, Grammar>> = LazyLock::new(|| {
    grammar_table([
        Grammar::new(COMPILATION_UNIT, star(child(CLASS_DECL))),
        Grammar::new(
            CLASS_DECL,
            seq([modifiers(CLASS_MODIFIERS), lit(CLASS_KW), image(CLASS_DECL), child(CLASS_BODY)]),
        ),
        Grammar::new(
            CLASS_BODY,
            seq([
                lit(LEFT_BRACE),
                star(alt([child(FIELD_DECL), child(METHOD_DECL)])),
                lit(RIGHT_BRACE),
            ]),
        ),
        Grammar::new(
            FIELD_DECL,
            seq([
                modifiers(MEMBER_MODIFIERS),
                child(TYPE),
                comma_list(child(VARIABLE_DECLARATOR)),
                lit(SEMICOLON),
            ]),
        ),
        Grammar::new(
            METHOD_DECL,
            seq([
                modifiers(MEMBER_MODIFIERS),
                alt([lit(VOID_KW), child(TYPE)]),
                image(METHOD_DECL),
                child(FORMAL_PARAMS),
                alt([child(BLOCK), lit(SEMICOLON)]),
            ]),
        ),
        Grammar::new(
            FORMAL_PARAMS,
            seq([lit(LEFT_PAREN), opt(comma_list(child(FORMAL_PARAM))), lit(RIGHT_PAREN)]),
        ),
        Grammar::new(
            FORMAL_PARAM,
            seq([modifiers(LOCAL_MODIFIERS), child(TYPE), child(VARIABLE_ID)]),
        ),
        Grammar::new(
            TYPE,
            seq([alt([child(PRIMITIVE_TYPE), child(CLASS_TYPE)]), reentrant(Reentrant::ArrayDims)]),
        ),
        Grammar::new(PRIMITIVE_TYPE, image(PRIMITIVE_TYPE)),
        Grammar::new(CLASS_TYPE, image(CLASS_TYPE)),
        Grammar::new(
            VARIABLE_DECLARATOR,
            seq([child(VARIABLE_ID), opt(seq([lit(EQ), expr()]))]),
        ),
        Grammar::new(VARIABLE_ID, seq([image(VARIABLE_ID), reentrant(Reentrant::ArrayDims)])),
        Grammar::new(BLOCK, seq([lit(LEFT_BRACE), star(stmt()), lit(RIGHT_BRACE)])),
        Grammar::new(
            LOCAL_VAR_DECL,
            seq([
                modifiers(LOCAL_MODIFIERS),
                child(TYPE),
                comma_list(child(VARIABLE_DECLARATOR)),
                lit(SEMICOLON),
            ]),
        ),
        Grammar::new(RETURN_STMT, seq([lit(RETURN_KW), opt(expr()), lit(SEMICOLON)])),
        Grammar::new(
            IF_STMT,
            seq([
                lit(IF_KW),
                lit(LEFT_PAREN),
                expr(),
                lit(RIGHT_PAREN),
                stmt(),
                opt(seq([lit(ELSE_KW), stmt()])),
            ]),
        ),
        Grammar::new(EXPR_STMT, seq([expr(), lit(SEMICOLON)])),
        Grammar::new(LITERAL, image(LITERAL)),
        Grammar::new(NAME_EXPR, image(NAME_EXPR)),
        Grammar::new(BINARY_EXPR, seq([expr(), image(BINARY_EXPR), expr()])),
        Grammar::new(PAREN_EXPR, seq([lit(LEFT_PAREN), expr(), lit(RIGHT_PAREN)])),
        Grammar::new(CALL_EXPR, seq([image(CALL_EXPR), child(ARGUMENTS)])),
        Grammar::new(
            ARGUMENTS,
            seq([lit(LEFT_PAREN), opt(comma_list(expr())), lit(RIGHT_PAREN)]),
        ),
    ])
});

fn modifiers(allowed: &'static [SyntaxKind]) -> Symbol {
    reentrant(Reentrant::Modifiers(allowed))
}

/// The image element of `kind`, or panics if `kind` has no [`image_class`].
pub(crate) fn image(kind: SyntaxKind) -> Symbol {
    match image_class(kind) {
        Some(class) => reentrant(Reentrant::Image(class)),
        None => unreachable!("{kind:?} carries no image"),
    }
}

fn comma_list(item: Symbol) -> Symbol {
    seq([item.clone(), star(seq([lit(COMMA), item]))])
}

fn expr() -> Symbol {
    alt([
        child(LITERAL),
        child(NAME_EXPR),
        child(BINARY_EXPR),
        child(PAREN_EXPR),
        child(CALL_EXPR),
    ])
}

fn stmt() -> Symbol {
    alt([
        child(BLOCK),
        child(LOCAL_VAR_DECL),
        child(RETURN_STMT),
        child(IF_STMT),
        child(EXPR_STMT),
    ])
}
