use refix_tree::SyntaxKind;

use crate::{Reentrant, StructureElement};

/// Grammar expression over structure elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Literal(StructureElement),
    Composite(Reentrant),
    Sequence(Vec<Symbol>),
    Alternation(Vec<Symbol>),
    ZeroOrOne(Box<Symbol>),
    ZeroOrMore(Box<Symbol>),
    OneOrMore(Box<Symbol>),
}

pub fn seq(symbols: impl IntoIterator<Item = Symbol>) -> Symbol {
    Symbol::Sequence(symbols.into_iter().collect())
}

pub fn alt(symbols: impl IntoIterator<Item = Symbol>) -> Symbol {
    Symbol::Alternation(symbols.into_iter().collect())
}

pub fn opt(symbol: Symbol) -> Symbol {
    Symbol::ZeroOrOne(Box::new(symbol))
}

pub fn star(symbol: Symbol) -> Symbol {
    Symbol::ZeroOrMore(Box::new(symbol))
}

pub fn plus(symbol: Symbol) -> Symbol {
    Symbol::OneOrMore(Box::new(symbol))
}

/// A punctuation or keyword token with a fixed spelling. Panics if `kind`
/// has none, which only happens while a grammar table is being declared.
pub fn lit(kind: SyntaxKind) -> Symbol {
    let text = kind.text().unwrap_or_else(|| panic!("{kind:?} has no fixed spelling"));
    Symbol::Literal(StructureElement::LiteralToken(kind, text))
}

pub fn child(kind: SyntaxKind) -> Symbol {
    Symbol::Literal(StructureElement::ChildOfKind(kind))
}

pub fn reentrant(element: Reentrant) -> Symbol {
    Symbol::Composite(element)
}
