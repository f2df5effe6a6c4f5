//! Declarative node grammars, their automata and the structure matcher.

mod element;
mod matcher;
mod nfa;
mod structure;
mod symbol;

use std::sync::OnceLock;

use refix_errors::{FixError, Result};
use refix_tree::SyntaxKind;
use rustc_hash::FxHashMap;

pub use element::{Consumed, MatchMode, Policy, Reentrant, StructureElement, TokenClass};
pub use matcher::{Matcher, Value, complete_values, parse, select};
pub use nfa::{Nfa, State, StateId};
pub use structure::{SeInfo, Structure, StructureBuilder};
pub use symbol::{Symbol, alt, child, lit, opt, plus, reentrant, seq, star};

/// Grammar of one node kind. The automaton is compiled on first use.
#[derive(Debug)]
pub struct Grammar {
    kind: SyntaxKind,
    symbol: Symbol,
    nfa: OnceLock<Nfa>,
}

impl Grammar {
    pub fn new(kind: SyntaxKind, symbol: Symbol) -> Self {
        Self { kind, symbol, nfa: OnceLock::new() }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn nfa(&self) -> &Nfa {
        self.nfa.get_or_init(|| {
            let nfa = Nfa::compile(&self.symbol);
            tracing::debug!(kind = ?self.kind, states = nfa.state_count(), "compiled grammar");
            nfa
        })
    }
}

/// Per-kind grammar lookup supplied by a language module.
pub trait GrammarTable: Sync {
    fn grammar(&self, kind: SyntaxKind) -> Option<&Grammar>;

    fn lookup(&self, kind: SyntaxKind) -> Result<&Grammar> {
        self.grammar(kind).ok_or_else(|| FixError::MissingGrammar { kind: format!("{kind:?}") })
    }
}

impl GrammarTable for FxHashMap<SyntaxKind, Grammar> {
    fn grammar(&self, kind: SyntaxKind) -> Option<&Grammar> {
        self.get(&kind)
    }
}

/// Collects grammars into a table keyed by their kind.
pub fn grammar_table(grammars: impl IntoIterator<Item = Grammar>) -> FxHashMap<SyntaxKind, Grammar> {
    grammars.into_iter().map(|grammar| (grammar.kind, grammar)).collect()
}
