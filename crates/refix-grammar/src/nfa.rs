//! Thompson construction over structure elements.
//!
//! Every state of a fragment with an unpatched out edge sits in the
//! fragment's dangling list; patching appends the target to that state's out
//! edges. Compiling the top-level symbol closes the last fragment into a
//! single `End` state.

use std::fmt::Write as _;

use refix_tree::{Arena, Key};

use crate::{Reentrant, StructureElement, Symbol};

pub type StateId = Key<State>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Split(Vec<StateId>),
    SingleMatch { element: StructureElement, mandatory: bool, out: Vec<StateId> },
    Reentrant { element: Reentrant, mandatory: bool, out: Vec<StateId> },
    End,
}

impl State {
    pub fn out(&self) -> &[StateId] {
        match self {
            Self::Split(out) | Self::SingleMatch { out, .. } | Self::Reentrant { out, .. } => out,
            Self::End => &[],
        }
    }
}

#[derive(Debug)]
pub struct Nfa {
    states: Arena<State>,
    start: StateId,
}

struct Fragment {
    start: StateId,
    dangling: Vec<StateId>,
}

impl Nfa {
    pub fn compile(symbol: &Symbol) -> Self {
        let mut compiler = Compiler { states: Arena::new() };
        let fragment = compiler.compile(symbol, true);
        let end = compiler.states.alloc(State::End);
        compiler.patch(&fragment.dangling, end);
        Self { states: compiler.states, start: fragment.start }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (id, state) in self.states.iter_enumerated() {
            let marker = if id == self.start { ">" } else { " " };
            let _ = write!(out, "{marker}{id:?} ");
            let mandatory = |mandatory: bool| if mandatory { "!" } else { "?" };
            let _ = match state {
                State::Split(_) => write!(out, "split"),
                State::SingleMatch { element: StructureElement::LiteralToken(_, text), mandatory: m, .. } => {
                    write!(out, "{}{text:?}", mandatory(*m))
                }
                State::SingleMatch { element, mandatory: m, .. } => {
                    write!(out, "{}{element:?}", mandatory(*m))
                }
                State::Reentrant { element, mandatory: m, .. } => {
                    write!(out, "{}{element:?}", mandatory(*m))
                }
                State::End => write!(out, "end"),
            };
            for target in state.out() {
                let _ = write!(out, " {target:?}");
            }
            out.push('\n');
        }
        out
    }
}

struct Compiler {
    states: Arena<State>,
}

impl Compiler {
    fn compile(&mut self, symbol: &Symbol, mandatory: bool) -> Fragment {
        match symbol {
            Symbol::Literal(element) => self.leaf(State::SingleMatch {
                element: element.clone(),
                mandatory,
                out: Vec::new(),
            }),
            Symbol::Composite(element) => {
                self.leaf(State::Reentrant { element: element.clone(), mandatory, out: Vec::new() })
            }
            Symbol::Sequence(symbols) => {
                let mut fragment: Option<Fragment> = None;
                for symbol in symbols {
                    let next = self.compile(symbol, mandatory);
                    fragment = Some(match fragment {
                        Some(prev) => {
                            self.patch(&prev.dangling, next.start);
                            Fragment { start: prev.start, dangling: next.dangling }
                        }
                        None => next,
                    });
                }
                // An empty sequence is a pass-through split.
                fragment.unwrap_or_else(|| self.leaf(State::Split(Vec::new())))
            }
            Symbol::Alternation(symbols) => {
                let split = self.states.alloc(State::Split(Vec::new()));
                let mut dangling = Vec::new();
                for symbol in symbols {
                    let branch = self.compile(symbol, false);
                    self.patch(&[split], branch.start);
                    dangling.extend(branch.dangling);
                }
                Fragment { start: split, dangling }
            }
            Symbol::ZeroOrOne(inner) => {
                let split = self.states.alloc(State::Split(Vec::new()));
                let body = self.compile(inner, false);
                self.patch(&[split], body.start);
                let mut dangling = body.dangling;
                dangling.push(split);
                Fragment { start: split, dangling }
            }
            Symbol::ZeroOrMore(inner) => self.star(inner),
            Symbol::OneOrMore(inner) => {
                let first = self.compile(inner, mandatory);
                let rest = self.star(inner);
                self.patch(&first.dangling, rest.start);
                Fragment { start: first.start, dangling: rest.dangling }
            }
        }
    }

    fn star(&mut self, inner: &Symbol) -> Fragment {
        let split = self.states.alloc(State::Split(Vec::new()));
        let body = self.compile(inner, false);
        self.patch(&[split], body.start);
        self.patch(&body.dangling, split);
        Fragment { start: split, dangling: vec![split] }
    }

    fn leaf(&mut self, state: State) -> Fragment {
        let id = self.states.alloc(state);
        Fragment { start: id, dangling: vec![id] }
    }

    fn patch(&mut self, dangling: &[StateId], target: StateId) {
        for &state in dangling {
            match &mut self.states[state] {
                State::Split(out)
                | State::SingleMatch { out, .. }
                | State::Reentrant { out, .. } => out.push(target),
                State::End => unreachable!("end states are never dangling"),
            }
        }
    }
}
