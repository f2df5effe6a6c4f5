//! Runs a compiled grammar against a node's tokens and children.
//!
//! The matcher keeps a set of transcriptions, each a parked state plus the
//! structure matched so far. Feeding a value delegates every transcription
//! through epsilon states (splits and skipped elements) until a state
//! consumes the value. A delegate walk never revisits a state it already
//! passed, which bounds it on split cycles.

use refix_errors::{FixError, Result};
use refix_tree::{NodeId, SyntaxTree, TokenId, TokenRegion};

use crate::element::{Consumed, MatchMode, Policy, Reentrant, StructureElement};
use crate::nfa::{Nfa, State, StateId};
use crate::structure::{SeInfo, Structure, StructureBuilder};
use crate::Grammar;

/// A single input of the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Token(TokenId),
    /// A child stands in for its whole region.
    Child(NodeId),
}

/// Tokens taken so far by a reentrant element that may still consume more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Open {
    region: TokenRegion,
    consumed: Consumed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Transcription {
    state: StateId,
    builder: StructureBuilder,
    open: Option<Open>,
}

pub struct Matcher<'a> {
    tree: &'a SyntaxTree,
    nfa: &'a Nfa,
    policy: Policy,
}

impl<'a> Matcher<'a> {
    pub fn new(tree: &'a SyntaxTree, nfa: &'a Nfa, policy: Policy) -> Self {
        Self { tree, nfa, policy }
    }

    /// Values fed for `node` under this matcher's policy.
    pub fn values(&self, node: NodeId) -> Vec<Value> {
        match self.policy {
            Policy::Generate => Vec::new(),
            Policy::ChildrenOnly => {
                self.tree.children(node).iter().map(|&child| Value::Child(child)).collect()
            }
            Policy::Complete => complete_values(self.tree, node),
        }
    }

    /// Every accepting structure, duplicates collapsed, in discovery order.
    pub fn run(&self, values: &[Value]) -> Vec<Structure> {
        let start = Transcription {
            state: self.nfa.start(),
            builder: StructureBuilder::default(),
            open: None,
        };
        let mut current = vec![start];

        for &value in values {
            let mut next = Vec::new();
            for transcription in &current {
                self.step(transcription, value, &mut next);
            }
            tracing::trace!(?value, live = next.len(), "matcher step");
            if next.is_empty() {
                return Vec::new();
            }
            current = next;
        }

        let mut results = Vec::new();
        for transcription in &current {
            self.finish(transcription, &mut results);
        }
        results
    }

    fn step(&self, transcription: &Transcription, value: Value, next: &mut Vec<Transcription>) {
        let Some(open) = transcription.open else {
            let mut path = vec![transcription.state];
            self.feed(transcription.state, &transcription.builder, value, &mut path, next);
            return;
        };

        let State::Reentrant { element, mandatory, out } = self.nfa.state(transcription.state)
        else {
            unreachable!("only reentrant states stay open");
        };
        if let Value::Token(token) = value {
            let kind = self.tree.token(token).kind();
            if element.accepts(&open.consumed, kind) {
                let open = Open {
                    region: TokenRegion::new(open.region.first, token),
                    consumed: open.consumed.push(kind),
                };
                let builder = transcription.builder.duplicate();
                admit(next, Transcription { state: transcription.state, builder, open: Some(open) });
            }
        }
        if element.can_close(&open.consumed) {
            let builder = transcription.builder.push(reentrant_info(element, *mandatory, open.region));
            for &target in out {
                let mut path = vec![target];
                self.feed(target, &builder, value, &mut path, next);
            }
        }
    }

    fn feed(
        &self,
        id: StateId,
        builder: &StructureBuilder,
        value: Value,
        path: &mut Vec<StateId>,
        next: &mut Vec<Transcription>,
    ) {
        let state = self.nfa.state(id);
        match state {
            State::SingleMatch { element, mandatory, out }
                if element.should_attempt_match(self.policy) == MatchMode::Consume =>
            {
                if let Some(region) = self.matches(element, value) {
                    let info = SeInfo { element: element.clone(), mandatory: *mandatory, region };
                    let builder = builder.push(info);
                    for &target in out {
                        admit(next, Transcription { state: target, builder: builder.duplicate(), open: None });
                    }
                }
            }
            State::Reentrant { element, .. }
                if self.mode(&StructureElement::Reentrant(element.clone())) == MatchMode::Consume =>
            {
                if let Value::Token(token) = value {
                    let kind = self.tree.token(token).kind();
                    if element.accepts(&Consumed::default(), kind) {
                        let open = Open {
                            region: TokenRegion::single(token),
                            consumed: Consumed::default().push(kind),
                        };
                        admit(next, Transcription { state: id, builder: builder.duplicate(), open: Some(open) });
                    }
                }
            }
            _ => {}
        }

        if let Some(builder) = self.pass(state, builder) {
            for &target in state.out() {
                if !path.contains(&target) {
                    path.push(target);
                    self.feed(target, &builder, value, path, next);
                    path.pop();
                }
            }
        }
    }

    /// End of input: one epsilon-only closure towards `End`.
    fn finish(&self, transcription: &Transcription, results: &mut Vec<Structure>) {
        match transcription.open {
            None => {
                let mut path = vec![transcription.state];
                self.close(transcription.state, &transcription.builder, &mut path, results);
            }
            Some(open) => {
                let State::Reentrant { element, mandatory, out } =
                    self.nfa.state(transcription.state)
                else {
                    unreachable!("only reentrant states stay open");
                };
                if element.can_close(&open.consumed) {
                    let info = reentrant_info(element, *mandatory, open.region);
                    let builder = transcription.builder.push(info);
                    for &target in out {
                        let mut path = vec![target];
                        self.close(target, &builder, &mut path, results);
                    }
                }
            }
        }
    }

    fn close(
        &self,
        id: StateId,
        builder: &StructureBuilder,
        path: &mut Vec<StateId>,
        results: &mut Vec<Structure>,
    ) {
        let state = self.nfa.state(id);
        if let State::End = state {
            let structure = builder.finish();
            if !results.contains(&structure) {
                results.push(structure);
            }
            return;
        }
        if let Some(builder) = self.pass(state, builder) {
            for &target in state.out() {
                if !path.contains(&target) {
                    path.push(target);
                    self.close(target, &builder, path, results);
                    path.pop();
                }
            }
        }
    }

    /// The builder after passing `state` without consuming a value, if that
    /// is possible.
    fn pass(&self, state: &State, builder: &StructureBuilder) -> Option<StructureBuilder> {
        let (element, mandatory) = match state {
            State::Split(_) => return Some(builder.duplicate()),
            State::End => return None,
            State::SingleMatch { element, mandatory, .. } => {
                if self.mode(element) != MatchMode::Skip {
                    return None;
                }
                (element.clone(), *mandatory)
            }
            State::Reentrant { element, mandatory, .. } => {
                let wrapped = StructureElement::Reentrant(element.clone());
                let passable = match self.mode(&wrapped) {
                    MatchMode::Skip => true,
                    MatchMode::Consume => element.can_close(&Consumed::default()),
                    MatchMode::Block => false,
                };
                if !passable {
                    return None;
                }
                (wrapped, *mandatory)
            }
        };
        Some(builder.push(SeInfo { element, mandatory, region: TokenRegion::EMPTY }))
    }

    fn mode(&self, element: &StructureElement) -> MatchMode {
        element.should_attempt_match(self.policy)
    }

    fn matches(&self, element: &StructureElement, value: Value) -> Option<TokenRegion> {
        match (element, value) {
            (StructureElement::LiteralToken(kind, text), Value::Token(token)) => {
                let data = self.tree.token(token);
                (data.kind() == *kind && data.text() == *text).then_some(TokenRegion::single(token))
            }
            (StructureElement::ChildOfKind(kind), Value::Child(child)) => {
                (self.tree.kind(child) == *kind).then(|| self.tree.region(child))
            }
            _ => None,
        }
    }
}

fn reentrant_info(element: &Reentrant, mandatory: bool, region: TokenRegion) -> SeInfo {
    SeInfo { element: StructureElement::Reentrant(element.clone()), mandatory, region }
}

fn admit(next: &mut Vec<Transcription>, transcription: Transcription) {
    if !next.contains(&transcription) {
        next.push(transcription);
    }
}

/// Own tokens interleaved with children. A child is fed at its first token;
/// children without tokens are fed right before the next located child, or
/// at the end.
pub fn complete_values(tree: &SyntaxTree, node: NodeId) -> Vec<Value> {
    let children = tree.children(node);
    let mut next_child = 0;
    let mut skip_until = None;
    let mut values = Vec::new();

    for token in tree.region_tokens(tree.region(node)) {
        if let Some(last) = skip_until {
            if token == last {
                skip_until = None;
            }
            continue;
        }

        let located = children[next_child..]
            .iter()
            .position(|&child| !tree.region(child).is_empty())
            .map(|offset| next_child + offset);
        if let Some(index) = located.filter(|&index| tree.region(children[index]).first == token) {
            values.extend(children[next_child..=index].iter().map(|&child| Value::Child(child)));
            next_child = index + 1;
            let region = tree.region(children[index]);
            if region.last != token {
                skip_until = Some(region.last);
            }
            continue;
        }
        values.push(Value::Token(token));
    }

    values.extend(children[next_child..].iter().map(|&child| Value::Child(child)));
    values
}

/// Picks the structure shape-equal to `previous`, else the one with the fewest
/// elements; equals resolve to the first found.
pub fn select(mut structures: Vec<Structure>, previous: Option<&Structure>) -> Option<Structure> {
    if let Some(previous) = previous
        && let Some(index) = structures.iter().position(|it| it.shape_eq(previous))
    {
        return Some(structures.swap_remove(index));
    }
    let index = structures.iter().enumerate().min_by_key(|(_, it)| it.len()).map(|(index, _)| index)?;
    Some(structures.swap_remove(index))
}

/// Parses `node` under `policy` and resolves the result to one structure.
///
/// A complete parse must be unambiguous; the other policies break ties with
/// [`select`].
pub fn parse(
    tree: &SyntaxTree,
    grammar: &Grammar,
    node: NodeId,
    policy: Policy,
    previous: Option<&Structure>,
) -> Result<Structure> {
    let kind = tree.kind(node);
    let matcher = Matcher::new(tree, grammar.nfa(), policy);
    let values = matcher.values(node);
    let mut structures = matcher.run(&values);

    if structures.is_empty() {
        return Err(FixError::mismatch(kind, format!("no structure matches under {policy:?}")));
    }
    if policy == Policy::Complete {
        if structures.len() > 1 {
            return Err(FixError::GrammarAmbiguity {
                kind: format!("{kind:?}"),
                count: structures.len(),
            });
        }
        return Ok(structures.swap_remove(0));
    }

    let count = structures.len();
    let structure = select(structures, previous)
        .ok_or_else(|| FixError::mismatch(kind, "no structure selected"))?;
    tracing::trace!(?kind, ?policy, count, len = structure.len(), "structure selected");
    Ok(structure)
}
