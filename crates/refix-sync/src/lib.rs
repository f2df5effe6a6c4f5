//! Regenerates the token regions of edited nodes.
//!
//! Every node's last known structure is cached here. Before its first edit a
//! node's structure is captured with a complete parse and kept as its
//! baseline; the diff translator compares baselines against the structures
//! left behind by [`Synchronizer::synchronize`].

mod element;
#[cfg(test)]
mod tests;

use refix_errors::{FixError, Result};
use refix_grammar::{GrammarTable, Policy, SeInfo, Structure, parse};
use refix_tree::{Attachment, NodeId, SyntaxTree, TokenId, TokenRegion};
use rustc_hash::FxHashMap;

use crate::element::{ElementContext, Realized, Stats};

#[derive(Clone)]
pub struct Synchronizer<'g> {
    grammars: &'g dyn GrammarTable,
    structures: FxHashMap<NodeId, Structure>,
    baselines: FxHashMap<NodeId, Structure>,
    verify: bool,
}

impl<'g> Synchronizer<'g> {
    pub fn new(grammars: &'g dyn GrammarTable) -> Self {
        Self {
            grammars,
            structures: FxHashMap::default(),
            baselines: FxHashMap::default(),
            verify: false,
        }
    }

    /// Re-parses every synchronized node with a complete parse.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn grammars(&self) -> &'g dyn GrammarTable {
        self.grammars
    }

    /// Structure captured before the node's first edit.
    pub fn baseline(&self, node: NodeId) -> Option<&Structure> {
        self.baselines.get(&node)
    }

    /// Structure currently cached for the node.
    pub fn current(&self, node: NodeId) -> Option<&Structure> {
        self.structures.get(&node)
    }

    /// The node's structure, parsed from its tokens on first request.
    pub fn structure(&mut self, tree: &SyntaxTree, node: NodeId) -> Result<&Structure> {
        if !self.structures.contains_key(&node) {
            let grammars = self.grammars;
            let grammar = grammars.lookup(tree.kind(node))?;
            let structure = parse(tree, grammar, node, Policy::Complete, None)?;
            self.structures.insert(node, structure);
        }
        Ok(&self.structures[&node])
    }

    /// Captures baselines for `node` and its ancestors. Must run before the
    /// node is edited. Nodes created during the session have no baseline.
    pub fn capture(&mut self, tree: &SyntaxTree, node: NodeId) -> Result<()> {
        for node in tree.ancestors(node) {
            if self.baselines.contains_key(&node) {
                break;
            }
            if tree.node_origin(node).is_none() && !self.structures.contains_key(&node) {
                continue;
            }
            let structure = self.structure(tree, node)?.clone();
            self.baselines.insert(node, structure);
        }
        Ok(())
    }

    /// Brings the regions of `node` and its dirty descendants in line with
    /// their children and attributes. A clean node is left untouched.
    pub fn synchronize(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<()> {
        if !tree.is_dirty(node) {
            return Ok(());
        }
        for index in 0..tree.children(node).len() {
            let child = tree.children(node)[index];
            self.synchronize(tree, child)?;
        }
        self.resync(tree, node)
    }

    fn resync(&mut self, tree: &mut SyntaxTree, node: NodeId) -> Result<()> {
        let kind = tree.kind(node);
        let grammars = self.grammars;
        let grammar = grammars.lookup(kind)?;
        let old = match self.structures.get(&node) {
            Some(old) => old.clone(),
            None if tree.region(node).is_empty() => Structure::default(),
            None => self.structure(tree, node)?.clone(),
        };

        let policy = if tree.children(node).is_empty() && tree.region(node).is_empty() {
            Policy::Generate
        } else {
            Policy::ChildrenOnly
        };
        let shape = parse(tree, grammar, node, policy, Some(&old))?;

        let mut context =
            ElementContext { tree: &mut *tree, node, next_child: 0, stats: Stats::default() };
        let mut pieces = Vec::with_capacity(shape.len());
        let mut cursor = 0;
        for info in shape.elements() {
            let realized = if info.mandatory {
                let found = old.elements()[cursor..].iter().position(|it| it.mandatory);
                let old_region = match found {
                    Some(offset) => {
                        let old_info = &old.elements()[cursor + offset];
                        if old_info.element != info.element {
                            return Err(FixError::mismatch(
                                kind,
                                format!("expected {:?}, found {:?}", old_info.element, info.element),
                            ));
                        }
                        cursor += offset + 1;
                        Some(old_info.region)
                    }
                    None => {
                        cursor = old.len();
                        None
                    }
                };
                context.synchronize(&info.element, old_region)?
            } else {
                let peeked = old.elements().get(cursor).filter(|it| it.element == info.element);
                let realized = context.synchronize(&info.element, peeked.map(|it| it.region))?;
                if peeked.is_some_and(|it| it.region == realized.region()) {
                    cursor += 1;
                }
                realized
            };
            pieces.push(realized);
        }

        if context.next_child != context.tree.children(node).len() {
            return Err(FixError::mismatch(kind, "children left over after synchronization"));
        }
        let stats = context.stats;

        let structure = shape
            .elements()
            .iter()
            .zip(&pieces)
            .map(|(info, realized)| SeInfo { region: realized.region(), ..info.clone() })
            .collect::<Structure>();
        commit(tree, node, &pieces, structure.region());

        if self.verify {
            let reparsed = parse(tree, grammar, node, Policy::Complete, None)?;
            if reparsed != structure {
                return Err(FixError::mismatch(kind, "synchronized tokens do not parse back"));
            }
        }

        tracing::debug!(
            ?node,
            ?kind,
            elements = structure.len(),
            reused = stats.reused,
            minted = stats.minted,
            "synchronized node"
        );
        self.structures.insert(node, structure);
        tree.clear_dirty(node);
        Ok(())
    }
}

/// Links the realized pieces between the old region's neighbours and moves
/// every ancestor boundary that pointed at the old region.
///
/// A node that moved under a new parent has no neighbours yet; the new
/// parent links it when its own pieces are committed.
fn commit(tree: &mut SyntaxTree, node: NodeId, pieces: &[Realized], new: TokenRegion) {
    let old = tree.region(node);
    let (predecessor, successor) = if !old.is_empty() {
        (tree.attachment(node), tree.token(old.last).next())
    } else if node == tree.root() {
        (Attachment::Head, None)
    } else {
        (Attachment::Detached, None)
    };

    let mut last: Option<TokenId> = None;
    for piece in pieces {
        if let Realized::Tokens(tokens) = piece {
            for pair in tokens.windows(2) {
                tree.link(pair[0], Some(pair[1]));
            }
        }
        let region = piece.region();
        if region.is_empty() {
            continue;
        }
        if let Some(last) = last {
            tree.link(last, Some(region.first));
        }
        last = Some(region.last);
    }

    let attached = predecessor != Attachment::Detached;
    let entry = if new.is_empty() { successor } else { Some(new.first) };
    match predecessor {
        Attachment::Head => tree.set_head(entry.unwrap_or(TokenId::EMPTY)),
        Attachment::After(token) => tree.link(token, entry),
        Attachment::Detached => {}
    }
    if attached && let Some(last) = last {
        tree.link(last, successor);
    }

    tree.set_region(node, new);
    if old.is_empty() || old == new {
        return;
    }

    let before = match predecessor {
        Attachment::After(token) => token,
        _ => TokenId::EMPTY,
    };
    let mut child = node;
    while let Some(parent) = tree.parent(child) {
        let region = tree.region(parent);
        let first = if region.first != old.first {
            region.first
        } else if new.is_empty() {
            successor.unwrap_or(TokenId::EMPTY)
        } else {
            new.first
        };
        let last = if region.last != old.last {
            region.last
        } else if new.is_empty() {
            before
        } else {
            new.last
        };
        if (first, last) == (region.first, region.last) {
            break;
        }
        let collapsed = region.first == old.first && region.last == old.last && new.is_empty();
        let updated = if collapsed { TokenRegion::EMPTY } else { TokenRegion::new(first, last) };
        tracing::trace!(?parent, from = ?region, to = ?updated, "moved ancestor boundary");
        tree.set_region(parent, updated);
        child = parent;
    }
}
