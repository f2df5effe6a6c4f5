//! Per-element token regeneration.

use refix_errors::{FixError, Result};
use refix_grammar::{Reentrant, StructureElement};
use refix_tree::SyntaxKind::{LEFT_BRACKET, RIGHT_BRACKET};
use refix_tree::{NodeId, SyntaxKind, SyntaxTree, TokenId, TokenRegion};

/// Tokens produced for one element, not yet linked into the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Realized {
    /// A region whose internal links are already in place.
    Region(TokenRegion),
    /// Tokens to be linked in this order.
    Tokens(Vec<TokenId>),
}

impl Realized {
    pub(crate) fn region(&self) -> TokenRegion {
        match self {
            Self::Region(region) => *region,
            Self::Tokens(tokens) => match (tokens.first(), tokens.last()) {
                (Some(&first), Some(&last)) => TokenRegion::new(first, last),
                _ => TokenRegion::EMPTY,
            },
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Stats {
    pub(crate) reused: usize,
    pub(crate) minted: usize,
}

/// Cursor over the node's children while its elements are synchronized.
pub(crate) struct ElementContext<'t> {
    pub(crate) tree: &'t mut SyntaxTree,
    pub(crate) node: NodeId,
    pub(crate) next_child: usize,
    pub(crate) stats: Stats,
}

impl ElementContext<'_> {
    pub(crate) fn synchronize(
        &mut self,
        element: &StructureElement,
        old: Option<TokenRegion>,
    ) -> Result<Realized> {
        let old = old.filter(|region| !region.is_empty());
        match element {
            StructureElement::LiteralToken(kind, text) => Ok(self.literal(*kind, text, old)),
            StructureElement::ChildOfKind(kind) => self.child(*kind),
            StructureElement::Reentrant(Reentrant::ArrayDims) => Ok(self.array_dims(old)),
            StructureElement::Reentrant(reentrant @ Reentrant::Modifiers(allowed)) => {
                Ok(self.modifiers(reentrant, allowed, old))
            }
            StructureElement::Reentrant(Reentrant::Image(class)) => {
                let image = self.tree.attrs(self.node).image.clone().ok_or_else(|| {
                    FixError::mismatch(self.tree.kind(self.node), "node has no image to spell")
                })?;
                if let Some(old) = old
                    && old.first == old.last
                    && self.tree.token(old.first).text() == &*image
                {
                    self.stats.reused += 1;
                    return Ok(Realized::Region(old));
                }
                let kind = class.kind_of(&image).ok_or_else(|| {
                    FixError::mismatch(
                        self.tree.kind(self.node),
                        format!("{image:?} cannot be spelled as {class:?}"),
                    )
                })?;
                Ok(Realized::Region(TokenRegion::single(self.mint(kind, &image))))
            }
        }
    }

    fn literal(&mut self, kind: SyntaxKind, text: &str, old: Option<TokenRegion>) -> Realized {
        if let Some(old) = old
            && old.first == old.last
        {
            let token = self.tree.token(old.first);
            if token.kind() == kind && token.text() == text {
                self.stats.reused += 1;
                return Realized::Region(old);
            }
        }
        Realized::Region(TokenRegion::single(self.mint(kind, text)))
    }

    fn child(&mut self, kind: SyntaxKind) -> Result<Realized> {
        let parent = self.node;
        let Some(&child) = self.tree.children(parent).get(self.next_child) else {
            return Err(FixError::mismatch(
                self.tree.kind(parent),
                format!("expected a {kind:?} child, none left"),
            ));
        };
        if self.tree.kind(child) != kind {
            return Err(FixError::mismatch(
                self.tree.kind(parent),
                format!("expected a {kind:?} child, found {:?}", self.tree.kind(child)),
            ));
        }
        self.next_child += 1;
        Ok(Realized::Region(self.tree.region(child)))
    }

    /// Keeps the leading bracket pairs and trims or extends to the declared depth.
    fn array_dims(&mut self, old: Option<TokenRegion>) -> Realized {
        let target = 2 * self.tree.attrs(self.node).array_depth as usize;
        let old = self.old_tokens(old);
        let keep = old.len().min(target) & !1;

        let mut tokens = old[..keep].to_vec();
        self.stats.reused += keep;
        while tokens.len() < target {
            tokens.push(self.mint(LEFT_BRACKET, "["));
            tokens.push(self.mint(RIGHT_BRACKET, "]"));
        }
        Realized::Tokens(tokens)
    }

    /// Retained keywords keep their relative order; new ones are minted in
    /// canonical order and merged in by rank.
    fn modifiers(
        &mut self,
        reentrant: &Reentrant,
        allowed: &[SyntaxKind],
        old: Option<TokenRegion>,
    ) -> Realized {
        let enabled = self.tree.attrs(self.node).modifiers;
        let mut retained = Vec::new();
        for token in self.old_tokens(old) {
            let kind = self.tree.token(token).kind();
            if enabled.contains(kind) {
                retained.push((reentrant.rank(kind), kind, token));
            }
        }
        self.stats.reused += retained.len();

        let mut minted = Vec::new();
        for (rank, &kind) in allowed.iter().enumerate() {
            if enabled.contains(kind) && !retained.iter().any(|&(_, old, _)| old == kind) {
                let text = kind.text().unwrap_or_default();
                minted.push((Some(rank), kind, self.mint(kind, text)));
            }
        }

        let mut tokens = Vec::with_capacity(retained.len() + minted.len());
        let mut retained = retained.into_iter().peekable();
        let mut minted = minted.into_iter().peekable();
        loop {
            let take_retained = match (retained.peek(), minted.peek()) {
                (Some(old), Some(new)) => old.0 <= new.0,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_retained { retained.next() } else { minted.next() };
            tokens.extend(next.map(|(_, _, token)| token));
        }
        Realized::Tokens(tokens)
    }

    fn old_tokens(&self, old: Option<TokenRegion>) -> Vec<TokenId> {
        old.map(|region| self.tree.region_tokens(region).collect()).unwrap_or_default()
    }

    fn mint(&mut self, kind: SyntaxKind, text: &str) -> TokenId {
        self.stats.minted += 1;
        self.tree.mint_token(kind, text)
    }
}
