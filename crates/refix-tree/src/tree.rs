//! Mutable syntax tree over an arena-backed token chain.
//!
//! Nodes own their children through the node arena; the parent link is a
//! plain index. Structural edits only happen through [`SyntaxTree`] methods,
//! which keep `children` contiguous and maintain every child's parent and
//! index.

use std::fmt::Write as _;

use refix_errors::{FixError, Result};
use text_size::TextRange;

use crate::arena::{Arena, Key};
use crate::token::{RegionTokens, TokenData, TokenId, TokenRegion, TriviaTokens};
use crate::{SyntaxKind, SyntaxSet};

pub type NodeId = Key<NodeData>;

/// Attribute state read by reentrant grammar elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeAttrs {
    /// Identifier, literal, operator or primitive keyword text.
    pub image: Option<Box<str>>,
    pub array_depth: u32,
    pub modifiers: SyntaxSet,
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) index: u32,
    pub(crate) children: Vec<NodeId>,
    pub(crate) first_token: TokenId,
    pub(crate) last_token: TokenId,
    pub(crate) attrs: NodeAttrs,
    /// Original span including the first token's leading trivia.
    pub(crate) origin: Option<TextRange>,
    pub(crate) dirty_self: bool,
    pub(crate) dirty_children: bool,
}

impl NodeData {
    pub(crate) fn new(kind: SyntaxKind, parent: Option<NodeId>, index: u32) -> Self {
        Self {
            kind,
            parent,
            index,
            children: Vec::new(),
            first_token: TokenId::EMPTY,
            last_token: TokenId::EMPTY,
            attrs: NodeAttrs::default(),
            origin: None,
            dirty_self: false,
            dirty_children: false,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attrs(&self) -> &NodeAttrs {
        &self.attrs
    }

    pub fn origin(&self) -> Option<TextRange> {
        self.origin
    }

    pub fn region(&self) -> TokenRegion {
        TokenRegion { first: self.first_token, last: self.last_token }
    }

    pub fn dirty_self(&self) -> bool {
        self.dirty_self
    }

    pub fn dirty_children(&self) -> bool {
        self.dirty_children
    }
}

/// Where a token sits in the live chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Head,
    After(TokenId),
    Detached,
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) text: Box<str>,
    /// Always starts with the EMPTY sentinel.
    pub(crate) tokens: Arena<TokenData>,
    pub(crate) nodes: Arena<NodeData>,
    pub(crate) root: NodeId,
    pub(crate) head: TokenId,
    pub(crate) tail_trivia: Option<TokenId>,
}

impl SyntaxTree {
    /// The original source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// First token of the live chain.
    pub fn head(&self) -> TokenId {
        self.head
    }

    pub fn set_head(&mut self, head: TokenId) {
        self.head = head;
    }

    pub fn node(&self, node: NodeId) -> &NodeData {
        &self.nodes[node]
    }

    pub fn kind(&self, node: NodeId) -> SyntaxKind {
        self.nodes[node].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    pub fn attrs(&self, node: NodeId) -> &NodeAttrs {
        &self.nodes[node].attrs
    }

    pub fn region(&self, node: NodeId) -> TokenRegion {
        self.nodes[node].region()
    }

    pub fn set_region(&mut self, node: NodeId, region: TokenRegion) {
        let node = &mut self.nodes[node];
        node.first_token = region.first;
        node.last_token = region.last;
    }

    /// Returns an iterator of ancestors starting from this node.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), |&it| self.nodes[it].parent)
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|it| it == ancestor)
    }

    pub fn is_dirty(&self, node: NodeId) -> bool {
        let node = &self.nodes[node];
        node.dirty_self || node.dirty_children
    }

    pub fn clear_dirty(&mut self, node: NodeId) {
        let node = &mut self.nodes[node];
        node.dirty_self = false;
        node.dirty_children = false;
    }

    /// Pre-order walk of the subtree rooted at `node`.
    pub fn preorder(&self, node: NodeId) -> Preorder<'_> {
        Preorder { tree: self, stack: vec![node] }
    }

    pub fn token(&self, token: TokenId) -> &TokenData {
        &self.tokens[token]
    }

    /// Creates a detached token that has no original position.
    pub fn mint_token(&mut self, kind: SyntaxKind, text: impl Into<Box<str>>) -> TokenId {
        self.tokens.alloc(TokenData { kind, text: text.into(), origin: None, next: None, leading: None })
    }

    pub fn link(&mut self, token: TokenId, next: Option<TokenId>) {
        debug_assert!(!token.is_empty(), "cannot link the EMPTY sentinel");
        self.tokens[token].next = next;
    }

    pub fn region_tokens(&self, region: TokenRegion) -> RegionTokens<'_> {
        let current = if region.is_empty() { None } else { Some(region.first) };
        RegionTokens { tokens: &self.tokens, current, last: region.last }
    }

    /// All tokens reachable from the head of the live chain.
    pub fn live_tokens(&self) -> RegionTokens<'_> {
        let current = if self.head.is_empty() { None } else { Some(self.head) };
        RegionTokens { tokens: &self.tokens, current, last: TokenId::EMPTY }
    }

    pub fn leading_trivia(&self, token: TokenId) -> TriviaTokens<'_> {
        TriviaTokens { tokens: &self.tokens, current: self.tokens[token].leading }
    }

    pub fn tail_trivia(&self) -> TriviaTokens<'_> {
        TriviaTokens { tokens: &self.tokens, current: self.tail_trivia }
    }

    /// Locates the token linked to `node`'s first token.
    ///
    /// Only the region of the nearest ancestor that starts elsewhere is
    /// searched. Any link found there is rewritten again when that ancestor
    /// is synchronized, so a moved node never splices into a node that was
    /// already committed.
    pub fn attachment(&self, node: NodeId) -> Attachment {
        let first = self.region(node).first;
        if first.is_empty() {
            return Attachment::Detached;
        }
        for ancestor in self.ancestors(node).skip(1) {
            if self.region(ancestor).first != first {
                return self.linked_to(ancestor, first).map_or(Attachment::Detached, Attachment::After);
            }
        }
        if self.head == first { Attachment::Head } else { Attachment::Detached }
    }

    /// The token of `node`'s region whose `next` is `target`, stepping over
    /// whole child regions.
    fn linked_to(&self, node: NodeId, target: TokenId) -> Option<TokenId> {
        let region = self.region(node);
        if region.is_empty() {
            return None;
        }
        let mut children = self.nodes[node]
            .children
            .iter()
            .map(|&child| self.region(child))
            .filter(|region| !region.is_empty())
            .peekable();

        let mut current = region.first;
        loop {
            let step = children.next_if(|child| child.first == current).map_or(current, |child| child.last);
            let next = self.tokens[step].next;
            if next == Some(target) {
                return Some(step);
            }
            match next {
                Some(next) if step != region.last => current = next,
                _ => return None,
            }
        }
    }

    /// Tokens of `node`'s region that no child region covers.
    pub fn own_tokens(&self, node: NodeId) -> Vec<TokenId> {
        let mut children = self.nodes[node]
            .children
            .iter()
            .map(|&child| self.region(child))
            .filter(|region| !region.is_empty())
            .peekable();
        let mut skip_until = None;
        let mut own = Vec::new();

        for token in self.region_tokens(self.region(node)) {
            if let Some(last) = skip_until {
                if token == last {
                    skip_until = None;
                }
                continue;
            }
            if let Some(child) = children.next_if(|child| child.first == token) {
                if child.last != token {
                    skip_until = Some(child.last);
                }
                continue;
            }
            own.push(token);
        }

        own
    }

    /// Original range of a token including its leading trivia.
    pub fn token_range(&self, token: TokenId) -> Option<TextRange> {
        let data = &self.tokens[token];
        let end = data.origin?;
        let start = self.leading_trivia(token).find_map(|it| self.tokens[it].origin).unwrap_or(end);
        Some(TextRange::new(start.start(), end.end()))
    }

    pub fn node_origin(&self, node: NodeId) -> Option<TextRange> {
        self.nodes[node].origin
    }

    /// Renders `token` as it follows `prev` in the live chain.
    pub fn render_token(&self, out: &mut String, prev: Option<TokenId>, token: TokenId) {
        let data = &self.tokens[token];
        if data.leading.is_some() {
            for trivia in self.leading_trivia(token) {
                out.push_str(&self.tokens[trivia].text);
            }
        } else if let Some(prev) = prev {
            let prev = &self.tokens[prev];
            if data.is_minted() || prev.is_minted() {
                out.push_str(separator(prev.kind, data.kind));
            }
        }
        out.push_str(&data.text);
    }

    /// Renders the live tokens of `node`.
    pub fn stringify(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut prev = None;
        for token in self.region_tokens(self.region(node)) {
            self.render_token(&mut out, prev, token);
            prev = Some(token);
        }
        out
    }

    /// Renders the whole live chain, including trailing trivia.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut prev = None;
        for token in self.live_tokens() {
            self.render_token(&mut out, prev, token);
            prev = Some(token);
        }
        for trivia in self.tail_trivia() {
            out.push_str(&self.tokens[trivia].text);
        }
        out
    }

    /// Indented dump of the subtree: each node with its own tokens.
    pub fn debug_tree(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.debug_tree_impl(&mut out, node, 0);
        out
    }

    fn debug_tree_impl(&self, out: &mut String, node: NodeId, depth: usize) {
        let _ = write!(out, "{:indent$}{:?}", "", self.kind(node), indent = depth * 2);
        for token in self.own_tokens(node) {
            let _ = write!(out, " {:?}", self.tokens[token].text());
        }
        out.push('\n');
        for &child in self.children(node) {
            self.debug_tree_impl(out, child, depth + 1);
        }
    }
}

/// Separator rendered between two adjacent tokens without trivia.
pub fn separator(prev: SyntaxKind, next: SyntaxKind) -> &'static str {
    if prev.glues_right() || next.glues_left() { "" } else { " " }
}

// Structural edits.
impl SyntaxTree {
    /// Creates a detached node with no tokens, waiting to be synchronized.
    pub fn new_node(&mut self, kind: SyntaxKind) -> NodeId {
        let mut data = NodeData::new(kind, None, 0);
        data.dirty_self = true;
        self.nodes.alloc(data)
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        let len = self.nodes[parent].children.len();
        if index > len {
            return Err(FixError::malformed(format!(
                "insert index {index} out of bounds for {len} children"
            )));
        }
        self.check_insertable(parent, child)?;

        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        self.reindex(parent, index);
        self.mark_changed(parent);
        tracing::trace!(?parent, index, ?child, "inserted child");
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        self.check_index(parent, index)?;

        let child = self.nodes[parent].children.remove(index);
        self.nodes[child].parent = None;
        self.reindex(parent, index);
        self.mark_changed(parent);
        tracing::trace!(?parent, index, ?child, "removed child");
        Ok(child)
    }

    pub fn replace_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<NodeId> {
        self.check_index(parent, index)?;
        self.check_insertable(parent, child)?;

        let old = std::mem::replace(&mut self.nodes[parent].children[index], child);
        self.nodes[old].parent = None;
        self.nodes[child].parent = Some(parent);
        self.nodes[child].index = index as u32;
        self.mark_changed(parent);
        tracing::trace!(?parent, index, ?old, new = ?child, "replaced child");
        Ok(old)
    }

    pub fn set_image(&mut self, node: NodeId, image: impl Into<Box<str>>) {
        self.nodes[node].attrs.image = Some(image.into());
        self.mark_changed(node);
    }

    pub fn set_array_depth(&mut self, node: NodeId, depth: u32) {
        self.nodes[node].attrs.array_depth = depth;
        self.mark_changed(node);
    }

    pub fn set_modifier(&mut self, node: NodeId, modifier: SyntaxKind, enabled: bool) {
        self.nodes[node].attrs.modifiers.set(modifier, enabled);
        self.mark_changed(node);
    }

    fn check_index(&self, parent: NodeId, index: usize) -> Result<()> {
        let len = self.nodes[parent].children.len();
        if index >= len {
            return Err(FixError::malformed(format!(
                "child index {index} out of bounds for {len} children"
            )));
        }
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if child == self.root {
            return Err(FixError::malformed("the root cannot become a child"));
        }
        if let Some(current) = self.nodes[child].parent {
            return Err(FixError::malformed(format!(
                "{:?} is still attached to {current:?}",
                self.kind(child)
            )));
        }
        if self.is_ancestor(child, parent) {
            return Err(FixError::malformed(format!(
                "{:?} cannot be inserted into its own subtree",
                self.kind(child)
            )));
        }
        Ok(())
    }

    fn reindex(&mut self, parent: NodeId, from: usize) {
        for index in from..self.nodes[parent].children.len() {
            let child = self.nodes[parent].children[index];
            self.nodes[child].index = index as u32;
        }
    }

    fn mark_changed(&mut self, node: NodeId) {
        self.nodes[node].dirty_self = true;
        let mut parent = self.nodes[node].parent;
        while let Some(ancestor) = parent {
            let data = &mut self.nodes[ancestor];
            if data.dirty_children {
                break;
            }
            data.dirty_children = true;
            parent = data.parent;
        }
    }
}

pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(self.tree.children(node).iter().rev());
        Some(node)
    }
}
