//! Incremental builder used by frontends to hand over a populated tree.

use text_size::{TextRange, TextSize};

use crate::arena::Arena;
use crate::token::{TokenData, TokenId};
use crate::tree::{NodeAttrs, NodeData, NodeId, SyntaxTree};
use crate::{SyntaxKind, TriviaPiece};

/// Builds a `SyntaxTree` from start/token/finish events.
pub struct Builder {
    text: Box<str>,
    tokens: Arena<TokenData>,
    nodes: Arena<NodeData>,
    opened: Vec<NodeId>,
    text_len: TextSize,
    head: TokenId,
    last_token: Option<TokenId>,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_TREE_SIZE: usize = 1024;

impl Builder {
    /// Creates a new builder for `text`.
    ///
    /// The token arena is seeded with the EMPTY sentinel at index 0.
    pub fn new(text: &str) -> Self {
        let mut tokens = Arena::with_capacity(DEFAULT_TREE_SIZE);
        tokens.alloc(TokenData::tombstone());
        Self {
            text: text.into(),
            tokens,
            nodes: Arena::with_capacity(DEFAULT_TREE_SIZE),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            text_len: TextSize::new(0),
            head: TokenId::EMPTY,
            last_token: None,
        }
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        let parent = self.opened.last().copied();
        let index = parent.map_or(0, |parent| self.nodes[parent].children.len() as u32);
        let node = self.nodes.alloc(NodeData::new(kind, parent, index));
        if let Some(parent) = parent {
            self.nodes[parent].children.push(node);
        } else {
            assert_eq!(node.index(), 0, "a tree has exactly one root");
        }
        self.opened.push(node);
    }

    /// Finishes the most recently started node.
    pub fn finish_node(&mut self) {
        let node = self.opened.pop().expect("no opened nodes?");
        let region = self.nodes[node].region();
        if !region.is_empty() {
            let start = self.token_start(region.first);
            let end = self.tokens[region.last].origin.map_or(start, TextRange::end);
            self.nodes[node].origin = Some(TextRange::new(start, end));
        }
    }

    /// Attributes of the most recently started node.
    pub fn attrs(&mut self) -> &mut NodeAttrs {
        let node = *self.opened.last().expect("no opened nodes?");
        &mut self.nodes[node].attrs
    }

    /// Adds a token with its leading trivia to the current node.
    pub fn token(
        &mut self,
        leading_trivia: impl ExactSizeIterator<Item = TriviaPiece>,
        kind: SyntaxKind,
        text_len: TextSize,
    ) {
        assert!(!self.opened.is_empty(), "tokens must belong to a node");
        let leading = self.trivia(leading_trivia);
        let range = self.advance(text_len);
        let token = self.tokens.alloc(TokenData {
            kind,
            text: self.text[range].into(),
            origin: Some(range),
            next: None,
            leading,
        });
        match self.last_token {
            Some(last) => self.tokens[last].next = Some(token),
            None => self.head = token,
        }
        self.last_token = Some(token);
        self.update_first_last_tokens(token);
    }

    /// Allocates a chain of trivia tokens and returns its first link.
    fn trivia(&mut self, pieces: impl ExactSizeIterator<Item = TriviaPiece>) -> Option<TokenId> {
        let (_, pieces) = ensure_exact_size_iter(pieces);
        let mut first = None;
        let mut prev: Option<TokenId> = None;
        for piece in pieces {
            let range = self.advance(piece.len);
            let token = self.tokens.alloc(TokenData {
                kind: piece.kind.syntax_kind(),
                text: self.text[range].into(),
                origin: Some(range),
                next: None,
                leading: None,
            });
            match prev {
                Some(prev) => self.tokens[prev].next = Some(token),
                None => first = Some(token),
            }
            prev = Some(token);
        }
        first
    }

    fn advance(&mut self, len: TextSize) -> TextRange {
        let range = TextRange::at(self.text_len, len);
        self.text_len += len;
        assert!(self.text.is_char_boundary(usize::from(self.text_len)));
        range
    }

    fn token_start(&self, token: TokenId) -> TextSize {
        let data = &self.tokens[token];
        data.leading
            .and_then(|trivia| self.tokens[trivia].origin)
            .or(data.origin)
            .map_or(TextSize::new(0), TextRange::start)
    }

    /// Updates token ranges for all open ancestor nodes.
    fn update_first_last_tokens(&mut self, token: TokenId) {
        for &node in &self.opened {
            let node = &mut self.nodes[node];
            // The first token seen inside a node is both its first and last
            // token; later tokens only move the end.
            if node.first_token.is_empty() {
                node.first_token = token;
            }
            node.last_token = token;
        }
    }

    /// Finishes building; trailing trivia becomes the tree's tail.
    pub fn finish(mut self, tail_trivia: impl ExactSizeIterator<Item = TriviaPiece>) -> SyntaxTree {
        assert!(self.opened.is_empty());
        assert!(self.nodes.len() != 0, "a tree needs a root node");
        let tail_trivia = self.trivia(tail_trivia);
        assert_eq!(usize::from(self.text_len), self.text.len(), "tokens must cover the text");

        SyntaxTree {
            text: std::mem::take(&mut self.text),
            tokens: std::mem::take(&mut self.tokens),
            nodes: std::mem::take(&mut self.nodes),
            root: NodeId::new(0),
            head: self.head,
            tail_trivia,
        }
    }
}

/// Ensures an `ExactSizeIterator` has at least as reported items, for safety.
///
/// Note: you must use the returned len, not a len you saved from before
/// (otherwise a malicious iterator could return different lengths).
#[inline]
fn ensure_exact_size_iter<T>(
    mut iter: impl ExactSizeIterator<Item = T>,
) -> (usize, impl Iterator<Item = T>) {
    let len = iter.len();
    let iter = (0..len)
        .map(move |_| iter.next().unwrap_or_else(|| panic!("iter should have {len} items")));
    (len, iter)
}
