//! Singly linked token chain with leading trivia.

use text_size::TextRange;

use crate::SyntaxKind;
use crate::arena::Key;

pub type TokenId = Key<TokenData>;

impl Key<TokenData> {
    /// Sentinel standing for "no tokens". Never linked into a chain.
    pub const EMPTY: Self = Key::new(0);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// A lexical token. Everything except `next` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub(crate) kind: SyntaxKind,
    pub(crate) text: Box<str>,
    /// Range of `text` in the original source; `None` for minted tokens.
    pub(crate) origin: Option<TextRange>,
    pub(crate) next: Option<TokenId>,
    /// First trivia token in front of this one, linked through `next`.
    pub(crate) leading: Option<TokenId>,
}

impl TokenData {
    pub(crate) fn tombstone() -> Self {
        Self { kind: SyntaxKind::TOMBSTONE, text: "".into(), origin: None, next: None, leading: None }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Option<TextRange> {
        self.origin
    }

    pub fn next(&self) -> Option<TokenId> {
        self.next
    }

    pub fn leading(&self) -> Option<TokenId> {
        self.leading
    }

    pub fn is_minted(&self) -> bool {
        self.origin.is_none()
    }
}

/// Inclusive `[first, last]` span of a token chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenRegion {
    pub first: TokenId,
    pub last: TokenId,
}

impl TokenRegion {
    pub const EMPTY: Self = Self { first: TokenId::EMPTY, last: TokenId::EMPTY };

    pub fn new(first: TokenId, last: TokenId) -> Self {
        debug_assert_eq!(first.is_empty(), last.is_empty(), "half-empty region");
        Self { first, last }
    }

    pub fn single(token: TokenId) -> Self {
        Self { first: token, last: token }
    }

    pub fn is_empty(self) -> bool {
        self.first.is_empty()
    }
}

impl std::fmt::Debug for TokenRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("[]")
        } else {
            write!(f, "[{:?}..{:?}]", self.first, self.last)
        }
    }
}

/// Iterator over a region, following `next` from `first` to `last`.
#[derive(Clone)]
pub struct RegionTokens<'a> {
    pub(crate) tokens: &'a crate::arena::Arena<TokenData>,
    pub(crate) current: Option<TokenId>,
    pub(crate) last: TokenId,
}

impl Iterator for RegionTokens<'_> {
    type Item = TokenId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current =
            if current == self.last { None } else { self.tokens[current].next };
        Some(current)
    }
}

/// Iterator over a chain of trivia tokens.
#[derive(Clone)]
pub struct TriviaTokens<'a> {
    pub(crate) tokens: &'a crate::arena::Arena<TokenData>,
    pub(crate) current: Option<TokenId>,
}

impl Iterator for TriviaTokens<'_> {
    type Item = TokenId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tokens[current].next;
        Some(current)
    }
}
