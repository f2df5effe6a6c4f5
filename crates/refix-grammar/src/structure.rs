use std::fmt::{self, Write as _};

use refix_tree::{SyntaxTree, TokenRegion};
use triomphe::Arc;

use crate::StructureElement;

/// One element of a structure and the tokens realizing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeInfo {
    pub element: StructureElement,
    pub mandatory: bool,
    pub region: TokenRegion,
}

/// Ordered mapping of grammar elements to the token regions realizing them.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Structure {
    elements: Box<[SeInfo]>,
}

impl Structure {
    pub fn elements(&self) -> &[SeInfo] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Pairwise equal elements, regions ignored.
    pub fn shape_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.elements.iter().zip(other.elements.iter()).all(|(a, b)| a.element == b.element)
    }

    /// First token of the first non-empty region to the last token of the last one.
    pub fn region(&self) -> TokenRegion {
        let mut regions = self.elements.iter().map(|info| info.region).filter(|it| !it.is_empty());
        match (regions.next(), regions.last()) {
            (Some(first), Some(last)) => TokenRegion::new(first.first, last.last),
            (Some(only), None) => only,
            _ => TokenRegion::EMPTY,
        }
    }

    /// One line per element with the text of its region.
    pub fn debug(&self, tree: &SyntaxTree) -> String {
        let mut out = String::new();
        for info in self.elements.iter() {
            let mandatory = if info.mandatory { "!" } else { "?" };
            let text = tree.region_tokens(info.region).map(|token| tree.token(token).text());
            let text = text.collect::<Vec<_>>().join(" ");
            let _ = writeln!(out, "{mandatory}{:?} {text:?}", info.element);
        }
        out
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

impl FromIterator<SeInfo> for Structure {
    fn from_iter<T: IntoIterator<Item = SeInfo>>(iter: T) -> Self {
        Self { elements: iter.into_iter().collect() }
    }
}

/// Persistent list of elements matched so far; branches share their prefix.
#[derive(Clone, Default)]
pub struct StructureBuilder {
    last: Option<Arc<Link>>,
    len: usize,
}

struct Link {
    info: SeInfo,
    prev: Option<Arc<Link>>,
}

impl StructureBuilder {
    pub fn push(&self, info: SeInfo) -> Self {
        let link = Link { info, prev: self.last.clone() };
        Self { last: Some(Arc::new(link)), len: self.len + 1 }
    }

    /// Copy for a new branch. Pushing onto either copy leaves the other intact.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements from the most recent one backwards.
    fn rev_iter(&self) -> impl Iterator<Item = &SeInfo> {
        std::iter::successors(self.last.as_deref(), |link| link.prev.as_deref()).map(|link| &link.info)
    }

    pub fn finish(&self) -> Structure {
        let mut elements = self.rev_iter().cloned().collect::<Vec<_>>();
        elements.reverse();
        Structure { elements: elements.into_boxed_slice() }
    }
}

impl PartialEq for StructureBuilder {
    fn eq(&self, other: &Self) -> bool {
        let same_list = match (&self.last, &other.last) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.len == other.len && (same_list || self.rev_iter().eq(other.rev_iter()))
    }
}

impl Eq for StructureBuilder {}

impl fmt::Debug for StructureBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.finish().fmt(f)
    }
}
