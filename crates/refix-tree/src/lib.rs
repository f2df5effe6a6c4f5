//! Mutable syntax tree with an explicit token chain.
//!
//! Tokens and nodes live in arenas owned by [`SyntaxTree`]; every link
//! (token `next`, node parent, node boundaries) is an index, so detaching and
//! re-attaching a region only touches a handful of slots.

mod arena;
mod builder;
mod syntax_kind;
mod syntax_set;
mod token;
mod tree;
mod trivia;
#[cfg(test)]
mod tests;

pub use arena::{Arena, Key};
/// Incremental builder for handing a populated tree to the fix engine.
pub use builder::Builder;
/// Token and node kinds.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
pub use token::{RegionTokens, TokenData, TokenId, TokenRegion, TriviaTokens};
pub use tree::{Attachment, NodeAttrs, NodeData, NodeId, Preorder, SyntaxTree, separator};
/// Trivia pieces attached in front of tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
