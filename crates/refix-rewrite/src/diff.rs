//! Translation of a synchronized tree into edits of the original text.
//!
//! The walk visits the live tokens in order and keeps an anchor at the end of
//! the last original token it kept. Minted tokens and the regions of new
//! children become insertions at the anchor. Children removed or replaced by
//! the recorded events, and own tokens that disappeared from a node's
//! baseline, become deletions of their original ranges.

use refix_errors::{FixError, Result};
use refix_grammar::{Value, complete_values};
use refix_sync::Synchronizer;
use refix_tree::{NodeId, SyntaxTree, TokenId, TokenRegion, separator};
use rustc_hash::FxHashSet;
use text_size::{TextRange, TextSize};

use crate::events::EventRecorder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEdit {
    Delete { range: TextRange },
    Insert { offset: TextSize, text: String },
}

impl TextEdit {
    pub fn offset(&self) -> TextSize {
        match self {
            Self::Delete { range } => range.start(),
            Self::Insert { offset, .. } => *offset,
        }
    }
}

/// Edits turning the original text of `tree` into its current rendering,
/// ordered by offset with deletions first.
pub fn collect_text_operations(
    tree: &SyntaxTree,
    sync: &Synchronizer<'_>,
    recorder: &EventRecorder,
    root: NodeId,
) -> Result<Vec<TextEdit>> {
    let mut walk = Walk { tree, sync, recorder, prev: None, anchor: TextSize::new(0), edits: Vec::new() };
    walk.node(root)?;

    let mut edits = walk.edits;
    edits.sort_by_key(|edit| (edit.offset(), matches!(edit, TextEdit::Insert { .. })));
    tracing::debug!(edits = edits.len(), "collected text operations");
    Ok(edits)
}

/// Applies edits sorted by [`collect_text_operations`] to `text`.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in edits {
        match edit {
            TextEdit::Delete { range } => {
                let start = usize::from(range.start()).max(cursor);
                out.push_str(&text[cursor..start]);
                cursor = usize::from(range.end()).max(cursor);
            }
            TextEdit::Insert { offset, text: inserted } => {
                let offset = usize::from(*offset).max(cursor);
                out.push_str(&text[cursor..offset]);
                out.push_str(inserted);
                cursor = offset;
            }
        }
    }
    out.push_str(&text[cursor..]);
    out
}

struct Walk<'a, 'g> {
    tree: &'a SyntaxTree,
    sync: &'a Synchronizer<'g>,
    recorder: &'a EventRecorder,
    /// Last live token visited.
    prev: Option<TokenId>,
    /// End of the last original token kept.
    anchor: TextSize,
    edits: Vec<TextEdit>,
}

impl Walk<'_, '_> {
    fn node(&mut self, node: NodeId) -> Result<()> {
        let tree = self.tree;
        let sync = self.sync;
        let Some(baseline) = sync.baseline(node) else {
            self.keep(tree.region(node));
            return Ok(());
        };

        let fresh = self.fresh_children(node)?;
        let mut next_child = 0;
        for value in complete_values(tree, node) {
            match value {
                Value::Token(token) if tree.token(token).is_minted() => {
                    self.insert(TokenRegion::single(token));
                }
                Value::Token(token) => self.keep(TokenRegion::single(token)),
                Value::Child(child) => {
                    let is_fresh = fresh.get(next_child).copied().unwrap_or(false);
                    next_child += 1;
                    if is_fresh {
                        self.insert(tree.region(child));
                    } else {
                        self.node(child)?;
                    }
                }
            }
        }

        if let Some(slots) = self.recorder.slots(node) {
            for old in slots.iter().flatten().filter_map(|event| event.old) {
                if let Some(range) = tree.node_origin(old) {
                    self.edits.push(TextEdit::Delete { range });
                }
            }
        }

        let own = tree.own_tokens(node).into_iter().collect::<FxHashSet<_>>();
        for info in baseline.elements().iter().filter(|info| !info.element.is_child()) {
            for token in tree.region_tokens(info.region) {
                if !own.contains(&token)
                    && let Some(range) = tree.token_range(token)
                {
                    self.edits.push(TextEdit::Delete { range });
                }
            }
        }
        Ok(())
    }

    /// Whether each current child of `node` entered it through an event.
    fn fresh_children(&self, node: NodeId) -> Result<Vec<bool>> {
        let len = self.tree.children(node).len();
        let fresh = match self.recorder.slots(node) {
            None => vec![false; len],
            Some(slots) => slots
                .iter()
                .filter(|slot| slot.is_none_or(|event| event.is_present()))
                .map(Option::is_some)
                .collect(),
        };
        if fresh.len() != len {
            return Err(FixError::malformed(format!(
                "{} present slots recorded for {len} children of {node:?}",
                fresh.len()
            )));
        }
        Ok(fresh)
    }

    /// Keeps an original region in place.
    fn keep(&mut self, region: TokenRegion) {
        if region.is_empty() {
            return;
        }
        let tree = self.tree;
        let first = tree.token(region.first);
        if first.leading().is_none()
            && let Some(prev) = self.prev
            && tree.token(prev).is_minted()
        {
            let gap = separator(tree.token(prev).kind(), first.kind());
            self.push_insert(gap);
        }
        self.prev = Some(region.last);
        if let Some(origin) = tree.token(region.last).origin() {
            self.anchor = origin.end();
        }
    }

    /// Inserts the rendering of a region at the anchor.
    fn insert(&mut self, region: TokenRegion) {
        let tree = self.tree;
        let mut text = String::new();
        for token in tree.region_tokens(region) {
            tree.render_token(&mut text, self.prev, token);
            self.prev = Some(token);
        }
        self.push_insert(&text);
    }

    fn push_insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.edits.last_mut() {
            Some(TextEdit::Insert { offset, text: pending }) if *offset == self.anchor => {
                pending.push_str(text);
            }
            _ => self.edits.push(TextEdit::Insert { offset: self.anchor, text: text.to_owned() }),
        }
    }
}
