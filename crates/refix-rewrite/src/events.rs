//! Rewrite events, merged per parent slot.
//!
//! Every parent that sees a structural edit gets a slot array seeded with one
//! empty slot per original child. An empty slot is an original child left in
//! place; a slot holding a `Remove` no longer stands for a current child.

use refix_errors::{FixError, Result};
use refix_tree::{NodeId, SyntaxTree};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Insert,
    Replace,
    Remove,
}

/// A single-slot structural edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteEvent {
    pub kind: EventKind,
    pub parent: NodeId,
    /// Child index at the time the edit was issued.
    pub index: usize,
    pub old: Option<NodeId>,
    pub new: Option<NodeId>,
}

impl RewriteEvent {
    pub fn insert(parent: NodeId, index: usize, new: NodeId) -> Self {
        Self { kind: EventKind::Insert, parent, index, old: None, new: Some(new) }
    }

    pub fn replace(parent: NodeId, index: usize, old: NodeId, new: NodeId) -> Self {
        Self { kind: EventKind::Replace, parent, index, old: Some(old), new: Some(new) }
    }

    pub fn remove(parent: NodeId, index: usize, old: NodeId) -> Self {
        Self { kind: EventKind::Remove, parent, index, old: Some(old), new: None }
    }

    /// Whether a child occupies the slot after this event.
    pub fn is_present(&self) -> bool {
        self.kind != EventKind::Remove
    }
}

/// Result of recording a new event on a slot that already holds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// The slot now holds this event.
    Replace(RewriteEvent),
    /// The new event takes its own slot in front of the old one.
    KeepBoth,
    /// The events cancel out and the slot disappears.
    Cancel,
}

pub fn merge(old: &RewriteEvent, new: &RewriteEvent) -> Result<Merge> {
    use EventKind::*;

    if old.kind != Remove && new.kind != Insert && new.old != old.new {
        return Err(FixError::invalid_merge(
            new.index,
            format!("{:?} of {:?} does not follow {:?} of {:?}", new.kind, new.old, old.kind, old.new),
        ));
    }

    let merged = match (old.kind, new.kind) {
        (Insert | Replace, Insert) => Merge::KeepBoth,
        (Insert, Replace) => Merge::Replace(RewriteEvent { kind: Insert, old: None, ..*new }),
        (Insert, Remove) => Merge::Cancel,
        (Replace, Replace | Remove) => Merge::Replace(RewriteEvent { old: old.old, ..*new }),
        (Remove, Insert) => Merge::Replace(RewriteEvent { kind: Replace, old: old.old, ..*new }),
        (Remove, Replace | Remove) => {
            return Err(FixError::invalid_merge(
                new.index,
                format!("{:?} followed by {:?}", old.kind, new.kind),
            ));
        }
    };
    Ok(merged)
}

#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    slots: FxHashMap<NodeId, Vec<Option<RewriteEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots of `parent`, or `None` if it never saw a structural edit.
    pub fn slots(&self, parent: NodeId) -> Option<&[Option<RewriteEvent>]> {
        self.slots.get(&parent).map(Vec::as_slice)
    }

    /// Records `event`. Must run before the edit is applied to `tree`.
    pub fn record(&mut self, tree: &SyntaxTree, event: RewriteEvent) -> Result<()> {
        if let Some(old) = event.old
            && let Some(slots) = self.slots.get(&event.parent)
            && let Some(removed) =
                slots.iter().flatten().find(|it| !it.is_present() && it.old == Some(old))
        {
            merge(removed, &event)?;
        }
        let children = tree.children(event.parent);
        validate(children, &event)?;

        let slots = self.slots.entry(event.parent).or_insert_with(|| vec![None; children.len()]);

        let position = match event.kind {
            EventKind::Insert => insert_position(slots, event.index),
            EventKind::Replace | EventKind::Remove => present_position(slots, event.index)
                .ok_or_else(|| FixError::malformed("event slots are out of sync with the children"))?,
        };

        match slots.get(position).copied().flatten() {
            None if event.kind == EventKind::Insert => slots.insert(position, Some(event)),
            None => slots[position] = Some(event),
            Some(old) => match merge(&old, &event)? {
                Merge::Replace(merged) => slots[position] = Some(merged),
                Merge::KeepBoth => slots.insert(position, Some(event)),
                Merge::Cancel => _ = slots.remove(position),
            },
        }

        tracing::debug!(?event, position, "recorded rewrite event");
        Ok(())
    }
}

fn validate(children: &[NodeId], event: &RewriteEvent) -> Result<()> {
    let len = children.len();
    match (event.kind, event.old, event.new) {
        (EventKind::Insert, None, Some(_)) if event.index <= len => Ok(()),
        (EventKind::Insert, None, Some(_)) => Err(FixError::malformed(format!(
            "insert index {} out of bounds for {len} children",
            event.index
        ))),
        (EventKind::Replace, Some(old), Some(_)) | (EventKind::Remove, Some(old), None) => {
            match children.get(event.index) {
                Some(&child) if child == old => Ok(()),
                Some(&child) => Err(FixError::malformed(format!(
                    "child {} is {child:?}, not {old:?}",
                    event.index
                ))),
                None => Err(FixError::malformed(format!(
                    "child index {} out of bounds for {len} children",
                    event.index
                ))),
            }
        }
        (kind, ..) => Err(FixError::malformed(format!("{kind:?} is missing its nodes"))),
    }
}

/// The leftmost slot preceded by exactly `index` present slots.
fn insert_position(slots: &[Option<RewriteEvent>], index: usize) -> usize {
    let mut present = 0;
    for (position, slot) in slots.iter().enumerate() {
        if present == index {
            return position;
        }
        if slot.is_none_or(|event| event.is_present()) {
            present += 1;
        }
    }
    slots.len()
}

/// The slot of the `index`-th present child.
fn present_position(slots: &[Option<RewriteEvent>], index: usize) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none_or(|event| event.is_present()))
        .nth(index)
        .map(|(position, _)| position)
}
