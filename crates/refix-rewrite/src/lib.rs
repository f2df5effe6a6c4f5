//! Structural fixes applied to a syntax tree and reported as text edits.
//!
//! A [`FixSession`] owns the tree for the duration of a batch of fixes. Each
//! fix edits nodes through the session, which records the structural edits
//! per parent slot and captures baselines before the first edit of a node.
//! When the fix finishes the tree is synchronized, and a fix that fails at
//! any point is rolled back as a whole. [`FixSession::text_edits`] then
//! expresses everything kept as deletions and insertions against the
//! original source.

mod diff;
mod events;
mod session;
#[cfg(test)]
mod tests;

pub use crate::diff::{TextEdit, apply_edits, collect_text_operations};
pub use crate::events::{EventKind, EventRecorder, Merge, RewriteEvent, merge};
pub use crate::session::{Checkpoint, Fix, FixOutcome, FixSession, SessionConfig};
