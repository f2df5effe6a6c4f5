use drop_bomb::DropBomb;
use refix_errors::{Diagnostic, FixError, Result};
use refix_grammar::GrammarTable;
use refix_sync::Synchronizer;
use refix_tree::{NodeId, SyntaxKind, SyntaxTree};

use crate::diff::{TextEdit, collect_text_operations};
use crate::events::{EventRecorder, RewriteEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Re-parse every synchronized node and reject regions that do not parse
    /// back to the synchronized structure.
    pub verify_sync: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { verify_sync: cfg!(debug_assertions) }
    }
}

impl SessionConfig {
    pub fn with_verify_sync(mut self, verify_sync: bool) -> Self {
        self.verify_sync = verify_sync;
        self
    }
}

/// A unit of edits applied all-or-nothing by [`FixSession::apply_fix`].
pub trait Fix<'g> {
    fn apply(self, session: &mut FixSession<'g>) -> Result<()>;
}

impl<'g, F> Fix<'g> for F
where
    F: FnOnce(&mut FixSession<'g>) -> Result<()>,
{
    fn apply(self, session: &mut FixSession<'g>) -> Result<()> {
        self(session)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Applied,
    RolledBack(FixError),
}

/// Snapshot of a session taken before a fix.
pub struct Checkpoint<'g> {
    tree: SyntaxTree,
    sync: Synchronizer<'g>,
    recorder: EventRecorder,
    bomb: DropBomb,
}

impl Checkpoint<'_> {
    /// Keeps everything done since the checkpoint was taken.
    pub fn commit(mut self) {
        self.bomb.defuse();
    }
}

/// Edits one tree, records them, and translates them into text edits.
///
/// Structural edits go through the session so that every parent's slots are
/// recorded and every edited node has its baseline captured first. An edit
/// that fails may leave the session half-applied; [`FixSession::apply_fix`]
/// rolls such a fix back.
pub struct FixSession<'g> {
    tree: SyntaxTree,
    sync: Synchronizer<'g>,
    recorder: EventRecorder,
}

impl<'g> FixSession<'g> {
    pub fn new(tree: SyntaxTree, grammars: &'g dyn GrammarTable) -> Self {
        Self::with_config(tree, grammars, SessionConfig::default())
    }

    pub fn with_config(tree: SyntaxTree, grammars: &'g dyn GrammarTable, config: SessionConfig) -> Self {
        let sync = Synchronizer::new(grammars).with_verify(config.verify_sync);
        Self { tree, sync, recorder: EventRecorder::new() }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }

    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    pub fn synchronizer(&self) -> &Synchronizer<'g> {
        &self.sync
    }

    pub fn new_node(&mut self, kind: SyntaxKind) -> NodeId {
        self.tree.new_node(kind)
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.sync.capture(&self.tree, parent)?;
        self.recorder.record(&self.tree, RewriteEvent::insert(parent, index, child))?;
        self.tree.insert_child(parent, index, child)
    }

    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let old = self.child(parent, index)?;
        self.sync.capture(&self.tree, parent)?;
        self.recorder.record(&self.tree, RewriteEvent::remove(parent, index, old))?;
        self.tree.remove_child(parent, index)
    }

    pub fn replace_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<NodeId> {
        let old = self.child(parent, index)?;
        self.sync.capture(&self.tree, parent)?;
        self.recorder.record(&self.tree, RewriteEvent::replace(parent, index, old, child))?;
        self.tree.replace_child(parent, index, child)
    }

    pub fn set_image(&mut self, node: NodeId, image: impl Into<Box<str>>) -> Result<()> {
        self.sync.capture(&self.tree, node)?;
        self.tree.set_image(node, image);
        Ok(())
    }

    pub fn set_array_depth(&mut self, node: NodeId, depth: u32) -> Result<()> {
        self.sync.capture(&self.tree, node)?;
        self.tree.set_array_depth(node, depth);
        Ok(())
    }

    pub fn set_modifier(&mut self, node: NodeId, modifier: SyntaxKind, enabled: bool) -> Result<()> {
        if !modifier.is_modifier() {
            return Err(FixError::malformed(format!("{modifier:?} is not a modifier")));
        }
        self.sync.capture(&self.tree, node)?;
        self.tree.set_modifier(node, modifier, enabled);
        Ok(())
    }

    fn child(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        let children = self.tree.children(parent);
        children.get(index).copied().ok_or_else(|| {
            FixError::malformed(format!(
                "child index {index} out of bounds for {} children",
                children.len()
            ))
        })
    }

    /// Regenerates the regions of every node edited so far.
    pub fn synchronize(&mut self) -> Result<()> {
        let root = self.tree.root();
        self.sync.synchronize(&mut self.tree, root)
    }

    pub fn checkpoint(&self) -> Checkpoint<'g> {
        Checkpoint {
            tree: self.tree.clone(),
            sync: self.sync.clone(),
            recorder: self.recorder.clone(),
            bomb: DropBomb::new("Checkpoint must be committed or rolled back"),
        }
    }

    /// Restores the session to `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint<'g>) {
        let Checkpoint { tree, sync, recorder, mut bomb } = checkpoint;
        bomb.defuse();
        self.tree = tree;
        self.sync = sync;
        self.recorder = recorder;
    }

    /// Runs `fix` and synchronizes the tree. On error every edit the fix made
    /// is undone and the error is returned.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn apply_fix<F: Fix<'g>>(&mut self, fix: F) -> Result<()> {
        let checkpoint = self.checkpoint();
        match fix.apply(self).and_then(|()| self.synchronize()) {
            Ok(()) => {
                checkpoint.commit();
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "fix rolled back");
                self.rollback(checkpoint);
                Err(error)
            }
        }
    }

    pub fn apply_fixes<F: Fix<'g>>(&mut self, fixes: impl IntoIterator<Item = F>) -> Vec<FixOutcome> {
        fixes
            .into_iter()
            .map(|fix| match self.apply_fix(fix) {
                Ok(()) => FixOutcome::Applied,
                Err(error) => FixOutcome::RolledBack(error),
            })
            .collect()
    }

    /// Edits of the original text that produce the current rendering.
    pub fn text_edits(&self) -> Result<Vec<TextEdit>> {
        collect_text_operations(&self.tree, &self.sync, &self.recorder, self.tree.root())
    }

    /// Reports a rolled back fix at `node`'s original position.
    pub fn report(&self, error: &FixError, node: NodeId) -> Diagnostic {
        let range = self.tree.node_origin(node).unwrap_or_default();
        Diagnostic::from_error(error, range)
    }
}
