//! Undo and redo stacks of revert groups

use tracing::{debug, error, info, warn};

use super::Revertable;
use crate::core::{HistoryConfig, Renderer};
use crate::graph::Graph;

/// Snapshots recorded for one user action, reverted together
#[derive(Debug, Clone, Default)]
pub struct RevertGroup {
    entries: Vec<Revertable>,
}

impl RevertGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Revertable) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Revertable] {
        &self.entries
    }

    /// Revert newest first, returning the snapshots that undo this revert
    fn revert(&self, graph: &mut Graph, renderer: &mut dyn Renderer) -> RevertGroup {
        let mut inverse = RevertGroup::new();
        for entry in self.entries.iter().rev() {
            inverse.push(entry.capture_current(graph));
            if let Err(e) = entry.revert(graph, renderer) {
                error!(kind = entry.kind(), error = %e, "Revert abandoned");
            }
        }
        inverse
    }
}

/// Bounded undo and redo history
///
/// Every recorded group clears the redo stack. Undoing a group captures the
/// state it overwrites so that redo brings it back, and the other way round.
#[derive(Debug, Clone, Default)]
pub struct UndoRedoSystem {
    undo_stack: Vec<RevertGroup>,
    redo_stack: Vec<RevertGroup>,
    open_group: Option<RevertGroup>,
    open_depth: usize,
    config: HistoryConfig,
}

impl UndoRedoSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Start collecting snapshots into a single group; calls nest
    pub fn begin_group(&mut self) {
        self.open_depth += 1;
        if self.open_group.is_none() {
            self.open_group = Some(RevertGroup::new());
        }
    }

    /// Close the innermost group; the outermost one is committed if not empty
    pub fn end_group(&mut self) {
        if self.open_depth == 0 {
            warn!("end_group without matching begin_group");
            return;
        }
        self.open_depth -= 1;
        if self.open_depth == 0 {
            if let Some(group) = self.open_group.take() {
                if !group.is_empty() {
                    self.commit(group);
                }
            }
        }
    }

    /// Record a snapshot taken before a mutation
    pub fn record(&mut self, entry: Revertable) {
        debug!(kind = entry.kind(), valid = entry.is_valid(), "Recording snapshot");
        match self.open_group.as_mut() {
            Some(group) => group.push(entry),
            None => {
                let mut group = RevertGroup::new();
                group.push(entry);
                self.commit(group);
            }
        }
    }

    fn commit(&mut self, group: RevertGroup) {
        self.redo_stack.clear();
        push_bounded(&mut self.undo_stack, group, self.config.max_depth);
    }

    /// Revert the most recent group; false if there was nothing to undo
    pub fn undo(&mut self, graph: &mut Graph, renderer: &mut dyn Renderer) -> bool {
        let Some(group) = self.undo_stack.pop() else {
            warn!("Nothing to undo");
            return false;
        };
        info!(entries = group.len(), "Undo");
        let inverse = group.revert(graph, renderer);
        push_bounded(&mut self.redo_stack, inverse, self.config.max_depth);
        true
    }

    /// Re-apply the most recently undone group; false if there was nothing to redo
    pub fn redo(&mut self, graph: &mut Graph, renderer: &mut dyn Renderer) -> bool {
        let Some(group) = self.redo_stack.pop() else {
            warn!("Nothing to redo");
            return false;
        };
        info!(entries = group.len(), "Redo");
        let inverse = group.revert(graph, renderer);
        push_bounded(&mut self.undo_stack, inverse, self.config.max_depth);
        true
    }

    /// Forget the whole history, including a group being collected
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_group = None;
        self.open_depth = 0;
    }
}

fn push_bounded(stack: &mut Vec<RevertGroup>, group: RevertGroup, max_depth: usize) {
    stack.push(group);
    if stack.len() > max_depth {
        let excess = stack.len() - max_depth;
        stack.drain(..excess);
    }
}
