//! Linear undo/redo over full scene snapshots.
//!
//! A snapshot is a frozen copy of the element list. Only structural edits
//! (add, remove, duplicate, drag start, draw commit) take one; attribute
//! edits mutate the live scene without touching history.

use lm_core::model::{Scene, SceneElement};
use std::collections::VecDeque;
use std::sync::Arc;

/// Immutable copy of the element list.
pub type Snapshot = Arc<[SceneElement]>;

pub struct History {
    /// Oldest first; the back is the next undo.
    past: VecDeque<Snapshot>,
    /// Top of the stack (last) is the next redo.
    future: Vec<Snapshot>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the current scene before a structural mutation.
    /// Starting a new branch drops the redo stack.
    pub fn snapshot(&mut self, scene: &Scene) {
        self.past.push_back(freeze(scene));
        if self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        self.future.clear();
        log::trace!("history: snapshot (past={})", self.past.len());
    }

    /// Restore the previous snapshot. Returns `false` when there is none.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(prev) = self.past.pop_back() else {
            return false;
        };
        self.future.push(freeze(scene));
        scene.elements = prev.to_vec();
        true
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push_back(freeze(scene));
        if self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        scene.elements = next.to_vec();
        true
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}

fn freeze(scene: &Scene) -> Snapshot {
    Arc::from(scene.elements.as_slice())
}
