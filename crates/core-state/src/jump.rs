//! Jump history.
//!
//! Motions flagged to save a jump location (`gg`, `G`) record the cursor's
//! offset before it moves. The list is bounded; the oldest entry is dropped
//! once `JUMP_HISTORY_MAX` is exceeded and an immediate repeat of the newest
//! entry is collapsed.

use std::collections::VecDeque;
use tracing::trace;

/// Maximum number of entries retained in the jump list (Vim's default).
pub const JUMP_HISTORY_MAX: usize = 100;

/// Destination for pre-jump cursor positions.
pub trait JumpSink {
    fn save_jump(&mut self, offset: usize);
}

#[derive(Debug, Clone, Default)]
pub struct JumpList {
    entries: VecDeque<usize>,
}

impl JumpList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<usize> {
        self.entries.back().copied()
    }

    /// Entries oldest first.
    pub fn entries(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }
}

impl JumpSink for JumpList {
    fn save_jump(&mut self, offset: usize) {
        if self.last() == Some(offset) {
            return;
        }
        self.entries.push_back(offset);
        if self.entries.len() > JUMP_HISTORY_MAX {
            self.entries.pop_front();
            trace!(target: "state.jumps", max = JUMP_HISTORY_MAX, "jump_list_trimmed");
        }
        trace!(target: "state.jumps", offset, depth = self.entries.len(), "jump_saved");
    }
}
