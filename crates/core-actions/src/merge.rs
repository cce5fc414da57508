//! Anchor reconciliation when cursors merge.
//!
//! During per-cursor execution two selections can grow into each other and
//! the cursor set merges them, discarding one cursor. In visual mode the
//! survivor must keep extending from the anchor the user started the
//! discarded selection from, so the discarded cursor's anchor is copied into
//! every survivor it overlaps. Offsets are never touched.

use core_state::{Cursor, CursorListener, Selection};
use tracing::debug;

/// Overlap test used for merges: `discarded` starts inside `survivor`, or
/// ends inside it. A discarded range starting exactly at the survivor's end
/// does not count.
pub fn selections_overlap(discarded: Selection, survivor: Selection) -> bool {
    (discarded.start() < survivor.end() && discarded.start() >= survivor.start())
        || (discarded.end() <= survivor.end() && discarded.end() > survivor.start())
}

/// Removal listener installed by the dispatcher around per-cursor runs.
#[derive(Debug, Clone, Copy)]
pub struct MergeReconciler {
    visual_active: bool,
}

impl MergeReconciler {
    /// `visual_active` is the mode observed for the whole cycle.
    pub fn new(visual_active: bool) -> Self {
        Self { visual_active }
    }
}

impl CursorListener for MergeReconciler {
    fn cursor_removed(&mut self, removed: &Cursor, remaining: &mut [Cursor]) {
        if !self.visual_active {
            return;
        }
        let discarded = Selection::new(removed.selection_start(), removed.selection_end());
        for survivor in remaining.iter_mut() {
            let range = Selection::new(survivor.selection_start(), survivor.selection_end());
            if selections_overlap(discarded, range) {
                debug!(
                    target: "actions.merge",
                    survivor = ?survivor.id(),
                    discarded = ?removed.id(),
                    from = ?survivor.anchor,
                    to = ?removed.anchor,
                    "anchor_transplant"
                );
                survivor.anchor = removed.anchor;
            }
        }
    }
}
