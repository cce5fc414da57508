//! `<BS>` / `<Del>` in select mode: delete every selection, then insert.

use super::{DispatchResult, finish_cycle};
use crate::Command;
use core_state::{Session, StickyColumn};
use core_text::{TextBuffer, TextBufferMut};
use tracing::debug;

pub(crate) fn handle_select_delete(command: &Command, session: &mut Session) -> DispatchResult {
    if !session.mode.in_select_mode() {
        return DispatchResult::failed();
    }
    // Ascending order; every removal shifts the cursors after it left by the
    // number of chars already removed.
    let mut removed = 0usize;
    for id in session.cursors.ids_by_offset() {
        let Some(cursor) = session.cursors.get_mut(id) else {
            continue;
        };
        let (start, end) = (cursor.selection_start(), cursor.selection_end());
        let start = start.saturating_sub(removed);
        let end = end.saturating_sub(removed);
        let text = session.buffer.remove(start..end);
        debug!(target: "actions.dispatch", cursor = ?id, start, chars = text.chars().count(), "select_delete");
        removed += text.chars().count();
        cursor.offset = start;
        cursor.clear_selection();
        cursor.last_column = StickyColumn::Column(session.buffer.column_of(start));
    }
    if let Some(to) = command.exit_mode() {
        session.mode.transition(to);
    }
    finish_cycle(session, DispatchResult::dirty())
}
