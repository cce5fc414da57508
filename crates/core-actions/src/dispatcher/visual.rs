//! Visual-mode commands that are not motions: `o`, `O` and `A`.

use super::{DispatchResult, finish_cycle};
use crate::Command;
use crate::visual::{self, swap_block_columns, swap_ends};
use core_state::{Session, StickyColumn};
use core_text::{TextBuffer, TextBufferMut};
use tracing::debug;

/// Rebuild the block rows from the primary cursor.
pub(super) fn sync_rows(session: &mut Session) {
    visual::sync_block_rows(&session.buffer, &mut session.cursors);
}

/// `o` (and `O` outside block submode): swap anchor and caret of every
/// cursor. Succeeds only if every cursor swapped; cursors that did swap stay
/// swapped. In block submode only the primary swaps and `horizontal` picks
/// the `O` variant that trades columns only.
pub(crate) fn handle_swap(horizontal: bool, session: &mut Session) -> DispatchResult {
    if !session.current_mode().0.is_selecting() {
        return DispatchResult::failed();
    }
    let buffer = &session.buffer;
    if session.mode.in_block_submode() {
        let primary = session.cursors.primary_mut();
        let swapped = if horizontal {
            swap_block_columns(buffer, primary)
        } else {
            swap_ends(primary)
        };
        if !swapped {
            return finish_cycle(session, DispatchResult::failed());
        }
        primary.last_column = StickyColumn::Column(buffer.column_of(primary.offset));
        sync_rows(session);
        return finish_cycle(session, DispatchResult::dirty());
    }

    let mut all = true;
    for c in session.cursors.iter_mut() {
        let swapped = swap_ends(c);
        if swapped {
            c.last_column = StickyColumn::Column(buffer.column_of(c.offset));
        } else {
            debug!(target: "actions.dispatch", cursor = ?c.id(), "swap_without_anchor");
        }
        all &= swapped;
    }
    let result = DispatchResult {
        success: all,
        ..DispatchResult::dirty()
    };
    finish_cycle(session, result)
}

/// `A` in visual mode: append after the selection.
///
/// In block submode every row gets a caret just right of the block; rows
/// that are too short are padded with spaces first (after `$` each row
/// simply ends at its own line end). Other submodes move each cursor to the
/// end of its line. Either way the selection is dropped and insert starts.
pub(crate) fn handle_append(command: &Command, session: &mut Session) -> DispatchResult {
    if !session.mode.in_visual_mode() {
        return DispatchResult::failed();
    }
    if session.mode.in_block_submode() {
        append_block(session);
    } else {
        let buffer = &session.buffer;
        for c in session.cursors.iter_mut() {
            c.offset = buffer.line_end(buffer.line_of(c.offset));
        }
    }
    for c in session.cursors.iter_mut() {
        c.clear_selection();
    }
    if let Some(to) = command.exit_mode() {
        session.mode.transition(to);
    }
    finish_cycle(session, DispatchResult::dirty())
}

fn append_block(session: &mut Session) {
    let primary = session.cursors.primary().clone();
    let head = primary.offset;
    let anchor = primary.anchor.unwrap_or(head);
    let buffer = &mut session.buffer;
    let (a_line, h_line) = (buffer.line_of(anchor), buffer.line_of(head));
    let right = buffer.column_of(anchor).max(buffer.column_of(head)) + 1;
    let to_line_end = primary.last_column == StickyColumn::LineEnd;
    let lines = a_line.min(h_line)..=a_line.max(h_line);

    if !to_line_end {
        for line in lines.clone().rev() {
            let len = buffer.line_len(line);
            if len < right {
                let at = buffer.line_end(line);
                buffer.insert(at, &" ".repeat(right - len));
            }
        }
    }
    let caret = |buffer: &dyn TextBuffer, line: usize| -> usize {
        if to_line_end {
            buffer.line_end(line)
        } else {
            buffer.offset_at(line, right, true)
        }
    };
    let buffer: &dyn TextBuffer = &session.buffer;
    session.cursors.primary_mut().offset = caret(buffer, h_line);
    session.cursors.replace_secondaries(
        lines
            .filter(|&line| line != h_line)
            .map(|line| (caret(buffer, line), None)),
    );
}
