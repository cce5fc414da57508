//! Explicit mode changes.
//!
//! Entering visual selects the char under each cursor. Entering select does
//! the same and moves the caret past it, since select mode is exclusive.
//! Block submode keeps only the primary cursor and lays the block out from
//! it.

use super::{DispatchResult, finish_cycle, visual::sync_rows};
use crate::{ModeChange, visual};
use core_state::{Mode, Session, StickyColumn, SubMode};
use core_text::TextBuffer;

pub(crate) fn handle_mode_change(mc: ModeChange, session: &mut Session) -> DispatchResult {
    match mc {
        ModeChange::EnterVisual(sub) => start_selection(session, Mode::Visual, sub),
        ModeChange::EnterSelect(sub) => start_selection(session, Mode::Select, sub),
        ModeChange::Escape => {
            if session.mode.in_block_submode() {
                session.cursors.retain_primary();
            }
            for c in session.cursors.iter_mut() {
                c.clear_selection();
            }
            session.mode.transition((Mode::Command, SubMode::None));
            finish_cycle(session, DispatchResult::dirty())
        }
        ModeChange::EnterInsert => {
            session.mode.transition((Mode::Insert, SubMode::None));
            finish_cycle(session, DispatchResult::clean())
        }
    }
}

fn start_selection(session: &mut Session, mode: Mode, sub: SubMode) -> DispatchResult {
    let sub = if sub == SubMode::None { SubMode::Character } else { sub };
    let target = (mode, sub);
    if session.current_mode() == target {
        // `v` in charwise visual, `V` in linewise visual, ... toggle back out
        return handle_mode_change(ModeChange::Escape, session);
    }
    if sub == SubMode::Block {
        session.cursors.retain_primary();
    }
    let buffer = &session.buffer;
    let len = buffer.len_chars();
    for c in session.cursors.iter_mut() {
        let anchor = c.anchor.unwrap_or(c.offset);
        c.anchor = Some(anchor);
        if mode == Mode::Select && c.offset == anchor {
            c.offset = (anchor + 1).min(buffer.line_end(buffer.line_of(anchor))).min(len);
            c.last_column = StickyColumn::Column(buffer.column_of(c.offset));
        }
        if sub != SubMode::Block {
            c.selection = Some(visual::selection_range(buffer, anchor, c.offset, target));
        }
    }
    session.mode.transition(target);
    if sub == SubMode::Block {
        sync_rows(session);
    }
    finish_cycle(session, DispatchResult::dirty())
}
