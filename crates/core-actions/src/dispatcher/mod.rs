//! Dispatcher applying a [`Command`] to a [`Session`].
//!
//! One call to [`dispatch`] is one cycle. Mode changes requested while the
//! cycle runs are parked in the session's mode state and applied once at the
//! end, after every cursor has moved. Sub-modules:
//! * `motion`  - handler trait and the per-cursor / batch execution algorithm
//! * `shifted` - shifted special keys and arrows driven by `keymodel`
//! * `mode`    - explicit mode changes (`v`, `V`, `<C-v>`, `gh`, `<Esc>`, `i`)
//! * `visual`  - end swapping and block append
//! * `select`  - select-mode delete

use crate::{Action, Command, motions};
use core_state::{ModeTransition, Session, SubMode};
use core_text::TextBuffer;
use tracing::trace;

mod mode;
mod motion;
mod select;
mod shifted;
mod visual;

pub use motion::{Execution, MotionContext, MotionHandler, execute_motion};

/// Outcome of one dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// False when the command was rejected or failed for some cursor.
    pub success: bool,
    /// A cursor, selection, buffer or mode changed.
    pub dirty: bool,
    /// The transition applied at the end of the cycle, if any.
    pub transition: Option<ModeTransition>,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            success: true,
            dirty: true,
            transition: None,
        }
    }
    pub fn clean() -> Self {
        Self {
            success: true,
            dirty: false,
            transition: None,
        }
    }
    pub fn failed() -> Self {
        Self {
            success: false,
            dirty: false,
            transition: None,
        }
    }
}

/// Run `command` against `session`.
pub fn dispatch(command: &Command, session: &mut Session) -> DispatchResult {
    trace!(
        target: "actions.dispatch",
        action = ?command.action(),
        count = command.raw_count(),
        cursors = session.cursors.len(),
        mode = ?session.current_mode(),
        "dispatch"
    );
    match command.action() {
        Action::Motion(kind) => {
            let mut handler = motions::handler_for(kind);
            execute_motion(handler.as_mut(), command, session)
        }
        Action::ShiftedMotion(key) => shifted::handle_shifted(key, command, session),
        Action::ModeChange(mc) => mode::handle_mode_change(mc, session),
        Action::SwapVisualEnds => visual::handle_swap(false, session),
        Action::SwapVisualEndsBlock => visual::handle_swap(true, session),
        Action::SelectDelete => select::handle_select_delete(command, session),
        Action::VisualAppend => visual::handle_append(command, session),
    }
}

/// End-of-cycle bookkeeping: apply the parked transition, then bring every
/// cursor in line with the mode the session is now in.
///
/// Leaving block submode for anything but insert collapses the block to its
/// primary cursor. Outside the selecting modes all selections are dropped,
/// and outside the end-allowed modes every cursor is put back on a real char.
pub(crate) fn finish_cycle(session: &mut Session, mut result: DispatchResult) -> DispatchResult {
    let was_block = session.mode.in_block_submode();
    if let Some(t) = session.mode.apply_pending() {
        result.transition = Some(t);
        result.dirty = true;
    }
    let (mode, sub) = session.current_mode();
    if was_block && sub != SubMode::Block && mode != core_state::Mode::Insert {
        session.cursors.retain_primary();
    }
    if !mode.is_selecting() {
        for c in session.cursors.iter_mut() {
            c.clear_selection();
        }
    }
    if !mode.is_end_allowed() {
        let buffer = &session.buffer;
        for c in session.cursors.iter_mut() {
            c.offset = buffer.normalize_offset(c.offset, false);
        }
    }
    if sub != SubMode::Block {
        session.cursors.merge_overlapping();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModeChange, MotionKind, ShiftedKey};
    use core_state::{Mode, Selection};

    fn session(text: &str) -> Session {
        Session::from_text("t", text).unwrap()
    }

    #[test]
    fn motion_dirty_then_clean_at_edge() {
        let mut s = session("ab\ncd");
        let l = Command::new(Action::Motion(MotionKind::Right));
        assert!(dispatch(&l, &mut s).dirty);
        assert_eq!(s.cursors.primary().offset, 1);
        // already on the last char: offset is a no-op
        let r = dispatch(&l, &mut s);
        assert!(r.success);
        assert!(!r.dirty);
    }

    #[test]
    fn transition_reported_once() {
        let mut s = session("hello");
        let v = Command::new(Action::ModeChange(ModeChange::EnterVisual(SubMode::Character)));
        let r = dispatch(&v, &mut s);
        let t = r.transition.unwrap();
        assert_eq!(t.to, (Mode::Visual, SubMode::Character));
        let l = Command::new(Action::Motion(MotionKind::Right));
        assert!(dispatch(&l, &mut s).transition.is_none());
        assert_eq!(s.cursors.primary().selection, Some(Selection::new(0, 2)));
    }

    #[test]
    fn escape_drops_selection_and_normalizes() {
        let mut s = session("abc\n");
        s.mode.force((Mode::Visual, SubMode::Character));
        s.place_cursors(&[3]);
        let esc = Command::new(Action::ModeChange(ModeChange::Escape));
        dispatch(&esc, &mut s);
        let c = s.cursors.primary();
        assert_eq!(c.selection, None);
        assert_eq!(c.anchor, None);
        assert_eq!(c.offset, 2);
    }

    #[test]
    fn shifted_home_without_startsel_stays_in_command() {
        let mut s = session("  word");
        s.place_cursors(&[4]);
        let home = Command::new(Action::ShiftedMotion(ShiftedKey::Home));
        let r = dispatch(&home, &mut s);
        assert!(r.transition.is_none());
        assert_eq!(s.cursors.primary().offset, 0);
        assert_eq!(s.cursors.primary().selection, None);
    }
}
