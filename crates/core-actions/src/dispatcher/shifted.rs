//! Shifted special keys (`<S-Home>`, `<S-End>`, `<S-Left>`, `<S-Right>`)
//! and shifted arrows (`<S-Up>`, `<S-Down>`).
//!
//! The `keymodel` policy picks the mode the cycle ends in; the motion then
//! runs per cursor and extends, starts or drops the selection according to
//! that target. Shifted vertical arrows only select when the key model
//! applies to the current mode and scroll a full page otherwise.

use super::{DispatchResult, execute_motion};
use crate::{Command, MotionKind, ShiftedKey, motions, next_mode, uses_key_model};
use core_state::Session;
use tracing::trace;

pub(crate) fn handle_shifted(key: ShiftedKey, command: &Command, session: &mut Session) -> DispatchResult {
    let current = session.current_mode();
    let options = session.options;
    let vertical = matches!(key, ShiftedKey::Up | ShiftedKey::Down);
    if vertical && !uses_key_model(current.0, options.keymodel) {
        trace!(target: "actions.dispatch", key = ?key, "shifted_arrow_scroll");
        let page = if key == ShiftedKey::Up {
            MotionKind::PageUp
        } else {
            MotionKind::PageDown
        };
        let mut handler = motions::handler_for(page);
        return execute_motion(handler.as_mut(), command, session);
    }

    let next = next_mode(current, options.keymodel, options.selectmode, true);
    if next != current {
        session.mode.transition(next);
    }
    let kind = match key {
        ShiftedKey::Left => MotionKind::Left,
        ShiftedKey::Right => MotionKind::Right,
        ShiftedKey::Up => MotionKind::Up,
        ShiftedKey::Down => MotionKind::Down,
        ShiftedKey::Home => MotionKind::LineStart,
        ShiftedKey::End => MotionKind::LineEnd,
    };
    let mut handler = motions::handler_for(kind);
    execute_motion(handler.as_mut(), command, session)
}
