//! Motion execution.
//!
//! A motion handler computes one target offset per cursor. The dispatcher
//! decides whether to run it for every cursor or once for the primary:
//! * batch: block submode is active, there is a single cursor, or the
//!   handler asks for [`Execution::Batch`];
//! * per cursor: every other case, in ascending offset order captured when
//!   the cycle starts, with a [`MergeReconciler`] registered on the cursor
//!   set until the merge pass that follows the last move.
//!
//! Selection effects are decided by the cycle's target mode, so a shifted
//! motion that starts visual mode already extends a selection while the
//! session still reports command mode.

use super::{DispatchResult, finish_cycle};
use crate::{Command, CommandFlags, MergeReconciler, visual};
use core_state::{
    Cursor, CursorId, CursorSet, JumpList, JumpSink, Mode, ModePair, Session, StickyColumn,
    SubMode,
};
use core_text::TextBuffer;
use tracing::trace;

/// How often a handler runs per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    PerCursor,
    /// Once against the primary cursor, whatever the cursor count.
    Batch,
}

/// Read-only view of the session handed to motion hooks.
pub struct MotionContext<'a> {
    pub buffer: &'a dyn TextBuffer,
    /// Mode observed when the cycle started.
    pub mode: ModePair,
    /// Mode the cycle ends in.
    pub target: ModePair,
    pub viewport_lines: usize,
}

impl MotionContext<'_> {
    pub fn end_allowed(&self) -> bool {
        self.mode.0.is_end_allowed()
    }
}

pub trait MotionHandler {
    fn execution(&self) -> Execution {
        Execution::PerCursor
    }

    /// Runs first for each cursor; returning false skips the cursor.
    fn pre_offset_computation(
        &mut self,
        _ctx: &MotionContext<'_>,
        _cursor: &mut Cursor,
        _command: &Command,
    ) -> bool {
        true
    }

    /// Target offset for `cursor`, or `None` to leave it untouched.
    fn offset(&mut self, ctx: &MotionContext<'_>, cursor: &Cursor, command: &Command)
    -> Option<usize>;

    fn pre_move(&mut self, _ctx: &MotionContext<'_>, _cursor: &mut Cursor, _command: &Command) {}

    /// Runs after the move. In block submode `cursor` is the primary.
    fn post_move(&mut self, _ctx: &MotionContext<'_>, _cursor: &mut Cursor, _command: &Command) {}
}

/// Run `handler` for one cycle and finish it.
pub fn execute_motion(
    handler: &mut dyn MotionHandler,
    command: &Command,
    session: &mut Session,
) -> DispatchResult {
    let mode = session.mode.current();
    let target = session.mode.target();
    let block = session.mode.in_block_submode();
    let batch = block || session.cursors.len() == 1 || handler.execution() == Execution::Batch;
    trace!(
        target: "actions.dispatch",
        policy = if batch { "batch" } else { "per_cursor" },
        cursors = session.cursors.len(),
        mode = ?mode,
        target_mode = ?target,
        "execute_motion"
    );

    let Session {
        buffer,
        cursors,
        jumps,
        viewport_lines,
        ..
    } = &mut *session;
    let ctx = MotionContext {
        buffer: &*buffer,
        mode,
        target,
        viewport_lines: *viewport_lines,
    };

    let mut moved = false;
    if batch {
        let primary = cursors.primary_id();
        moved = run_cursor(handler, &ctx, command, cursors, jumps, primary, block);
        if target.0.is_selecting() && target.1 == SubMode::Block {
            visual::sync_block_rows(ctx.buffer, cursors);
        }
    } else {
        let order = cursors.ids_by_offset();
        let mut guard = cursors.watch(Box::new(MergeReconciler::new(mode.0 == Mode::Visual)));
        for id in order {
            moved |= run_cursor(handler, &ctx, command, &mut guard, jumps, id, false);
        }
        guard.merge_overlapping();
    }

    let result = if moved {
        DispatchResult::dirty()
    } else {
        DispatchResult::clean()
    };
    finish_cycle(session, result)
}

fn run_cursor(
    handler: &mut dyn MotionHandler,
    ctx: &MotionContext<'_>,
    command: &Command,
    cursors: &mut CursorSet,
    jumps: &mut JumpList,
    id: CursorId,
    block: bool,
) -> bool {
    let Some(cursor) = cursors.get_mut(id) else {
        return false;
    };
    if !handler.pre_offset_computation(ctx, cursor, command) {
        trace!(target: "actions.dispatch", cursor = ?id, "pre_offset_skip");
        return false;
    }
    let Some(offset) = handler.offset(ctx, cursor, command) else {
        trace!(target: "actions.dispatch", cursor = ?id, "no_op");
        return false;
    };
    if command.flags().contains(CommandFlags::SAVE_JUMP) {
        jumps.save_jump(cursor.offset);
    }
    let offset = if ctx.end_allowed() {
        offset.min(ctx.buffer.len_chars())
    } else {
        ctx.buffer.normalize_offset(offset, false)
    };
    handler.pre_move(ctx, cursor, command);
    move_caret(ctx, cursor, offset);

    let post = if block {
        cursors.primary_mut()
    } else {
        match cursors.get_mut(id) {
            Some(c) => c,
            None => return true,
        }
    };
    handler.post_move(ctx, post, command);
    true
}

/// Put `cursor` on `offset` and update its selection for the target mode.
pub(crate) fn move_caret(ctx: &MotionContext<'_>, cursor: &mut Cursor, offset: usize) {
    debug_assert!(offset <= ctx.buffer.len_chars(), "offset {offset} out of bounds");
    let previous = cursor.offset;
    cursor.offset = offset;
    cursor.last_column = StickyColumn::Column(ctx.buffer.column_of(offset));
    let (mode, sub) = ctx.target;
    if !mode.is_selecting() {
        cursor.clear_selection();
        return;
    }
    let anchor = *cursor.anchor.get_or_insert(previous);
    if sub != SubMode::Block {
        cursor.selection = Some(visual::selection_range(ctx.buffer, anchor, offset, ctx.target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, MotionKind};
    use std::panic::{AssertUnwindSafe, catch_unwind};

    struct Fixed(Option<usize>, Execution);

    impl MotionHandler for Fixed {
        fn execution(&self) -> Execution {
            self.1
        }
        fn offset(&mut self, _: &MotionContext<'_>, _: &Cursor, _: &Command) -> Option<usize> {
            self.0
        }
    }

    struct Counting {
        offsets: usize,
        pre: usize,
        post: usize,
    }

    impl MotionHandler for Counting {
        fn offset(&mut self, _: &MotionContext<'_>, c: &Cursor, _: &Command) -> Option<usize> {
            self.offsets += 1;
            Some(c.offset + 1)
        }
        fn pre_move(&mut self, _: &MotionContext<'_>, _: &mut Cursor, _: &Command) {
            self.pre += 1;
        }
        fn post_move(&mut self, _: &MotionContext<'_>, _: &mut Cursor, _: &Command) {
            self.post += 1;
        }
    }

    struct Panicking;

    impl MotionHandler for Panicking {
        fn offset(&mut self, _: &MotionContext<'_>, _: &Cursor, _: &Command) -> Option<usize> {
            panic!("handler failure");
        }
    }

    fn cmd() -> Command {
        Command::new(Action::Motion(MotionKind::Right))
    }

    fn session() -> Session {
        let mut s = Session::from_text("t", "abcdefghij\nabcdefghij\n").unwrap();
        s.place_cursors(&[0, 4, 12]);
        s
    }

    #[test]
    fn per_cursor_runs_every_cursor() {
        let mut s = session();
        let mut h = Counting {
            offsets: 0,
            pre: 0,
            post: 0,
        };
        execute_motion(&mut h, &cmd(), &mut s);
        assert_eq!((h.offsets, h.pre, h.post), (3, 3, 3));
        let mut offsets: Vec<usize> = s.cursors.iter().map(|c| c.offset).collect();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![1, 5, 13]);
    }

    #[test]
    fn block_submode_runs_once() {
        let mut s = session();
        s.mode.force((Mode::Visual, SubMode::Block));
        let mut h = Counting {
            offsets: 0,
            pre: 0,
            post: 0,
        };
        execute_motion(&mut h, &cmd(), &mut s);
        assert_eq!(h.offsets, 1);
    }

    #[test]
    fn batch_handler_moves_primary_only() {
        let mut s = session();
        execute_motion(&mut Fixed(Some(2), Execution::Batch), &cmd(), &mut s);
        assert_eq!(s.cursors.primary().offset, 2);
        assert!(s.cursors.iter().any(|c| c.offset == 4));
        assert!(s.cursors.iter().any(|c| c.offset == 12));
    }

    #[test]
    fn none_offset_changes_nothing() {
        let mut s = session();
        let before: Vec<Cursor> = s.cursors.iter().cloned().collect();
        let r = execute_motion(&mut Fixed(None, Execution::PerCursor), &cmd(), &mut s);
        assert!(r.success);
        assert!(!r.dirty);
        let after: Vec<Cursor> = s.cursors.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn command_mode_normalizes_onto_last_char() {
        let mut s = session();
        s.place_cursors(&[0]);
        execute_motion(&mut Fixed(Some(10), Execution::PerCursor), &cmd(), &mut s);
        assert_eq!(s.cursors.primary().offset, 9);
        s.mode.force((Mode::Insert, SubMode::None));
        execute_motion(&mut Fixed(Some(10), Execution::PerCursor), &cmd(), &mut s);
        assert_eq!(s.cursors.primary().offset, 10);
    }

    #[test]
    fn watcher_released_after_panic() {
        let mut s = session();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            execute_motion(&mut Panicking, &cmd(), &mut s);
        }));
        assert!(outcome.is_err());
        assert_eq!(s.cursors.listener_count(), 0);
    }

    #[test]
    fn jump_saved_with_pre_move_offset() {
        let mut s = session();
        s.place_cursors(&[4]);
        let gg = Command::new(Action::Motion(MotionKind::DocumentStart));
        execute_motion(&mut Fixed(Some(0), Execution::PerCursor), &gg, &mut s);
        assert_eq!(s.jumps.last(), Some(4));
    }
}
