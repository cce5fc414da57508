//! Editing session state: buffer, cursors, mode, jump history and options.
//!
//! Everything the command engine mutates lives in an explicit [`Session`]
//! owned by the host; there is no process-wide mode or cursor state.
//!
//! - `mode`: the `(Mode, SubMode)` state machine with deferred transitions.
//! - `cursor`: cursors, the cursor set, merge policy and scoped listeners.
//! - `jump`: bounded jump history fed by jump-saving motions.
//!
//! The cursor set is only mutated by the dispatcher and by listeners while a
//! [`WatchGuard`] is alive; between cycles it is stable and may be read freely.

pub mod cursor;
pub mod jump;
pub mod mode;

pub use cursor::{
    Cursor, CursorId, CursorListener, CursorOrder, CursorSet, Selection, StickyColumn, WatchGuard,
};
pub use jump::{JUMP_HISTORY_MAX, JumpList, JumpSink};
pub use mode::{Mode, ModePair, ModeState, ModeTransition, SubMode, normalize_pair};

use anyhow::Result;
use core_config::Options;
use core_text::{Buffer, TextBuffer};

/// Lines scrolled by a full-page motion when the host never reported a
/// viewport height.
pub const DEFAULT_VIEWPORT_LINES: usize = 24;

/// One editing session.
#[derive(Debug)]
pub struct Session {
    pub buffer: Buffer,
    pub cursors: CursorSet,
    pub mode: ModeState,
    pub jumps: JumpList,
    pub options: Options,
    /// Text rows visible in the host viewport; drives page scrolling.
    pub viewport_lines: usize,
}

impl Session {
    /// Session over `buffer` with one primary cursor at offset 0 in command mode.
    pub fn new(buffer: Buffer, options: Options) -> Self {
        Self {
            buffer,
            cursors: CursorSet::new(0),
            mode: ModeState::new(),
            jumps: JumpList::new(),
            options,
            viewport_lines: DEFAULT_VIEWPORT_LINES,
        }
    }

    /// Session over in-memory text with default options.
    pub fn from_text(name: &str, text: &str) -> Result<Self> {
        Ok(Self::new(Buffer::from_str(name, text)?, Options::default()))
    }

    /// Replace the cursor set with one cursor per offset (first is primary),
    /// each normalized for the current mode.
    pub fn place_cursors(&mut self, offsets: &[usize]) {
        let allow_end = self.mode.mode().is_end_allowed();
        let normalized: Vec<usize> = offsets
            .iter()
            .map(|&o| self.buffer.normalize_offset(o, allow_end))
            .collect();
        self.cursors = CursorSet::from_offsets(&normalized);
        for c in self.cursors.iter_mut() {
            c.last_column = StickyColumn::Column(self.buffer.column_of(c.offset));
        }
    }

    pub fn current_mode(&self) -> ModePair {
        self.mode.current()
    }
}
