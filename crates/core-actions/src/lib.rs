//! Command engine: turns resolved commands into cursor motions and mode
//! transitions over a multi-cursor [`Session`](core_state::Session).
//!
//! Layout:
//! * `command`        - immutable command descriptor (count, flags, argument)
//! * `dispatcher`     - `dispatch` entry point and the motion execution algorithm
//! * `motions`        - concrete motion handlers (`h`, `j`, `$`, `gg`, `f`, ...)
//! * `policy`         - key-model policy for shifted motions
//! * `merge`          - anchor reconciliation when cursors merge
//! * `visual`         - selection ranges, block rows and end swapping
//! * `key_translator` - key tokens to commands for the current mode

pub mod command;
pub mod dispatcher;
pub mod key_translator;
pub mod merge;
pub mod motions;
pub mod policy;
pub mod visual;

pub use command::{Argument, Command, CommandFlags, CommandType};
pub use dispatcher::{
    DispatchResult, Execution, MotionContext, MotionHandler, dispatch, execute_motion,
};
pub use key_translator::{KeyTranslator, Translation};
pub use merge::{MergeReconciler, selections_overlap};
pub use policy::{next_mode, uses_key_model};

use core_state::SubMode;

/// Cursor motions. Vertical and page motions keep the sticky column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    FirstNonBlank,
    /// `gg`: first line, or line `count` when a count was typed.
    DocumentStart,
    /// `G`: last line, or line `count` when a count was typed.
    DocumentEnd,
    /// `f{char}`
    FindChar,
    /// `F{char}`
    FindCharBackward,
    PageDown,
    PageUp,
}

/// Keys that drive the key-model policy when pressed with Shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftedKey {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeChange {
    EnterVisual(SubMode),
    EnterSelect(SubMode),
    /// Back to command mode, collapsing selections.
    Escape,
    EnterInsert,
}

/// Resolved action a [`Command`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Motion(MotionKind),
    ShiftedMotion(ShiftedKey),
    /// `o` in visual mode.
    SwapVisualEnds,
    /// `O` in visual mode: horizontal swap in block mode.
    SwapVisualEndsBlock,
    ModeChange(ModeChange),
    /// `<BS>` / `<Del>` in select mode.
    SelectDelete,
    /// `A` in visual mode.
    VisualAppend,
}

impl Action {
    pub fn command_type(&self) -> CommandType {
        match self {
            Action::ShiftedMotion(ShiftedKey::Up | ShiftedKey::Down) => CommandType::OtherReadonly,
            Action::Motion(_) | Action::ShiftedMotion(_) => CommandType::Motion,
            Action::SelectDelete | Action::VisualAppend => CommandType::Insert,
            Action::ModeChange(ModeChange::EnterInsert) => CommandType::Insert,
            Action::SwapVisualEnds | Action::SwapVisualEndsBlock | Action::ModeChange(_) => {
                CommandType::OtherReadonly
            }
        }
    }

    pub fn default_flags(&self) -> CommandFlags {
        match self {
            Action::Motion(MotionKind::DocumentStart | MotionKind::DocumentEnd) => {
                CommandFlags::SAVE_JUMP
            }
            Action::SelectDelete | Action::VisualAppend => CommandFlags::EXIT_VISUAL,
            _ => CommandFlags::empty(),
        }
    }
}
