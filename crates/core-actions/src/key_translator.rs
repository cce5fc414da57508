//! KeyTranslator: stateful key -> [`Command`] resolution.
//!
//! State machine:
//! * Idle, optionally accumulating a count prefix (`12j`). A leading `0` is
//!   the line-start motion, not a count.
//! * Prefix pending after `g` (`gg`, `gh`, `gH`, `g<C-h>`) or after `f`/`F`
//!   (the next key is the character argument).
//!
//! A complete command resets the state. A key that maps to nothing in the
//! current mode drops any pending count or prefix. Counts saturate at
//! 999_999.

use crate::{Action, Argument, Command, ModeChange, MotionKind, ShiftedKey};
use core_events::{KeyToken, ModMask, NamedKey};
use core_state::{Mode, SubMode};
use tracing::trace;

const COUNT_MAX: usize = 999_999;

/// Result of feeding one key to the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// A complete command ready for dispatch.
    Command(Command),
    /// The key was consumed as part of a count or prefix.
    Pending,
    /// Nothing is bound to the key in this mode.
    Unmapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    G,
    Find { forward: bool },
}

#[derive(Debug, Default)]
pub struct KeyTranslator {
    pending_count: Option<usize>,
    prefix: Option<Prefix>,
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any pending count or prefix.
    pub fn reset(&mut self) {
        self.pending_count = None;
        self.prefix = None;
    }

    /// True while a count or prefix is waiting for more keys.
    pub fn is_pending(&self) -> bool {
        self.pending_count.is_some() || self.prefix.is_some()
    }

    pub fn translate(&mut self, mode: Mode, key: &KeyToken) -> Translation {
        let out = self.resolve(mode, key);
        match &out {
            Translation::Command(cmd) => {
                trace!(target: "actions.translate", key = %key, ?mode, action = ?cmd.action(), count = cmd.raw_count(), "resolved");
                self.reset();
            }
            Translation::Pending => {
                trace!(target: "actions.translate", key = %key, ?mode, "pending");
            }
            Translation::Unmapped => {
                trace!(target: "actions.translate", key = %key, ?mode, "unmapped");
                self.reset();
            }
        }
        out
    }

    fn resolve(&mut self, mode: Mode, key: &KeyToken) -> Translation {
        if let Some(prefix) = self.prefix.take() {
            return self.resolve_prefixed(prefix, mode, key);
        }
        let counts = matches!(mode, Mode::Command | Mode::Visual);
        if counts && let KeyToken::Char(c @ '0'..='9') = key {
            if *c != '0' || self.pending_count.is_some() {
                let digit = c.to_digit(10).unwrap_or(0) as usize;
                let next = self
                    .pending_count
                    .unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(digit)
                    .min(COUNT_MAX);
                self.pending_count = Some(next);
                return Translation::Pending;
            }
        }

        if let Some(action) = special_key(mode, key) {
            return self.emit(action);
        }
        match mode {
            Mode::Command | Mode::Visual => self.resolve_normal(mode, key),
            Mode::Select | Mode::Insert | Mode::Replace => Translation::Unmapped,
        }
    }

    fn resolve_normal(&mut self, mode: Mode, key: &KeyToken) -> Translation {
        let visual = mode == Mode::Visual;
        let ctrl = key.mods() == ModMask::CTRL;
        let action = match (key.base(), ctrl) {
            (KeyToken::Char(c), true) => match c.to_ascii_lowercase() {
                'v' => Action::ModeChange(ModeChange::EnterVisual(SubMode::Block)),
                'f' => Action::Motion(MotionKind::PageDown),
                'b' => Action::Motion(MotionKind::PageUp),
                _ => return Translation::Unmapped,
            },
            (KeyToken::Char(c), false) if key.mods().is_empty() => match c {
                'h' => Action::Motion(MotionKind::Left),
                'l' | ' ' => Action::Motion(MotionKind::Right),
                'j' => Action::Motion(MotionKind::Down),
                'k' => Action::Motion(MotionKind::Up),
                '0' => Action::Motion(MotionKind::LineStart),
                '^' => Action::Motion(MotionKind::FirstNonBlank),
                '$' => Action::Motion(MotionKind::LineEnd),
                'G' => Action::Motion(MotionKind::DocumentEnd),
                'v' => Action::ModeChange(ModeChange::EnterVisual(SubMode::Character)),
                'V' => Action::ModeChange(ModeChange::EnterVisual(SubMode::Line)),
                'g' => {
                    self.prefix = Some(Prefix::G);
                    return Translation::Pending;
                }
                'f' | 'F' => {
                    self.prefix = Some(Prefix::Find { forward: *c == 'f' });
                    return Translation::Pending;
                }
                'i' if !visual => Action::ModeChange(ModeChange::EnterInsert),
                'o' if visual => Action::SwapVisualEnds,
                'O' if visual => Action::SwapVisualEndsBlock,
                'A' if visual => Action::VisualAppend,
                _ => return Translation::Unmapped,
            },
            _ => return Translation::Unmapped,
        };
        self.emit(action)
    }

    fn resolve_prefixed(&mut self, prefix: Prefix, mode: Mode, key: &KeyToken) -> Translation {
        match prefix {
            Prefix::Find { forward } => {
                let KeyToken::Char(c) = key else {
                    return Translation::Unmapped;
                };
                let kind = if forward {
                    MotionKind::FindChar
                } else {
                    MotionKind::FindCharBackward
                };
                let cmd = self.command(Action::Motion(kind)).with_argument(Argument::Character(*c));
                Translation::Command(cmd)
            }
            Prefix::G => {
                let ctrl = key.mods() == ModMask::CTRL;
                let action = match (key.base(), ctrl) {
                    (KeyToken::Char('g'), false) => Action::Motion(MotionKind::DocumentStart),
                    (KeyToken::Char('h'), false) => {
                        Action::ModeChange(ModeChange::EnterSelect(SubMode::Character))
                    }
                    (KeyToken::Char('H'), false) => {
                        Action::ModeChange(ModeChange::EnterSelect(SubMode::Line))
                    }
                    (KeyToken::Char('h' | 'H'), true) => {
                        Action::ModeChange(ModeChange::EnterSelect(SubMode::Block))
                    }
                    _ => return Translation::Unmapped,
                };
                if mode == Mode::Visual && matches!(action, Action::ModeChange(_)) {
                    return Translation::Unmapped;
                }
                self.emit(action)
            }
        }
    }

    fn command(&mut self, action: Action) -> Command {
        Command::new(action).with_count(self.pending_count.take().unwrap_or(0))
    }

    fn emit(&mut self, action: Action) -> Translation {
        Translation::Command(self.command(action))
    }
}

/// Named keys and shifted chords shared by several modes.
fn special_key(mode: Mode, key: &KeyToken) -> Option<Action> {
    let KeyToken::Named(named) = key.base() else {
        return None;
    };
    let mods = key.mods();
    if mods == ModMask::SHIFT && mode != Mode::Insert && mode != Mode::Replace {
        let shifted = match named {
            NamedKey::Left => ShiftedKey::Left,
            NamedKey::Right => ShiftedKey::Right,
            NamedKey::Up => ShiftedKey::Up,
            NamedKey::Down => ShiftedKey::Down,
            NamedKey::Home => ShiftedKey::Home,
            NamedKey::End => ShiftedKey::End,
            _ => return None,
        };
        return Some(Action::ShiftedMotion(shifted));
    }
    if !mods.is_empty() {
        return None;
    }
    let action = match (named, mode) {
        (NamedKey::Esc, Mode::Command) => return None,
        (NamedKey::Esc, _) => Action::ModeChange(ModeChange::Escape),
        (NamedKey::Backspace | NamedKey::Delete, Mode::Select) => Action::SelectDelete,
        (_, Mode::Replace) => return None,
        (NamedKey::Left, _) => Action::Motion(MotionKind::Left),
        (NamedKey::Right, _) => Action::Motion(MotionKind::Right),
        (NamedKey::Up, _) => Action::Motion(MotionKind::Up),
        (NamedKey::Down, _) => Action::Motion(MotionKind::Down),
        (NamedKey::Home, _) => Action::Motion(MotionKind::LineStart),
        (NamedKey::End, _) => Action::Motion(MotionKind::LineEnd),
        (NamedKey::PageDown, _) => Action::Motion(MotionKind::PageDown),
        (NamedKey::PageUp, _) => Action::Motion(MotionKind::PageUp),
        _ => return None,
    };
    Some(action)
}
