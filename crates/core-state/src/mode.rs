//! Session-wide modal state.
//!
//! Exactly one `(Mode, SubMode)` pair is active per session. Transitions
//! requested while a command runs are parked in `pending` and only become
//! visible through [`ModeState::apply_pending`], which the dispatcher calls
//! once after every cursor of the cycle has moved. Hosts that need to switch
//! modes outside a cycle (a template engine starting select mode, say) use
//! [`ModeState::force`].

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Normal command/navigation mode.
    Command,
    Insert,
    Replace,
    Visual,
    Select,
}

impl Mode {
    /// Whether a cursor may rest one past the last char of a line.
    pub fn is_end_allowed(self) -> bool {
        !matches!(self, Mode::Command)
    }

    /// Visual or select: the modes that carry a selection.
    pub fn is_selecting(self) -> bool {
        matches!(self, Mode::Visual | Mode::Select)
    }
}

/// Selection shape. Only meaningful for `Visual` and `Select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubMode {
    None,
    Character,
    Line,
    Block,
}

/// A `(Mode, SubMode)` pair.
pub type ModePair = (Mode, SubMode);

/// Record of one applied transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: ModePair,
    pub to: ModePair,
}

/// Canonical form of a pair: selecting modes always carry a shape, the
/// others never do.
pub fn normalize_pair((mode, sub): ModePair) -> ModePair {
    match (mode.is_selecting(), sub) {
        (true, SubMode::None) => (mode, SubMode::Character),
        (true, sub) => (mode, sub),
        (false, _) => (mode, SubMode::None),
    }
}

#[derive(Debug, Clone)]
pub struct ModeState {
    current: ModePair,
    pending: Option<ModePair>,
}

impl Default for ModeState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeState {
    pub fn new() -> Self {
        Self {
            current: (Mode::Command, SubMode::None),
            pending: None,
        }
    }

    pub fn current(&self) -> ModePair {
        self.current
    }

    pub fn mode(&self) -> Mode {
        self.current.0
    }

    pub fn submode(&self) -> SubMode {
        self.current.1
    }

    pub fn in_visual_mode(&self) -> bool {
        self.current.0 == Mode::Visual
    }

    pub fn in_select_mode(&self) -> bool {
        self.current.0 == Mode::Select
    }

    pub fn in_block_submode(&self) -> bool {
        self.current.0.is_selecting() && self.current.1 == SubMode::Block
    }

    /// Request a transition for the end of the running cycle. A later
    /// request in the same cycle replaces an earlier one.
    pub fn transition(&mut self, to: ModePair) {
        self.pending = Some(normalize_pair(to));
    }

    pub fn pending(&self) -> Option<ModePair> {
        self.pending
    }

    /// The pair the session will be in once the pending transition applies.
    pub fn target(&self) -> ModePair {
        self.pending.unwrap_or(self.current)
    }

    /// Apply the parked transition, if any. Returns `None` when nothing was
    /// pending or the pending pair equals the current one.
    pub fn apply_pending(&mut self) -> Option<ModeTransition> {
        let to = self.pending.take()?;
        self.switch(to)
    }

    /// Switch immediately, dropping anything pending.
    pub fn force(&mut self, to: ModePair) -> Option<ModeTransition> {
        self.pending = None;
        self.switch(normalize_pair(to))
    }

    fn switch(&mut self, to: ModePair) -> Option<ModeTransition> {
        if to == self.current {
            return None;
        }
        let from = self.current;
        self.current = to;
        debug!(target: "state.mode", from = ?from, to = ?to, "mode_transition");
        Some(ModeTransition { from, to })
    }
}
