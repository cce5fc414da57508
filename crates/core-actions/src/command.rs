//! Command descriptor.
//!
//! A `Command` is built once per input event by the key translator (or a
//! host) and read by the dispatcher. It is never mutated after construction:
//! the builder methods consume and return the value.

use crate::Action;
use core_state::{Mode, ModePair, SubMode};

bitflags::bitflags! {
    /// Behavior tags attached to a command.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u16 {
        /// Record the pre-move position in the jump list.
        const SAVE_JUMP = 1;
        /// The command leaves visual/select mode once it has run.
        const EXIT_VISUAL = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    Motion,
    /// Ends in insert mode.
    Insert,
    OtherReadonly,
}

/// Operand typed after the command key (`f{char}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    Character(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    action: Action,
    kind: CommandType,
    flags: CommandFlags,
    raw_count: usize,
    argument: Option<Argument>,
}

impl Command {
    /// Command for `action` with its default type and flags and no count.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            kind: action.command_type(),
            flags: action.default_flags(),
            raw_count: 0,
            argument: None,
        }
    }

    /// Typed count; 0 means none was typed.
    pub fn with_count(self, raw_count: usize) -> Self {
        Self { raw_count, ..self }
    }

    pub fn with_argument(self, argument: Argument) -> Self {
        Self {
            argument: Some(argument),
            ..self
        }
    }

    /// Replace the flag set.
    pub fn with_flags(self, flags: CommandFlags) -> Self {
        Self { flags, ..self }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn kind(&self) -> CommandType {
        self.kind
    }

    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    /// Mode a selecting command leaves to, when it carries `EXIT_VISUAL`:
    /// insert for insert-type commands, command mode otherwise.
    pub fn exit_mode(&self) -> Option<ModePair> {
        if !self.flags.contains(CommandFlags::EXIT_VISUAL) {
            return None;
        }
        Some(match self.kind {
            CommandType::Insert => (Mode::Insert, SubMode::None),
            _ => (Mode::Command, SubMode::None),
        })
    }

    /// Effective count, never below 1.
    pub fn count(&self) -> usize {
        self.raw_count.max(1)
    }

    pub fn raw_count(&self) -> usize {
        self.raw_count
    }

    pub fn argument(&self) -> Option<Argument> {
        self.argument
    }

    /// The character operand, if any.
    pub fn char_argument(&self) -> Option<char> {
        match self.argument {
            Some(Argument::Character(c)) => Some(c),
            None => None,
        }
    }
}
