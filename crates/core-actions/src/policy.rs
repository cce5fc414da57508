//! Key-model policy for shifted motions.
//!
//! Pure functions of the current mode and the `keymodel` / `selectmode`
//! option sets. Callers request the resulting mode through the session's
//! mode state; nothing here has side effects.
//!
//! Rules for a shifted motion, in priority order:
//! 1. outside visual/select with `startsel`: enter select (when `key` is in
//!    `selectmode`) or visual, characterwise;
//! 2. inside visual/select with no applicable stop flag: stay and extend;
//! 3. `stopselect` in select, `stopvisual` in visual, or `stopsel` in either:
//!    back to command mode, the motion then runs as a plain motion.
//!
//! Unshifted motions never change the mode.

use core_config::{KeyModel, SelectMode};
use core_state::{Mode, ModePair, SubMode};

pub fn next_mode(
    current: ModePair,
    keymodel: KeyModel,
    selectmode: SelectMode,
    shifted: bool,
) -> ModePair {
    if !shifted {
        return current;
    }
    let (mode, _) = current;
    if !mode.is_selecting() {
        if keymodel.contains(KeyModel::STARTSEL) {
            return if selectmode.contains(SelectMode::KEY) {
                (Mode::Select, SubMode::Character)
            } else {
                (Mode::Visual, SubMode::Character)
            };
        }
        return current;
    }
    let stop = keymodel.contains(KeyModel::STOPSEL)
        || (mode == Mode::Select && keymodel.contains(KeyModel::STOPSELECT))
        || (mode == Mode::Visual && keymodel.contains(KeyModel::STOPVISUAL));
    if stop {
        (Mode::Command, SubMode::None)
    } else {
        current
    }
}

/// Whether shifted vertical arrows select (`true`) or scroll a page (`false`).
pub fn uses_key_model(current: Mode, keymodel: KeyModel) -> bool {
    keymodel.contains(KeyModel::STARTSEL)
        || (current == Mode::Visual && keymodel.contains(KeyModel::CONTINUEVISUAL))
        || (current == Mode::Select && keymodel.contains(KeyModel::CONTINUESELECT))
}
