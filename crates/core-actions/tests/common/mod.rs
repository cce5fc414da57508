#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{DispatchResult, KeyTranslator, Translation, dispatch};
use core_config::{KeyModel, Options, SelectMode};
use core_events::parse_keys;
use core_state::Session;

pub const DISCOVERY: &str = "A Discovery

I found it in a |legendary land
all rocks and lavender and tufted grass,
where it was settled on some sodden sand
hard by the torrent of a mountain pass.
";

/// Session over `marked`, with one cursor per `|` marker (the first one is
/// primary). Markers are removed from the text.
pub fn session(marked: &str) -> Session {
    session_with(marked, Options::default())
}

pub fn session_with(marked: &str, options: Options) -> Session {
    let mut text = String::new();
    let mut carets = Vec::new();
    for ch in marked.chars() {
        if ch == '|' {
            carets.push(text.chars().count());
        } else {
            text.push(ch);
        }
    }
    let mut s = Session::from_text("test", &text).unwrap();
    s.options = options;
    s.place_cursors(&carets);
    s
}

pub fn options(keymodel: &[&str], selectmode: &[&str]) -> Options {
    Options {
        keymodel: keymodel.join(",").parse::<KeyModel>().unwrap(),
        selectmode: selectmode.join(",").parse::<SelectMode>().unwrap(),
    }
}

/// Translate and dispatch `keys` one token at a time, like a host would.
pub fn type_keys(session: &mut Session, keys: &str) -> Vec<DispatchResult> {
    let mut translator = KeyTranslator::new();
    let mut results = Vec::new();
    for key in parse_keys(keys).unwrap() {
        if let Translation::Command(cmd) = translator.translate(session.current_mode().0, &key) {
            results.push(dispatch(&cmd, session));
        }
    }
    results
}

/// Cursor offsets in ascending order.
pub fn offsets(session: &Session) -> Vec<usize> {
    let mut v: Vec<usize> = session.cursors.iter().map(|c| c.offset).collect();
    v.sort_unstable();
    v
}

/// Selections as `(start, end)` in ascending order.
pub fn selections(session: &Session) -> Vec<(usize, usize)> {
    let mut v: Vec<(usize, usize)> = session
        .cursors
        .iter()
        .filter_map(|c| c.selection.map(|s| (s.start(), s.end())))
        .collect();
    v.sort_unstable();
    v
}

/// Offset of `(line, column)` in `session`'s buffer.
pub fn at(session: &Session, line: usize, column: usize) -> usize {
    use core_text::TextBuffer;
    session.buffer.line_start(line) + column
}
