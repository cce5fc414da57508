//! Logical key tokens and Vim key notation.
//!
//! Hosts hand the engine key sequences written the way Vim documents them
//! (`<S-Home>`, `<C-v>`, `gh`, `<BS>`). This crate turns such strings into
//! [`KeyToken`]s; resolving tokens into commands happens in `core-actions`.

use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 { const CTRL=1; const ALT=2; const SHIFT=4; const META=8; const SUPER=16; }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

impl NamedKey {
    fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let key = match lower.as_str() {
            "cr" | "enter" | "return" => NamedKey::Enter,
            "esc" => NamedKey::Esc,
            "bs" | "backspace" => NamedKey::Backspace,
            "tab" => NamedKey::Tab,
            "up" => NamedKey::Up,
            "down" => NamedKey::Down,
            "left" => NamedKey::Left,
            "right" => NamedKey::Right,
            "home" => NamedKey::Home,
            "end" => NamedKey::End,
            "pageup" => NamedKey::PageUp,
            "pagedown" => NamedKey::PageDown,
            "insert" | "ins" => NamedKey::Insert,
            "del" | "delete" => NamedKey::Delete,
            f if f.len() > 1 && f.starts_with('f') => {
                let n: u8 = f[1..].parse().ok()?;
                if n == 0 {
                    return None;
                }
                NamedKey::F(n)
            }
            _ => return None,
        };
        Some(key)
    }

    fn notation(&self) -> String {
        match self {
            NamedKey::Enter => "CR".into(),
            NamedKey::Esc => "Esc".into(),
            NamedKey::Backspace => "BS".into(),
            NamedKey::Tab => "Tab".into(),
            NamedKey::F(n) => format!("F{n}"),
            NamedKey::Up => "Up".into(),
            NamedKey::Down => "Down".into(),
            NamedKey::Left => "Left".into(),
            NamedKey::Right => "Right".into(),
            NamedKey::Home => "Home".into(),
            NamedKey::End => "End".into(),
            NamedKey::PageUp => "PageUp".into(),
            NamedKey::PageDown => "PageDown".into(),
            NamedKey::Insert => "Insert".into(),
            NamedKey::Delete => "Del".into(),
        }
    }
}

/// Canonical logical key tokens.
///
/// `KeyToken::Chord` wraps a base token plus modifier mask so consumers can
/// reconstruct combinations such as `<S-Home>` or `<C-v>`. A chord never
/// carries an empty mask; use [`KeyToken::chord`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
    Chord { base: Box<KeyToken>, mods: ModMask },
}

impl KeyToken {
    /// Combine `base` with `mods`, collapsing to `base` when no modifier is set.
    pub fn chord(base: KeyToken, mods: ModMask) -> Self {
        if mods.is_empty() {
            return base;
        }
        match base {
            KeyToken::Chord { base, mods: inner } => KeyToken::Chord {
                base,
                mods: inner | mods,
            },
            other => KeyToken::Chord {
                base: Box::new(other),
                mods,
            },
        }
    }

    pub fn mods(&self) -> ModMask {
        match self {
            KeyToken::Chord { mods, .. } => *mods,
            _ => ModMask::empty(),
        }
    }

    /// The token without modifiers.
    pub fn base(&self) -> &KeyToken {
        match self {
            KeyToken::Chord { base, .. } => base,
            other => other,
        }
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Char('<') => f.write_str("<lt>"),
            KeyToken::Char(' ') => f.write_str("<Space>"),
            KeyToken::Char(c) => write!(f, "{c}"),
            KeyToken::Named(k) => write!(f, "<{}>", k.notation()),
            KeyToken::Chord { base, mods } => {
                f.write_str("<")?;
                for (flag, prefix) in [
                    (ModMask::CTRL, "C-"),
                    (ModMask::ALT, "A-"),
                    (ModMask::SHIFT, "S-"),
                    (ModMask::META, "M-"),
                    (ModMask::SUPER, "D-"),
                ] {
                    if mods.contains(flag) {
                        f.write_str(prefix)?;
                    }
                }
                match base.as_ref() {
                    KeyToken::Named(k) => f.write_str(&k.notation())?,
                    KeyToken::Char(c) => write!(f, "{c}")?,
                    other => write!(f, "{other}")?,
                }
                f.write_str(">")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("unknown key name `<{0}>`")]
    UnknownKey(String),
    #[error("empty key notation `<>`")]
    Empty,
}

/// Token sequence for one input string. Most inputs are a handful of keys.
pub type KeySequence = SmallVec<[KeyToken; 8]>;

/// Parse Vim key notation into tokens.
///
/// A `<` without a closing `>` is taken literally, as Vim does.
pub fn parse_keys(input: &str) -> Result<KeySequence, KeyParseError> {
    let mut out = KeySequence::new();
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(close) = rest[1..].find('>') {
                let inner = &rest[1..1 + close];
                if !inner.is_empty() && !inner.contains('<') {
                    out.push(parse_bracketed(inner)?);
                    rest = &rest[close + 2..];
                    continue;
                }
                if inner.is_empty() {
                    return Err(KeyParseError::Empty);
                }
            }
        }
        out.push(KeyToken::Char(c));
        rest = &rest[c.len_utf8()..];
    }
    Ok(out)
}

fn parse_bracketed(inner: &str) -> Result<KeyToken, KeyParseError> {
    let mut mods = ModMask::empty();
    let mut name = inner;
    // Modifier prefixes: a single letter followed by '-', but `<->` style
    // names (a lone "-" key) are left alone.
    while name.len() > 2 && name.as_bytes()[1] == b'-' {
        let flag = match name.as_bytes()[0].to_ascii_uppercase() {
            b'C' => ModMask::CTRL,
            b'A' => ModMask::ALT,
            b'S' => ModMask::SHIFT,
            b'M' => ModMask::META,
            b'D' => ModMask::SUPER,
            _ => break,
        };
        mods |= flag;
        name = &name[2..];
    }
    let base = if let Some(named) = NamedKey::from_name(name) {
        KeyToken::Named(named)
    } else if name.eq_ignore_ascii_case("lt") {
        KeyToken::Char('<')
    } else if name.eq_ignore_ascii_case("space") {
        KeyToken::Char(' ')
    } else {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !mods.is_empty() => KeyToken::Char(c),
            _ => return Err(KeyParseError::UnknownKey(inner.to_string())),
        }
    };
    Ok(KeyToken::chord(base, mods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_characters() {
        let keys = parse_keys("$gh").unwrap();
        assert_eq!(
            keys.as_slice(),
            &[KeyToken::Char('$'), KeyToken::Char('g'), KeyToken::Char('h')]
        );
    }

    #[test]
    fn shifted_and_control_chords() {
        let keys = parse_keys("<S-Home><C-v><s-up>").unwrap();
        assert_eq!(
            keys[0],
            KeyToken::chord(KeyToken::Named(NamedKey::Home), ModMask::SHIFT)
        );
        assert_eq!(keys[1], KeyToken::chord(KeyToken::Char('v'), ModMask::CTRL));
        assert_eq!(keys[2].mods(), ModMask::SHIFT);
        assert_eq!(keys[2].base(), &KeyToken::Named(NamedKey::Up));
    }

    #[test]
    fn named_keys_and_literals() {
        let keys = parse_keys("<BS><Del><Esc><lt>x<F12>").unwrap();
        assert_eq!(
            keys.as_slice(),
            &[
                KeyToken::Named(NamedKey::Backspace),
                KeyToken::Named(NamedKey::Delete),
                KeyToken::Named(NamedKey::Esc),
                KeyToken::Char('<'),
                KeyToken::Char('x'),
                KeyToken::Named(NamedKey::F(12)),
            ]
        );
    }

    #[test]
    fn unclosed_angle_is_literal() {
        let keys = parse_keys("a<b").unwrap();
        assert_eq!(
            keys.as_slice(),
            &[KeyToken::Char('a'), KeyToken::Char('<'), KeyToken::Char('b')]
        );
    }

    #[test]
    fn unknown_names_are_errors() {
        assert_eq!(
            parse_keys("<Nope>"),
            Err(KeyParseError::UnknownKey("Nope".into()))
        );
        assert_eq!(parse_keys("<>"), Err(KeyParseError::Empty));
    }

    #[test]
    fn display_round_trips_notation() {
        let keys = parse_keys("<S-End>o<C-v><lt>").unwrap();
        let rendered: String = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, "<S-End>o<C-v><lt>");
    }

    #[test]
    fn chord_collapses_empty_mask() {
        assert_eq!(
            KeyToken::chord(KeyToken::Char('x'), ModMask::empty()),
            KeyToken::Char('x')
        );
    }
}
