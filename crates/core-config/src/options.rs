//! Typed `keymodel` / `selectmode` option sets.
//!
//! Both options are Vim comma lists drawn from a closed vocabulary. They are
//! parsed once at the boundary into bit sets; code downstream only asks
//! `contains`. Strict parsing rejects unknown flags with [`OptionError`];
//! the lenient path used for config files drops them with a warning.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

bitflags::bitflags! {
    /// Flags of the `keymodel` option.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModel: u8 {
        const STARTSEL = 1;
        const STOPSEL = 1 << 1;
        const STOPSELECT = 1 << 2;
        const STOPVISUAL = 1 << 3;
        const CONTINUESELECT = 1 << 4;
        const CONTINUEVISUAL = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Flags of the `selectmode` option.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SelectMode: u8 {
        const KEY = 1;
        const CMD = 1 << 1;
        const TEMPLATE = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown flag `{flag}` for option '{option}'")]
    UnknownFlag { option: &'static str, flag: String },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("invalid option assignment `{0}`")]
    InvalidAssignment(String),
}

/// A list option backed by a bit set with a fixed vocabulary.
pub trait FlagOption: bitflags::Flags + Copy + 'static {
    /// Full option name as typed after `:set`.
    const NAME: &'static str;
    /// Vim's short alias (`km`, `slm`).
    const ALIAS: &'static str;
    /// Accepted flag names in display order.
    const VOCABULARY: &'static [(&'static str, Self)];

    fn default_value() -> Self;

    /// Parse a comma list, rejecting unknown flags.
    fn parse_strict(list: &str) -> Result<Self, OptionError> {
        let mut out = Self::empty();
        for item in split_list(list) {
            match lookup::<Self>(item) {
                Some(flag) => out.insert(flag),
                None => {
                    return Err(OptionError::UnknownFlag {
                        option: Self::NAME,
                        flag: item.to_string(),
                    });
                }
            }
        }
        Ok(out)
    }

    /// Parse list items, treating unknown flags as absent.
    fn parse_lenient<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Self::empty();
        for item in items.into_iter().flat_map(split_list) {
            match lookup::<Self>(item) {
                Some(flag) => out.insert(flag),
                None => warn!(target: "config", option = Self::NAME, flag = item, "unknown_option_flag"),
            }
        }
        out
    }

    /// Comma list in vocabulary order.
    fn to_list(self) -> String {
        Self::VOCABULARY
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn lookup<F: FlagOption>(name: &str) -> Option<F> {
    F::VOCABULARY
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, flag)| *flag)
}

impl FlagOption for KeyModel {
    const NAME: &'static str = "keymodel";
    const ALIAS: &'static str = "km";
    const VOCABULARY: &'static [(&'static str, Self)] = &[
        ("startsel", Self::STARTSEL),
        ("stopsel", Self::STOPSEL),
        ("stopselect", Self::STOPSELECT),
        ("stopvisual", Self::STOPVISUAL),
        ("continueselect", Self::CONTINUESELECT),
        ("continuevisual", Self::CONTINUEVISUAL),
    ];

    fn default_value() -> Self {
        Self::CONTINUESELECT | Self::STOPSELECT
    }
}

impl FlagOption for SelectMode {
    const NAME: &'static str = "selectmode";
    const ALIAS: &'static str = "slm";
    const VOCABULARY: &'static [(&'static str, Self)] = &[
        ("key", Self::KEY),
        ("cmd", Self::CMD),
        ("template", Self::TEMPLATE),
    ];

    fn default_value() -> Self {
        Self::TEMPLATE
    }
}

impl Default for KeyModel {
    fn default() -> Self {
        Self::default_value()
    }
}

impl Default for SelectMode {
    fn default() -> Self {
        Self::default_value()
    }
}

impl FromStr for KeyModel {
    type Err = OptionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s)
    }
}

impl FromStr for SelectMode {
    type Err = OptionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s)
    }
}

impl fmt::Display for KeyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_list())
    }
}

impl fmt::Display for SelectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_list())
    }
}

/// Read-only option snapshot consumed by the cursor engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub keymodel: KeyModel,
    pub selectmode: SelectMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOp {
    Assign,
    Add,
    Remove,
    Reset,
}

impl Options {
    pub fn new(keymodel: KeyModel, selectmode: SelectMode) -> Self {
        Self {
            keymodel,
            selectmode,
        }
    }

    /// Apply one `:set` style assignment.
    ///
    /// Accepted forms: `name=list`, `name+=list`, `name^=list`, `name-=list`
    /// and `name&` (restore the default). Names may use Vim's short aliases.
    pub fn set(&mut self, assignment: &str) -> Result<(), OptionError> {
        let assignment = assignment.trim();
        let (name, op, value) = split_assignment(assignment)
            .ok_or_else(|| OptionError::InvalidAssignment(assignment.to_string()))?;
        if matches_name::<KeyModel>(name) {
            self.keymodel = apply(self.keymodel, op, value)?;
        } else if matches_name::<SelectMode>(name) {
            self.selectmode = apply(self.selectmode, op, value)?;
        } else {
            return Err(OptionError::UnknownOption(name.to_string()));
        }
        debug!(target: "config", assignment, keymodel = %self.keymodel, selectmode = %self.selectmode, "option_set");
        Ok(())
    }
}

fn matches_name<F: FlagOption>(name: &str) -> bool {
    name == F::NAME || name == F::ALIAS
}

fn split_assignment(s: &str) -> Option<(&str, SetOp, &str)> {
    if let Some(name) = s.strip_suffix('&') {
        return Some((name, SetOp::Reset, ""));
    }
    let eq = s.find('=')?;
    let (lhs, value) = (&s[..eq], &s[eq + 1..]);
    let (name, op) = if let Some(n) = lhs.strip_suffix('+') {
        (n, SetOp::Add)
    } else if let Some(n) = lhs.strip_suffix('^') {
        (n, SetOp::Add)
    } else if let Some(n) = lhs.strip_suffix('-') {
        (n, SetOp::Remove)
    } else {
        (lhs, SetOp::Assign)
    };
    if name.is_empty() {
        return None;
    }
    Some((name, op, value))
}

fn apply<F: FlagOption>(current: F, op: SetOp, value: &str) -> Result<F, OptionError> {
    Ok(match op {
        SetOp::Reset => F::default_value(),
        SetOp::Assign => F::parse_strict(value)?,
        SetOp::Add => current.union(F::parse_strict(value)?),
        SetOp::Remove => current.difference(F::parse_strict(value)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_vim() {
        let opts = Options::default();
        assert_eq!(opts.keymodel, KeyModel::CONTINUESELECT | KeyModel::STOPSELECT);
        assert_eq!(opts.selectmode, SelectMode::TEMPLATE);
        assert_eq!(opts.keymodel.to_string(), "stopselect,continueselect");
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        let err = "startsel,bogus".parse::<KeyModel>().unwrap_err();
        assert_eq!(
            err,
            OptionError::UnknownFlag {
                option: "keymodel",
                flag: "bogus".into()
            }
        );
        assert_eq!("".parse::<SelectMode>().unwrap(), SelectMode::empty());
        assert_eq!(" key , cmd ".parse::<SelectMode>().unwrap(), SelectMode::KEY | SelectMode::CMD);
    }

    #[test]
    fn lenient_parse_drops_unknown() {
        let km = KeyModel::parse_lenient(["startsel,nope", "stopsel"]);
        assert_eq!(km, KeyModel::STARTSEL | KeyModel::STOPSEL);
    }

    #[test]
    fn set_supports_vim_list_operators() {
        let mut opts = Options::default();
        opts.set("keymodel=startsel").unwrap();
        assert_eq!(opts.keymodel, KeyModel::STARTSEL);
        opts.set("km+=stopsel").unwrap();
        assert_eq!(opts.keymodel, KeyModel::STARTSEL | KeyModel::STOPSEL);
        opts.set("keymodel-=startsel").unwrap();
        assert_eq!(opts.keymodel, KeyModel::STOPSEL);
        opts.set("slm=key").unwrap();
        assert_eq!(opts.selectmode, SelectMode::KEY);
        opts.set("keymodel&").unwrap();
        assert_eq!(opts.keymodel, KeyModel::default());
        opts.set("selectmode=").unwrap();
        assert!(opts.selectmode.is_empty());
    }

    #[test]
    fn set_reports_bad_input() {
        let mut opts = Options::default();
        assert_eq!(
            opts.set("tabstop=4"),
            Err(OptionError::UnknownOption("tabstop".into()))
        );
        assert_eq!(
            opts.set("keymodel"),
            Err(OptionError::InvalidAssignment("keymodel".into()))
        );
        assert!(matches!(
            opts.set("keymodel+=startsel,wat"),
            Err(OptionError::UnknownFlag { .. })
        ));
        // failed assignment leaves the option untouched
        assert_eq!(opts.keymodel, KeyModel::default());
    }
}
