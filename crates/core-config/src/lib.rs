//! Configuration loading and parsing.
//!
//! Parses `vimcaret.toml` (or an override path provided by the binary) and
//! extracts the `[options]` table:
//!
//! ```toml
//! [options]
//! keymodel = "startsel,stopsel"   # Vim comma list
//! selectmode = ["key"]            # or a TOML array
//! ```
//!
//! Missing keys keep Vim's defaults (`keymodel=continueselect,stopselect`,
//! `selectmode=template`). Unknown flags are logged and treated as absent;
//! an unreadable or malformed file falls back to defaults. Unknown tables and
//! keys are ignored so the file can grow without warnings.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

mod options;

pub use options::{FlagOption, KeyModel, OptionError, Options, SelectMode};

/// A list option as written in TOML: a comma separated string or an array.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FlagList {
    Csv(String),
    Items(Vec<String>),
}

impl FlagList {
    fn items(&self) -> Vec<&str> {
        match self {
            FlagList::Csv(s) => vec![s.as_str()],
            FlagList::Items(items) => items.iter().map(String::as_str).collect(),
        }
    }

    fn resolve<F: FlagOption>(list: Option<&FlagList>) -> F {
        match list {
            Some(list) => F::parse_lenient(list.items()),
            None => F::default_value(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OptionsSection {
    #[serde(default)]
    pub keymodel: Option<FlagList>,
    #[serde(default)]
    pub selectmode: Option<FlagList>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub options: OptionsSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub options: Options,    // typed, validated view of `file.options`
}

impl Config {
    fn from_file(raw: Option<String>, file: ConfigFile) -> Self {
        let options = Options::new(
            FlagList::resolve(file.options.keymodel.as_ref()),
            FlagList::resolve(file.options.selectmode.as_ref()),
        );
        Self { raw, file, options }
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("vimcaret.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("vimcaret").join("vimcaret.toml");
    }
    PathBuf::from("vimcaret.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let cfg = Config::from_file(Some(content), file);
            info!(
                target: "config",
                path = %path.display(),
                keymodel = %cfg.options.keymodel,
                selectmode = %cfg.options.selectmode,
                "config_loaded"
            );
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}
