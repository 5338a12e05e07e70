//! Persisted user preferences. Only the display theme is kept.

use std::{
    fs::File,
    io::{BufReader, ErrorKind},
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFS_FILE: &str = ".rankboard-prefs.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    /// No ANSI styling.
    Plain,
}

impl Theme {
    /// Dark and light swap; plain turns into dark.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light | Theme::Plain => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Plain => "plain",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
}

impl Preferences {
    /// Missing files yield defaults; unreadable ones are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("Opening preferences file {path:?}"));
            }
        };
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing preferences file {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Creating preferences file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing preferences JSON")
    }
}
