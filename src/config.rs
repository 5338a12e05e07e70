//! YAML configuration.
//!
//! Every field has a default, so a configuration file only needs the keys it
//! overrides. `rankboard config` writes the full default document.

use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    header::{GroupSpec, Synonyms, default_groups},
    tier::{Tier, default_tiers},
};

pub const DEFAULT_SOURCE: &str = "data/YB.xlsx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source loaded when no input is given.
    pub default_source: PathBuf,
    /// Sheet evaluated before the others when present.
    pub preferred_sheet: Option<String>,
    pub synonyms: Synonyms,
    /// The two groups of a split sheet, in display order.
    pub groups: [GroupSpec; 2],
    pub tiers: Vec<Tier>,
    pub show_share: bool,
    pub chart: ChartConfig,
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_source: PathBuf::from(DEFAULT_SOURCE),
            preferred_sheet: None,
            synonyms: Synonyms::default(),
            groups: default_groups(),
            tiers: default_tiers(),
            show_share: true,
            chart: ChartConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Bars shown; `None` shows every record.
    pub top_n: Option<usize>,
    /// Width in characters of the longest bar.
    pub width: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_n: Some(10),
            width: 40,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub labels: ExportLabels,
}

/// CSV header labels, localizable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportLabels {
    pub rank: String,
    pub name: String,
    pub value: String,
    pub share: String,
}

impl Default for ExportLabels {
    fn default() -> Self {
        Self {
            rank: "rank".to_string(),
            name: "name".to_string(),
            value: "value".to_string(),
            share: "share".to_string(),
        }
    }
}

impl ExportLabels {
    pub fn header(&self) -> [&str; 4] {
        [
            self.rank.as_str(),
            self.name.as_str(),
            self.value.as_str(),
            self.share.as_str(),
        ]
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing config to YAML string")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml_string()?;
        let mut file =
            File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Writing config file {path:?}"))?;
        Ok(())
    }
}
