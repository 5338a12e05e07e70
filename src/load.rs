//! The load boundary.
//!
//! Runs source -> header resolution -> normalization -> reconciliation and
//! folds every failure into a [`Session`] carrying a user-facing hint, so
//! callers always hold a consistent (possibly empty) dataset.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::{
    config::Config,
    error::LoadError,
    header::{TableLayout, select_sheet},
    normalize::normalize_layout,
    rank::{RankedRecord, reconcile},
    source::{TextOptions, read_workbook},
};

/// One labelled group of a split sheet, already reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub label: String,
    pub records: Vec<RankedRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Boards {
    Single(Vec<RankedRecord>),
    Split([Group; 2]),
}

/// Everything derived from one successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub source: PathBuf,
    pub sheet: String,
    pub boards: Boards,
}

impl Dataset {
    pub fn record_count(&self) -> usize {
        match &self.boards {
            Boards::Single(records) => records.len(),
            Boards::Split(groups) => groups.iter().map(|g| g.records.len()).sum(),
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.boards, Boards::Split(_))
    }
}

/// Reads `path` and builds its dataset.
pub fn load_dataset(
    path: &Path,
    config: &Config,
    options: &TextOptions,
) -> Result<Dataset, LoadError> {
    let sheets = read_workbook(path, options)?;
    let selection = select_sheet(
        &sheets,
        config.preferred_sheet.as_deref(),
        &config.synonyms,
        &config.groups,
    )
    .ok_or_else(|| LoadError::UnresolvableSchema {
        sheet: path.display().to_string(),
        headers: Vec::new(),
    })?;

    if !selection.is_usable() {
        return Err(LoadError::UnresolvableSchema {
            sheet: selection.sheet.name.clone(),
            headers: selection.sheet.header_row().into_iter().flatten().collect(),
        });
    }

    let rows = selection.sheet.data_rows();
    let mut lists = normalize_layout(rows, &selection.layout, &config.groups).into_iter();
    let boards = match &selection.layout {
        TableLayout::Single(_) => Boards::Single(reconcile(lists.next().unwrap_or_default())),
        TableLayout::Split(blocks) => Boards::Split([0, 1].map(|slot| Group {
            label: blocks[slot].label.clone(),
            records: reconcile(lists.next().unwrap_or_default()),
        })),
    };

    let dataset = Dataset {
        source: path.to_path_buf(),
        sheet: selection.sheet.name.clone(),
        boards,
    };
    info!(
        "Loaded {} record(s) from sheet '{}' of {:?}{}",
        dataset.record_count(),
        dataset.sheet,
        path,
        if dataset.is_split() { " (split layout)" } else { "" }
    );
    Ok(dataset)
}

/// Where a load reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// The configured default location.
    Default(PathBuf),
    /// A file the user supplied.
    Upload(PathBuf),
}

impl SourceKind {
    pub fn from_input(input: Option<&Path>, config: &Config) -> Self {
        match input {
            Some(path) => SourceKind::Upload(path.to_path_buf()),
            None => SourceKind::Default(config.default_source.clone()),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SourceKind::Default(path) | SourceKind::Upload(path) => path,
        }
    }
}

/// Application state after a load attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub dataset: Option<Dataset>,
    pub hint: String,
}

impl Session {
    pub fn empty(hint: impl Into<String>) -> Self {
        Self {
            dataset: None,
            hint: hint.into(),
        }
    }

    /// Loads `source`, never failing: errors reset the dataset and become the
    /// hint.
    pub fn load(source: &SourceKind, config: &Config, options: &TextOptions) -> Self {
        let path = source.path();
        match load_dataset(path, config, options) {
            Ok(dataset) => {
                let hint = match source {
                    SourceKind::Default(_) => format!("Loaded {}", path.display()),
                    SourceKind::Upload(_) => format!("Loaded upload: {}", display_name(path)),
                };
                Self {
                    dataset: Some(dataset),
                    hint,
                }
            }
            Err(err) => {
                let hint = match (source, &err) {
                    (SourceKind::Default(_), LoadError::SourceUnavailable(_)) => format!(
                        "Automatic load of {} failed; pass --input to use another file ({err})",
                        path.display()
                    ),
                    (SourceKind::Upload(_), LoadError::SourceUnavailable(_)) => format!(
                        "Could not read the spreadsheet; check the file, sheet, and column names ({err})"
                    ),
                    (_, LoadError::UnresolvableSchema { .. }) => err.to_string(),
                };
                warn!("{hint}");
                Self::empty(hint)
            }
        }
    }

    pub fn record_count(&self) -> usize {
        self.dataset.as_ref().map_or(0, Dataset::record_count)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
