//! Record normalization.
//!
//! Turns data rows plus a resolved [`TableLayout`] into typed [`Record`]s.
//! Every coercion is lossy but total; the only rows dropped are those
//! without a name.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::{
    header::{ColumnMap, GroupSpec, TableLayout},
    source::Cell,
};

/// Opaque timestamp-like value carried from the refresh column.
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    Text(String),
    /// Excel serial number (days since 1899-12-30, fraction is time of day).
    Serial(f64),
}

impl Refresh {
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Empty => None,
            Cell::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| Refresh::Text(trimmed.to_string()))
            }
            Cell::Number(n) | Cell::DateTime(n) => n.is_finite().then_some(Refresh::Serial(*n)),
            Cell::Bool(b) => Some(Refresh::Text(b.to_string())),
        }
    }

    /// Calendar date-time for serial values.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Refresh::Serial(serial) => excel_serial_to_datetime(*serial),
            Refresh::Text(_) => None,
        }
    }
}

impl fmt::Display for Refresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refresh::Text(text) => f.write_str(text),
            Refresh::Serial(serial) => match self.as_datetime() {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
                None => write!(f, "{serial}"),
            },
        }
    }
}

pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

/// One leaderboard row before rank reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub rank: Option<i64>,
    pub name: String,
    pub value: f64,
    pub refresh: Option<Refresh>,
    pub group: Option<String>,
}

impl Record {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            rank: None,
            name: name.into(),
            value,
            refresh: None,
            group: None,
        }
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Normalizes rows of a single-table sheet.
pub fn normalize(rows: &[Vec<Cell>], columns: &ColumnMap, groups: &[GroupSpec; 2]) -> Vec<Record> {
    rows.iter()
        .filter_map(|row| {
            let mut record = record_from_row(row, columns)?;
            record.group = columns
                .gender
                .as_ref()
                .and_then(|col| cell_at(row, col.index))
                .and_then(|cell| group_from_cell(cell, groups));
            Some(record)
        })
        .collect()
}

/// Normalizes one group block of a split sheet; every record is tagged with
/// the block's label.
pub fn normalize_group(rows: &[Vec<Cell>], columns: &ColumnMap, label: &str) -> Vec<Record> {
    rows.iter()
        .filter_map(|row| record_from_row(row, columns))
        .map(|record| record.with_group(label))
        .collect()
}

/// Normalizes a whole sheet, returning one list per group in split mode and
/// a single list otherwise.
pub fn normalize_layout(
    rows: &[Vec<Cell>],
    layout: &TableLayout,
    groups: &[GroupSpec; 2],
) -> Vec<Vec<Record>> {
    match layout {
        TableLayout::Single(columns) => vec![normalize(rows, columns, groups)],
        TableLayout::Split(blocks) => blocks
            .iter()
            .map(|block| normalize_group(rows, &block.columns, &block.label))
            .collect(),
    }
}

fn record_from_row(row: &[Cell], columns: &ColumnMap) -> Option<Record> {
    let name = columns
        .name
        .as_ref()
        .and_then(|col| cell_at(row, col.index))
        .map(|cell| cell.to_string().trim().to_string())
        .filter(|name| !name.is_empty())?;
    let value = columns
        .value
        .as_ref()
        .and_then(|col| cell_at(row, col.index))
        .map(coerce_value)
        .unwrap_or(0.0);
    let rank = columns
        .rank
        .as_ref()
        .and_then(|col| cell_at(row, col.index))
        .and_then(coerce_rank);
    let refresh = columns
        .refresh
        .as_ref()
        .and_then(|col| cell_at(row, col.index))
        .and_then(Refresh::from_cell);
    Some(Record {
        rank,
        name,
        value,
        refresh,
        group: None,
    })
}

fn cell_at(row: &[Cell], index: usize) -> Option<&Cell> {
    row.get(index)
}

/// Numbers pass through; text is parsed after dropping thousands separators.
/// Non-finite or unparsable input becomes 0.
pub fn coerce_value(cell: &Cell) -> f64 {
    let parsed = match cell {
        Cell::Number(n) | Cell::DateTime(n) => *n,
        Cell::Bool(b) => f64::from(u8::from(*b)),
        Cell::Text(text) => parse_number(text).unwrap_or(0.0),
        Cell::Empty => 0.0,
    };
    if parsed.is_finite() { parsed } else { 0.0 }
}

/// Blank cells and unparsable text are unset; any parsed number, including
/// zero or negative, is kept.
pub fn coerce_rank(cell: &Cell) -> Option<i64> {
    let parsed = match cell {
        Cell::Number(n) | Cell::DateTime(n) => Some(*n),
        Cell::Text(text) => parse_number(text),
        Cell::Empty | Cell::Bool(_) => None,
    }?;
    parsed.is_finite().then(|| parsed.trunc() as i64)
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' ' | '\u{a0}'))
        .collect::<String>();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn group_from_cell(cell: &Cell, groups: &[GroupSpec; 2]) -> Option<String> {
    let raw = cell.to_string();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let label = groups
        .iter()
        .find(|group| group.matches_value(trimmed))
        .map(|group| group.label.clone())
        .unwrap_or_else(|| trimmed.to_string());
    Some(label)
}
