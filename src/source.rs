//! Raw tabular sources.
//!
//! A source file is read into a list of [`RawSheet`]s, each a grid of
//! [`Cell`]s in declaration order. Spreadsheet workbooks go through
//! `calamine`; delimited text files become a one-sheet workbook named after
//! the file stem.

use std::{fmt, io, path::Path};

use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::Encoding;
use log::debug;

use crate::{error::SourceError, io_utils};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "xla", "ods"];

/// A single spreadsheet cell as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date (days since 1899-12-30).
    DateTime(f64),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(n) | Cell::DateTime(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) => Cell::Empty,
        }
    }
}

/// One worksheet: its name and every row, header included.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Position of the first row holding at least one non-blank cell.
    pub fn header_index(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.iter().any(|cell| !cell.is_blank()))
    }

    /// Header cells rendered as text; blank cells become `None`.
    pub fn header_row(&self) -> Vec<Option<String>> {
        self.header_index()
            .map(|idx| {
                self.rows[idx]
                    .iter()
                    .map(|cell| (!cell.is_blank()).then(|| cell.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rows following the header row.
    pub fn data_rows(&self) -> &[Vec<Cell>] {
        match self.header_index() {
            Some(idx) => &self.rows[idx + 1..],
            None => &[],
        }
    }
}

/// Options for reading delimited text sources.
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encoding: encoding_rs::UTF_8,
        }
    }
}

pub fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Reads every sheet of `path`.
pub fn read_workbook(path: &Path, options: &TextOptions) -> Result<Vec<RawSheet>, SourceError> {
    if !io_utils::is_dash(path) && !path.exists() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let sheets = if is_workbook_path(path) {
        read_spreadsheet(path)?
    } else {
        vec![read_delimited(path, options)?]
    };
    if sheets.is_empty() {
        return Err(SourceError::NoWorksheets {
            path: path.to_path_buf(),
        });
    }
    debug!(
        "Read {} sheet(s) from {:?}: {:?}",
        sheets.len(),
        path,
        sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );
    Ok(sheets)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<RawSheet>, SourceError> {
    let unreadable = |message: String| SourceError::Unreadable {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|err| unreadable(err.to_string()))?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|err| unreadable(format!("sheet '{name}': {err}")))?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();
        sheets.push(RawSheet::new(name, rows));
    }
    Ok(sheets)
}

fn read_delimited(path: &Path, options: &TextOptions) -> Result<RawSheet, SourceError> {
    let unreadable = |message: String| SourceError::Unreadable {
        path: path.to_path_buf(),
        message,
    };
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            SourceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            unreadable(err.to_string())
        }
    })?;

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|err| unreadable(format!("row {}: {err}", idx + 1)))?;
        let decoded = io_utils::decode_record(&record, options.encoding)
            .map_err(|err| unreadable(format!("row {}: {err}", idx + 1)))?;
        rows.push(decoded.into_iter().map(text_cell).collect());
    }
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty() && *stem != "-")
        .unwrap_or("stdin");
    Ok(RawSheet::new(name, rows))
}

fn text_cell(value: String) -> Cell {
    // Strip a UTF-8 byte order mark left on the first field by spreadsheet exports.
    let value = value.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(value);
    if value.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn header_row_skips_leading_blank_rows() {
        let sheet = RawSheet::new(
            "s",
            vec![
                vec![Cell::Empty, Cell::text("  ")],
                vec![Cell::text("Rank"), Cell::Empty, Cell::text("Name")],
                vec![Cell::Number(1.0), Cell::Empty, Cell::text("Kim")],
            ],
        );
        assert_eq!(sheet.header_index(), Some(1));
        assert_eq!(
            sheet.header_row(),
            vec![Some("Rank".to_string()), None, Some("Name".to_string())]
        );
        assert_eq!(sheet.data_rows().len(), 1);
    }

    #[test]
    fn blank_sheet_has_no_header_or_data() {
        let sheet = RawSheet::new("empty", vec![vec![Cell::Empty]]);
        assert!(sheet.header_row().is_empty());
        assert!(sheet.data_rows().is_empty());
    }

    #[test]
    fn numeric_cells_display_without_trailing_zeroes() {
        assert_eq!(Cell::Number(3.0).to_string(), "3");
        assert_eq!(Cell::Number(2.5).to_string(), "2.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }

    #[test]
    fn workbook_detection_is_extension_based() {
        assert!(is_workbook_path(&PathBuf::from("data/YB.xlsx")));
        assert!(is_workbook_path(&PathBuf::from("data/board.ODS")));
        assert!(!is_workbook_path(&PathBuf::from("data/board.csv")));
        assert!(!is_workbook_path(&PathBuf::from("-")));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = read_workbook(
            &PathBuf::from("definitely/not/here.xlsx"),
            &TextOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn bom_is_stripped_from_text_cells() {
        assert_eq!(text_cell("\u{feff}rank".to_string()), Cell::text("rank"));
        assert_eq!(text_cell(String::new()), Cell::Empty);
    }
}
