#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

/// A board with authored ranks, a refresh column, and thousands separators.
pub const BOARD_CSV: &str = "\
rank,name,value,updated
1,Kim,1000,2024-03-01 09:00
2,Lee,500,2024-03-01 09:00
";

/// A cell written into a generated workbook.
pub enum XlsxCell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes an xlsx workbook with one worksheet per `(name, rows)` entry.
    pub fn write_xlsx(&self, name: &str, sheets: &[(&str, Vec<Vec<XlsxCell<'_>>>)]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        for (sheet_name, rows) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*sheet_name).expect("sheet name");
            for (row_idx, row) in rows.iter().enumerate() {
                for (col_idx, cell) in row.iter().enumerate() {
                    let (r, c) = (row_idx as u32, col_idx as u16);
                    match cell {
                        XlsxCell::Text(text) => {
                            worksheet.write_string(r, c, *text).expect("write string");
                        }
                        XlsxCell::Number(number) => {
                            worksheet.write_number(r, c, *number).expect("write number");
                        }
                        XlsxCell::Blank => {}
                    }
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

/// Header row of text cells.
pub fn texts<'a>(values: &[&'a str]) -> Vec<XlsxCell<'a>> {
    values.iter().map(|v| XlsxCell::Text(v)).collect()
}
