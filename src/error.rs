//! Error types for loading leaderboard sources.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading raw tables from a file.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file does not exist.
    #[error("source file not found: {path}")]
    NotFound { path: PathBuf },

    /// The file exists but could not be read as a table.
    #[error("failed to read {path}: {message}")]
    Unreadable { path: PathBuf, message: String },

    /// The workbook does not contain any worksheet.
    #[error("workbook {path} has no worksheets")]
    NoWorksheets { path: PathBuf },
}

/// Errors surfaced at the load boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The default or uploaded source could not be obtained.
    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),

    /// The selected sheet lacks a name or value column.
    #[error(
        "sheet '{sheet}' has no recognizable name/value columns (headers found: {})",
        format_samples(.headers)
    )]
    UnresolvableSchema { sheet: String, headers: Vec<String> },
}

const SAMPLE_HEADER_LIMIT: usize = 8;

fn format_samples(headers: &[String]) -> String {
    if headers.is_empty() {
        return "none".to_string();
    }
    let mut shown = headers
        .iter()
        .take(SAMPLE_HEADER_LIMIT)
        .map(|h| format!("'{h}'"))
        .collect::<Vec<_>>()
        .join(", ");
    if headers.len() > SAMPLE_HEADER_LIMIT {
        shown.push_str(", ...");
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolvable_schema_lists_sample_headers() {
        let err = LoadError::UnresolvableSchema {
            sheet: "Sheet1".to_string(),
            headers: vec!["foo".to_string(), "bar".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("Sheet1"));
        assert!(message.contains("'foo', 'bar'"));
    }

    #[test]
    fn unresolvable_schema_truncates_long_header_lists() {
        let headers = (0..12).map(|i| format!("h{i}")).collect::<Vec<_>>();
        let err = LoadError::UnresolvableSchema {
            sheet: "wide".to_string(),
            headers,
        };
        let message = err.to_string();
        assert!(message.contains("'h7', ..."));
        assert!(!message.contains("'h8'"));
    }
}
