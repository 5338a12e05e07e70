use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{prefs::Theme, view::SortKey};

#[derive(Debug, Parser)]
#[command(author, version, about = "View spreadsheet leaderboards in the terminal", long_about = None)]
pub struct Cli {
    /// YAML configuration file (defaults apply when omitted)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Preferences file holding the saved display theme
    #[arg(long = "prefs", global = true, default_value = crate::prefs::DEFAULT_PREFS_FILE)]
    pub prefs: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render the leaderboard with summary, ranked table, and bar chart
    Show(ShowArgs),
    /// Export the current view as CSV
    Export(ExportArgs),
    /// Show how each sheet's headers map onto leaderboard fields
    Inspect(InspectArgs),
    /// Show, set, or toggle the saved display theme
    Theme(ThemeArgs),
    /// Write the effective configuration (defaults unless --config is given) as YAML
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Spreadsheet or CSV file to load (configured default source if omitted, '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// CSV delimiter character for delimited inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of delimited inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    /// Row order
    #[arg(long, value_enum, default_value = "rank")]
    pub sort: SortKey,
    /// Case-insensitive name filter
    #[arg(short = 's', long = "search", default_value = "")]
    pub search: String,
    /// Group tab to show ('all' ranks every record together)
    #[arg(short = 'g', long = "group", default_value = "all")]
    pub group: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub view: ViewArgs,
    /// Bars in the chart (0 shows every record; config default if omitted)
    #[arg(long = "top")]
    pub top: Option<usize>,
    /// Theme for this run only (saved theme if omitted)
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[command(flatten)]
    pub view: ViewArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter for the exported file
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding for the output file/stdout (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Theme to save; toggles between dark and light when omitted
    #[arg(value_enum)]
    pub theme: Option<Theme>,
    /// Print the saved theme without changing it
    #[arg(long, conflicts_with = "theme")]
    pub show: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
