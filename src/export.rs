//! CSV export of the current view.

use std::io::Write;

use anyhow::{Context, Result};

use crate::{config::ExportLabels, view::View};

/// Whole numbers print without a fractional part.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Percentage with one decimal place, e.g. `66.7%`. Ties round up.
pub fn format_share(share: f64) -> String {
    let tenths = (share * 1000.0).round() / 10.0;
    format!("{tenths:.1}%")
}

/// Export lines for the view rows, in view order.
pub fn export_rows(view: &View) -> Vec<[String; 4]> {
    view.rows
        .iter()
        .map(|record| {
            [
                record.rank.to_string(),
                record.name.clone(),
                format_plain(record.value),
                format_share(view.share_of(record.value)),
            ]
        })
        .collect()
}

/// Writes the header and one record per view row. Returns the rows written.
pub fn write_csv<W: Write>(
    writer: &mut csv::Writer<W>,
    view: &View,
    labels: &ExportLabels,
) -> Result<usize> {
    writer
        .write_record(labels.header())
        .context("Writing export header")?;
    let rows = export_rows(view);
    for (idx, row) in rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing export row {}", idx + 1))?;
    }
    writer.flush().context("Flushing export writer")?;
    Ok(rows.len())
}
