use std::fmt::Write as _;

use crate::{rank::RankedRecord, table::display_width};

const BAR: char = '█';

/// Bar length for `value`, scaled so `max` fills `width`. Positive values
/// always get at least one cell.
pub fn bar_length(value: f64, max: f64, width: usize) -> usize {
    if value <= 0.0 || max <= 0.0 || width == 0 {
        return 0;
    }
    let scaled = (value / max * width as f64).round() as usize;
    scaled.clamp(1, width)
}

pub fn render_bars(
    records: &[&RankedRecord],
    width: usize,
    format_value: impl Fn(f64) -> String,
    paint: impl Fn(&str) -> String,
) -> String {
    let label_width = records
        .iter()
        .map(|r| display_width(&r.name))
        .max()
        .unwrap_or(0);
    let max = records.iter().map(|r| r.value).fold(0.0_f64, f64::max);

    let mut output = String::new();
    for record in records {
        let pad = " ".repeat(label_width.saturating_sub(display_width(&record.name)));
        let bar = BAR
            .to_string()
            .repeat(bar_length(record.value, max, width));
        let painted = if bar.is_empty() { bar } else { paint(&bar) };
        let _ = writeln!(
            output,
            "{}{pad}  {painted} {}",
            record.name,
            format_value(record.value)
        );
    }
    output
}
