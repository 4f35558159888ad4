//! Formatted terminal output.
//!
//! Formatting lives in one place so aggregation code stays free of
//! presentation concerns and output changes stay localized.

use crate::aggregate::{average_movement, series_counts};
use crate::domain::{CategoryShare, MovementMethod, SeriesConfig, SeriesPoint, TimeUnit};
use crate::io::ingest::IngestedBatch;

/// Format a number Brazilian style: `.` groups thousands, `,` is the decimal mark.
///
/// `format_number_brl(1234567.891, 2)` gives `"1.234.567,89"`.
pub fn format_number_brl(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Summary of a parsed export (rows read/kept/skipped).
pub fn format_ingest_summary(batch: &IngestedBatch, upserted: usize) -> String {
    let mut out = format!(
        "{}: {} rows read, {} upserted, {} skipped\n",
        batch.source_year,
        format_number_brl(batch.rows_read as f64, 0),
        format_number_brl(upserted as f64, 0),
        format_number_brl(batch.row_errors.len() as f64, 0),
    );
    for e in batch.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if batch.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more\n", batch.row_errors.len() - 5));
    }
    out
}

/// Headline numbers for a daily series, including the average day-to-day
/// movement of the counts measured with `movement`.
pub fn format_series_summary(series: &[SeriesPoint], config: &SeriesConfig, movement: MovementMethod) -> String {
    let mut out = String::new();
    out.push_str("=== propstat - Daily propositions ===\n");

    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        out.push_str("No records.\n");
        return out;
    };

    let total: usize = series.iter().map(|p| p.count).sum();
    out.push_str(&format!(
        "Records: {} | days with publications: {}\n",
        format_number_brl(total as f64, 0),
        format_number_brl(series.len() as f64, 0),
    ));
    out.push_str(&format!(
        "Range: {} .. {}\n",
        first.date.format("%d/%m/%Y"),
        last.date.format("%d/%m/%Y"),
    ));

    if let Some(peak) = series.iter().max_by(|a, b| a.count.cmp(&b.count).then(b.date.cmp(&a.date))) {
        out.push_str(&format!(
            "Peak: {} on {}\n",
            format_number_brl(peak.count as f64, 0),
            peak.date.format("%d/%m/%Y"),
        ));
    }

    out.push_str(&format!(
        "Moving average ({} days, `{}`): last={}\n",
        config.window,
        config.date_field,
        format_number_brl(last.moving_average, 2),
    ));

    let counts = series_counts(series);
    if let Ok(Some(m)) = average_movement(&counts, movement, 1, TimeUnit::Days) {
        out.push_str(&format!(
            "Average day-to-day movement ({}): {}\n",
            movement.label(),
            format_number_brl(m, 2)
        ));
    }

    out
}

/// Table of a category distribution, largest category first.
pub fn format_distribution(shares: &[CategoryShare], field: &str) -> String {
    let mut out = format!("=== propstat - Distribution by `{field}` ===\n");
    if shares.is_empty() {
        out.push_str("No records.\n");
        return out;
    }

    let label_width = shares.iter().map(|s| s.label.chars().count()).max().unwrap_or(0).max(8);
    for s in shares.iter().rev() {
        let pad = label_width - s.label.chars().count();
        out.push_str(&format!(
            "{}{} {:>10} {:>7}%\n",
            s.label,
            " ".repeat(pad),
            format_number_brl(s.count as f64, 0),
            format_number_brl(s.proportion * 100.0, 1),
        ));
    }
    out
}
