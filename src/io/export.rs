//! Export an aggregated series to CSV or JSON.
//!
//! Column names match what the chart layer reads: `date`,
//! `total_propositions`, `moving_avg`.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{SeriesConfig, SeriesPoint};
use crate::error::AppError;

/// Write the series to a CSV file.
pub fn write_series_csv(path: &Path, series: &[SeriesPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["date", "total_propositions", "moving_avg"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for p in series {
        writer
            .write_record([
                p.date.format("%Y-%m-%d").to_string(),
                p.count.to_string(),
                format!("{:.6}", p.moving_average),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    log::info!("Wrote {} series rows to {}", series.len(), path.display());
    Ok(())
}

#[derive(Serialize)]
struct SeriesFile<'a> {
    tool: &'static str,
    window: usize,
    date_field: &'a str,
    points: &'a [SeriesPoint],
}

/// Write the series, plus the options that produced it, to a JSON file.
pub fn write_series_json(path: &Path, series: &[SeriesPoint], config: &SeriesConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = SeriesFile {
        tool: "propstat",
        window: config.window,
        date_field: &config.date_field,
        points: series,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    log::info!("Wrote series JSON to {}", path.display());
    Ok(())
}
