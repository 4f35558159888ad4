//! Chart rendering with Plotters.
//!
//! Drawing code is generic over the Plotters backend so the same chart can be
//! written to an SVG file or rendered into a string (handy in tests). The
//! interactive terminal chart lives in `tui`.

use std::path::Path;

use chrono::{Datelike, Months, NaiveDate};
use plotters::prelude::*;

use crate::domain::{CategoryShare, SeriesPoint};
use crate::error::AppError;

mod bar;
mod time_series;

pub use bar::{BarChartStyle, TextPosition, draw_bar_chart};
pub use time_series::{TimeSeriesStyle, draw_time_series};

/// Render a daily series (counts + moving average) to an SVG file.
pub fn render_time_series_svg(path: &Path, series: &[SeriesPoint], style: &TimeSeriesStyle) -> Result<(), AppError> {
    {
        let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
        draw_time_series(&root, series, style)?;
        root.present().map_err(chart_err)?;
    }
    log::info!("Wrote time-series chart to {}", path.display());
    Ok(())
}

/// Render a daily series to an SVG document in memory.
pub fn time_series_svg_string(series: &[SeriesPoint], style: &TimeSeriesStyle) -> Result<String, AppError> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (style.width, style.height)).into_drawing_area();
        draw_time_series(&root, series, style)?;
        root.present().map_err(chart_err)?;
    }
    Ok(buf)
}

/// Render a category distribution as horizontal bars to an SVG file.
pub fn render_bar_chart_svg(path: &Path, shares: &[CategoryShare], style: &BarChartStyle) -> Result<(), AppError> {
    {
        let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
        draw_bar_chart(&root, shares, style)?;
        root.present().map_err(chart_err)?;
    }
    log::info!("Wrote bar chart to {}", path.display());
    Ok(())
}

/// Render a category distribution to an SVG document in memory.
pub fn bar_chart_svg_string(shares: &[CategoryShare], style: &BarChartStyle) -> Result<String, AppError> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (style.width, style.height)).into_drawing_area();
        draw_bar_chart(&root, shares, style)?;
        root.present().map_err(chart_err)?;
    }
    Ok(buf)
}

/// Shift `date` forward by whole months, clamping to the end of the month.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Dates are plotted as day numbers so the axis is a plain `f64` range.
pub(crate) fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub(crate) fn format_day_number(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

pub(crate) fn chart_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::new(4, format!("Chart rendering failed: {e}"))
}
