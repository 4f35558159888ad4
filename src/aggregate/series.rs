//! Daily count series with a trailing moving average.
//!
//! Records are bucketed by calendar date, buckets are ordered ascending, and
//! each bucket gets the mean count over the `window` buckets ending at it.
//! The first `window - 1` buckets average over however many buckets exist so
//! far, so every position has a value.
//!
//! The window counts buckets, not calendar days: gaps between publication
//! dates are not filled with zeros.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::AggregateError;
use crate::domain::{RECORD_DATE_FORMAT, Record, SeriesConfig, SeriesPoint};

/// Build the daily series for `records`.
///
/// Fails without a partial result if any record lacks a parseable date.
pub fn daily_series<R: Record>(records: &[R], config: &SeriesConfig) -> Result<Vec<SeriesPoint>, AggregateError> {
    validate_series_config(config)?;

    let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        let date = parse_record_date(record, index, &config.date_field)?;
        *buckets.entry(date).or_insert(0) += 1;
    }

    let counts: Vec<usize> = buckets.values().copied().collect();
    let averages = trailing_mean(&counts, config.window);

    Ok(buckets
        .into_iter()
        .zip(averages)
        .map(|((date, count), moving_average)| SeriesPoint {
            date,
            count,
            moving_average,
        })
        .collect())
}

/// Recompute the moving average of an existing series with another window.
///
/// The input must already be ordered by date (as produced by `daily_series`).
pub fn rewindow(series: &[SeriesPoint], window: usize) -> Result<Vec<SeriesPoint>, AggregateError> {
    validate_window(window)?;
    let counts: Vec<usize> = series.iter().map(|p| p.count).collect();
    Ok(series
        .iter()
        .zip(trailing_mean(&counts, window))
        .map(|(p, moving_average)| SeriesPoint {
            moving_average,
            ..*p
        })
        .collect())
}

/// Mean over the trailing `window` values, shrinking at the start.
pub fn trailing_mean(values: &[usize], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0usize;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let len = (i + 1).min(window);
        out.push(sum as f64 / len as f64);
    }
    out
}

/// Parse a `DD/MM/YYYY` date string.
///
/// The year must be exactly four digits; chrono alone would also take
/// `01/01/20` (year 20) or a signed year.
pub fn parse_record_date_str(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let mut parts = raw.split('/');
    let (Some(day), Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    let digits = |s: &str, min: usize, max: usize| (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit());
    if !(digits(day, 1, 2) && digits(month, 1, 2) && digits(year, 4, 4)) {
        return None;
    }
    NaiveDate::parse_from_str(raw, RECORD_DATE_FORMAT).ok()
}

fn parse_record_date<R: Record>(record: &R, index: usize, field: &str) -> Result<NaiveDate, AggregateError> {
    let raw = record.field(field).ok_or_else(|| AggregateError::DateParse {
        index,
        field: field.to_string(),
        value: None,
    })?;
    parse_record_date_str(raw).ok_or_else(|| AggregateError::DateParse {
        index,
        field: field.to_string(),
        value: Some(raw.to_string()),
    })
}

fn validate_series_config(config: &SeriesConfig) -> Result<(), AggregateError> {
    validate_window(config.window)?;
    if config.date_field.trim().is_empty() {
        return Err(AggregateError::Configuration(
            "date field name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_window(window: usize) -> Result<(), AggregateError> {
    if window == 0 {
        return Err(AggregateError::Configuration(
            "moving-average window must be at least 1".to_string(),
        ));
    }
    Ok(())
}
