//! Average movement of a dated value series.
//!
//! Differences are taken between each observation and the one `periods`
//! positions earlier, after ordering by date. Undefined terms (e.g. a
//! percentage change from zero to zero) are left out of the mean; infinite
//! ones are kept.

use chrono::NaiveDate;

use super::AggregateError;
use crate::domain::{MovementMethod, SeriesPoint, TimeUnit};

/// Mean movement of `points` according to `method`.
///
/// Returns `Ok(None)` when there are not enough observations to form a single
/// difference.
pub fn average_movement(
    points: &[(NaiveDate, f64)],
    method: MovementMethod,
    periods: usize,
    time_unit: TimeUnit,
) -> Result<Option<f64>, AggregateError> {
    if periods == 0 {
        return Err(AggregateError::Configuration(
            "movement periods must be at least 1".to_string(),
        ));
    }

    let mut sorted = points.to_vec();
    sorted.sort_by_key(|(d, _)| *d);

    let mut sum = 0.0;
    let mut n = 0usize;
    for i in periods..sorted.len() {
        let (d0, prev) = sorted[i - periods];
        let (d1, curr) = sorted[i];
        let diff = curr - prev;

        let term = match method {
            MovementMethod::Absolute => diff.abs(),
            MovementMethod::Net => diff,
            MovementMethod::Percent => diff / prev,
            MovementMethod::PercentAbs => (diff / prev).abs(),
            MovementMethod::PerDay => {
                let elapsed = (d1 - d0).num_seconds() as f64 / time_unit.seconds();
                diff.abs() / elapsed
            }
        };

        if term.is_nan() {
            continue;
        }
        sum += term;
        n += 1;
    }

    if n == 0 {
        return Ok(None);
    }
    Ok(Some(sum / n as f64))
}

/// `(date, count)` pairs of a daily series.
pub fn series_counts(series: &[SeriesPoint]) -> Vec<(NaiveDate, f64)> {
    series.iter().map(|p| (p.date, p.count as f64)).collect()
}
