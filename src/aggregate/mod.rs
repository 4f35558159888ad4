//! Aggregations over dated records.
//!
//! - daily count series with trailing moving average (`series`)
//! - category share distribution (`distribution`)
//! - average movement of a value series (`movement`)
//!
//! Everything here is pure: no I/O, no logging, no shared state. Failures are
//! reported as `AggregateError`, kept separate from ingest/storage errors.

use crate::error::AppError;

pub mod distribution;
pub mod movement;
pub mod series;

pub use distribution::*;
pub use movement::*;
pub use series::*;

/// Why an aggregation call was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateError {
    /// A record's date attribute is missing or not `DD/MM/YYYY`.
    ///
    /// `index` is the position of the offending record in the input.
    DateParse {
        index: usize,
        field: String,
        value: Option<String>,
    },
    /// Options rejected before any record was looked at.
    Configuration(String),
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::DateParse {
                index,
                field,
                value: Some(value),
            } => write!(
                f,
                "Record #{index}: invalid `{field}` date '{value}' (expected DD/MM/YYYY)."
            ),
            AggregateError::DateParse {
                index,
                field,
                value: None,
            } => write!(f, "Record #{index}: missing `{field}` date."),
            AggregateError::Configuration(msg) => write!(f, "Invalid aggregation options: {msg}"),
        }
    }
}

impl std::error::Error for AggregateError {}

impl From<AggregateError> for AppError {
    fn from(err: AggregateError) -> Self {
        let code = match err {
            AggregateError::DateParse { .. } => 3,
            AggregateError::Configuration(_) => 2,
        };
        AppError::new(code, err.to_string())
    }
}
