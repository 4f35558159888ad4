//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the `Record` trait and the `Proposition` / `Legislature` rows
//! - aggregation options (`SeriesConfig`, `DistributionConfig`)
//! - aggregation outputs (`SeriesPoint`, `CategoryShare`)

pub mod types;

pub use types::*;
