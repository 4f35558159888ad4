//! Reporting utilities: number formatting and terminal summaries.

pub mod format;

pub use format::*;
