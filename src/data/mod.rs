//! Remote data sources.

pub mod almg;

pub use almg::{AlmgClient, parse_legislatures};
