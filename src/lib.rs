//! `propstat` library crate.
//!
//! The binary (`propstat`) is a thin wrapper around this library so that:
//!
//! - aggregation logic is testable without spawning processes
//! - ingest, storage and charts can be reused from other front-ends

pub mod aggregate;
pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod store;
pub mod tui;
