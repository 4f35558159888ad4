//! Command-line parsing for `propstat`.
//!
//! Argument parsing lives here; dispatch lives in `app`, so handlers stay
//! free of clap types beyond the `*Args` structs.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_CATEGORY_FIELD, DEFAULT_DATE_FIELD, DEFAULT_OTHER_THRESHOLD, DEFAULT_WINDOW, MovementMethod};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "propstat",
    version,
    about = "Legislative propositions from the ALMG open-data portal: ingest, daily trend, type distribution"
)]
pub struct Cli {
    /// Log debug details (overrides `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download yearly CSV exports and upsert them into the database.
    Ingest(IngestArgs),
    /// Upsert a CSV export already on disk.
    Import(ImportArgs),
    /// Fetch the legislature list and store it.
    Legislatures(DbArgs),
    /// Daily publication counts with a trailing moving average.
    Trend(TrendArgs),
    /// Distribution of propositions by type (or any other column).
    Types(TypesArgs),
    /// Launch the interactive terminal viewer.
    Tui(TuiArgs),
}

/// Database override shared by every command that touches the store.
#[derive(Debug, Args, Clone, Default)]
pub struct DbArgs {
    /// SQLite database file (defaults to `PROPSTAT_DB` or `proposicoes.db`).
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct IngestArgs {
    /// First year to download.
    #[arg(long = "from", value_name = "YEAR")]
    pub from_year: i32,

    /// Last year to download (inclusive).
    #[arg(long = "to", value_name = "YEAR")]
    pub to_year: i32,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ImportArgs {
    /// CSV export to read.
    #[arg(long, value_name = "CSV")]
    pub file: PathBuf,

    /// Year the export belongs to (guessed from the file name when omitted).
    #[arg(long)]
    pub year: Option<i32>,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Where the records come from: the database, or CSV files directly.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Read CSV exports instead of the database (repeatable).
    #[arg(long = "csv", value_name = "CSV", conflicts_with = "db")]
    pub csv: Vec<PathBuf>,

    /// Only use these export years, `2019..2022` or `2020`.
    #[arg(long, value_parser = parse_year_range)]
    pub years: Option<RangeInclusive<i32>>,
}

#[derive(Debug, Args, Clone)]
pub struct TrendArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Moving-average window, in days with publications.
    #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Column holding the `DD/MM/YYYY` date.
    #[arg(long, default_value = DEFAULT_DATE_FIELD)]
    pub date_field: String,

    /// How to summarize day-to-day movement of the counts.
    #[arg(long, value_enum, default_value_t = MovementMethod::Absolute)]
    pub movement: MovementMethod,

    /// Write the chart as SVG.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Chart title.
    #[arg(long, default_value = "Proposições publicadas por dia")]
    pub title: String,

    /// Export the series as CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Export the series as JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct TypesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column to count values of.
    #[arg(long, default_value = DEFAULT_CATEGORY_FIELD)]
    pub field: String,

    /// Categories with a smaller share are grouped as `Outras`.
    #[arg(long, default_value_t = DEFAULT_OTHER_THRESHOLD)]
    pub threshold: f64,

    /// Keep labels exactly as exported.
    #[arg(long)]
    pub raw_labels: bool,

    /// Write the chart as SVG.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Chart title.
    #[arg(long, default_value = "Proposições por tipo")]
    pub title: String,

    /// Disable the terminal bars.
    #[arg(long)]
    pub no_plot: bool,

    /// Bar width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Initial moving-average window.
    #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Column holding the `DD/MM/YYYY` date.
    #[arg(long, default_value = DEFAULT_DATE_FIELD)]
    pub date_field: String,
}

/// Parse `2019..2022`, `2019..=2022` or a single `2020`.
pub fn parse_year_range(raw: &str) -> Result<RangeInclusive<i32>, String> {
    let raw = raw.trim();
    let parse = |s: &str| s.trim().parse::<i32>().map_err(|_| format!("'{s}' is not a year"));

    let (start, end) = match raw.split_once("..") {
        Some((a, b)) => (parse(a)?, parse(b.trim_start_matches('='))?),
        None => {
            let y = parse(raw)?;
            (y, y)
        }
    };

    if start > end {
        return Err(format!("empty year range {start}..{end}"));
    }
    Ok(start..=end)
}
