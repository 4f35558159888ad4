//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads settings and sets up logging
//! - parses CLI arguments
//! - downloads/imports exports into the store
//! - runs aggregations and prints reports/plots
//! - writes optional charts and exports

use std::path::PathBuf;

use clap::Parser;

use crate::aggregate::{category_distribution, daily_series};
use crate::chart::{BarChartStyle, TimeSeriesStyle, render_bar_chart_svg, render_time_series_svg};
use crate::cli::{Cli, Command, DbArgs, ImportArgs, IngestArgs, SourceArgs, TrendArgs, TuiArgs, TypesArgs};
use crate::config::Settings;
use crate::data::AlmgClient;
use crate::domain::{DistributionConfig, Proposition, SeriesConfig};
use crate::error::AppError;
use crate::io::ingest::{IngestedBatch, parse_propositions, read_propositions_file, year_from_path};
use crate::store::Store;

/// Entry point for the `propstat` binary.
pub fn run() -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let cli = Cli::parse();

    init_logging(&settings, &cli);

    match cli.command {
        Command::Ingest(args) => handle_ingest(args, &settings),
        Command::Import(args) => handle_import(args, &settings),
        Command::Legislatures(args) => handle_legislatures(args, &settings),
        Command::Trend(args) => handle_trend(args, &settings),
        Command::Types(args) => handle_types(args, &settings),
        Command::Tui(args) => handle_tui(args, &settings),
    }
}

fn init_logging(settings: &Settings, cli: &Cli) {
    // `settings.log_filter` already holds `RUST_LOG`, so the builder must not
    // read the environment again.
    let _ = env_logger::Builder::new()
        .parse_filters(log_filter(settings, cli))
        .target(env_logger::Target::Stderr)
        .try_init();
}

/// Effective log filter: the viewer owns the terminal and only lets errors
/// through, `--verbose` beats `RUST_LOG`, which beats the default.
fn log_filter<'a>(settings: &'a Settings, cli: &Cli) -> &'a str {
    match (&cli.command, cli.verbose) {
        (Command::Tui(_), _) => "error",
        (_, true) => "debug",
        (_, false) => settings.log_filter.as_str(),
    }
}

fn db_path(args: &DbArgs, settings: &Settings) -> PathBuf {
    args.db.clone().unwrap_or_else(|| settings.db_path.clone())
}

fn handle_ingest(args: IngestArgs, settings: &Settings) -> Result<(), AppError> {
    if args.from_year > args.to_year {
        return Err(AppError::new(
            2,
            format!("--from ({}) must not be after --to ({}).", args.from_year, args.to_year),
        ));
    }

    let client = AlmgClient::from_settings(settings);
    let mut store = Store::open(db_path(&args.db, settings))?;

    for year in args.from_year..=args.to_year {
        let body = client.download_propositions_csv(year)?;
        let batch = parse_propositions(&body, year)?;
        store_batch(&mut store, &batch)?;
    }

    log::info!(
        "Database now holds {} propositions (years {:?})",
        store.count_propositions()?,
        store.source_years()?
    );
    Ok(())
}

fn handle_import(args: ImportArgs, settings: &Settings) -> Result<(), AppError> {
    let year = match args.year.or_else(|| year_from_path(&args.file)) {
        Some(y) => y,
        None => {
            return Err(AppError::new(
                2,
                format!("Cannot tell the year of '{}'; pass --year.", args.file.display()),
            ));
        }
    };

    let batch = read_propositions_file(&args.file, year)?;
    let mut store = Store::open(db_path(&args.db, settings))?;
    store_batch(&mut store, &batch)
}

fn store_batch(store: &mut Store, batch: &IngestedBatch) -> Result<(), AppError> {
    let upserted = store.upsert_propositions(&batch.propositions)?;
    print!("{}", crate::report::format_ingest_summary(batch, upserted));
    Ok(())
}

fn handle_legislatures(args: DbArgs, settings: &Settings) -> Result<(), AppError> {
    let client = AlmgClient::from_settings(settings);
    let legislatures = client.fetch_legislatures()?;

    let mut store = Store::open(db_path(&args, settings))?;
    let n = store.upsert_legislatures(&legislatures)?;

    for l in store.list_legislatures()? {
        println!(
            "{:>3}  {} .. {}  eleição: {}",
            l.id,
            l.data_inicio.as_deref().unwrap_or("-"),
            l.data_termino.as_deref().unwrap_or("-"),
            l.data_eleicao.as_deref().unwrap_or("-"),
        );
    }
    log::info!("Stored {n} legislatures");
    Ok(())
}

fn handle_trend(args: TrendArgs, settings: &Settings) -> Result<(), AppError> {
    let records = load_records(&args.source, settings)?;
    let config = SeriesConfig {
        window: args.window,
        date_field: args.date_field.clone(),
    };
    let series = daily_series(&records, &config)?;

    print!("{}", crate::report::format_series_summary(&series, &config, args.movement));

    if !args.no_plot {
        println!();
        print!("{}", crate::plot::render_ascii_series(&series, args.width, args.height));
    }

    if let Some(path) = &args.svg {
        let style = TimeSeriesStyle {
            title: args.title.clone(),
            ..TimeSeriesStyle::default()
        };
        render_time_series_svg(path, &series, &style)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_series_csv(path, &series)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_series_json(path, &series, &config)?;
    }

    Ok(())
}

fn handle_types(args: TypesArgs, settings: &Settings) -> Result<(), AppError> {
    let records = load_records(&args.source, settings)?;
    let config = DistributionConfig {
        field: args.field.clone(),
        other_threshold: args.threshold,
        normalize_labels: !args.raw_labels,
        ..DistributionConfig::default()
    };
    let shares = category_distribution(&records, &config)?;

    print!("{}", crate::report::format_distribution(&shares, &config.field));

    if !args.no_plot && !shares.is_empty() {
        println!();
        let top_down: Vec<_> = shares.iter().rev().cloned().collect();
        print!("{}", crate::plot::render_ascii_bars(&top_down, args.width));
    }

    if let Some(path) = &args.svg {
        let style = BarChartStyle {
            title: args.title.clone(),
            ..BarChartStyle::default()
        };
        render_bar_chart_svg(path, &shares, &style)?;
    }

    Ok(())
}

fn handle_tui(args: TuiArgs, settings: &Settings) -> Result<(), AppError> {
    let config = SeriesConfig {
        window: args.window,
        date_field: args.date_field,
    };
    crate::tui::run(db_path(&args.db, settings), config, DistributionConfig::default())
}

/// Records for `trend`/`types`: CSV files when given, the store otherwise.
fn load_records(source: &SourceArgs, settings: &Settings) -> Result<Vec<Proposition>, AppError> {
    if source.csv.is_empty() {
        let store = Store::open(db_path(&source.db, settings))?;
        let records = store.load_propositions(source.years.clone())?;
        log::info!("Loaded {} propositions from the database", records.len());
        return Ok(records);
    }

    let mut records = Vec::new();
    for path in &source.csv {
        let year = year_from_path(path).unwrap_or_else(|| {
            log::warn!("Cannot tell the year of '{}'; --years will not match it", path.display());
            0
        });
        if let Some(years) = &source.years {
            if !years.contains(&year) {
                log::debug!("Skipping {} (year {year})", path.display());
                continue;
            }
        }
        let batch = read_propositions_file(path, year)?;
        if !batch.row_errors.is_empty() {
            log::warn!("{}: skipped {} rows", path.display(), batch.row_errors.len());
        }
        records.extend(batch.propositions);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_rust_log(filter: &str) -> Settings {
        Settings::from_lookup(|key| (key == "RUST_LOG").then(|| filter.to_string())).unwrap()
    }

    #[test]
    fn rust_log_applies_without_overrides() {
        let settings = settings_with_rust_log("propstat=trace");
        let cli = Cli::parse_from(["propstat", "trend"]);
        assert_eq!(log_filter(&settings, &cli), "propstat=trace");
        assert_eq!(log_filter(&Settings::default(), &cli), "info");
    }

    #[test]
    fn verbose_overrides_rust_log() {
        let settings = settings_with_rust_log("warn");
        let cli = Cli::parse_from(["propstat", "types", "--verbose"]);
        assert_eq!(log_filter(&settings, &cli), "debug");
    }

    #[test]
    fn viewer_only_logs_errors_whatever_rust_log_says() {
        let settings = settings_with_rust_log("info");
        let cli = Cli::parse_from(["propstat", "tui"]);
        assert_eq!(log_filter(&settings, &cli), "error");
        let cli = Cli::parse_from(["propstat", "-v", "tui"]);
        assert_eq!(log_filter(&settings, &cli), "error");
    }

    #[test]
    fn init_logging_uses_resolved_filter() {
        let settings = settings_with_rust_log("info");
        init_logging(&settings, &Cli::parse_from(["propstat", "tui"]));
        assert_eq!(log::max_level(), log::LevelFilter::Error);
    }
}
