//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarSource;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_chart_adapter::JsonChartSource;
use crate::adapters::json_sink::JsonFileSink;
use crate::adapters::options_file::load_options_book;
use crate::domain::engine_config::{
    EngineConfig, FleetConfig, InputFormat, DEFAULT_CSV_TIMEFRAME,
};
use crate::domain::error::TelemetryError;
use crate::domain::fleet::{
    run_fleet, run_options_summaries, run_summaries, FleetReport,
};
use crate::ports::bar_source::BarSource;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(
    name = "fleet-telemetry",
    about = "Convert chart exports into UI-ready telemetry JSON"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate per-symbol telemetry, portfolios, manifest and combined file
    Generate {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [input] dir
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Overrides [output] dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Summarize a directory of CSV exports into per-ticker behavior profiles
    Summarize {
        #[arg(long)]
        csv_dir: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Options book JSON with `positions` and `catalysts`
        #[arg(long)]
        options: Option<PathBuf>,
        /// Defaults to `options_summaries` beside the summaries directory
        #[arg(long)]
        options_out: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Generate {
            config,
            input,
            output,
            dry_run,
        } => run_generate(&config, input, output, dry_run),
        Command::Summarize {
            csv_dir,
            out,
            config,
            options,
            options_out,
        } => {
            let market = run_summarize(&csv_dir, &out, config.as_ref());
            let Some(book) = options else {
                return market;
            };
            // the options book is summarized even when the CSV pass failed
            let dir = options_out.unwrap_or_else(|| default_options_dir(&out));
            let book_status = run_options(&book, &dir);
            if market == ExitCode::SUCCESS {
                book_status
            } else {
                market
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &TelemetryError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Load and validate the fleet configuration, applying CLI path overrides.
pub fn build_fleet_config(
    adapter: &dyn ConfigPort,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<FleetConfig, TelemetryError> {
    let mut fleet = FleetConfig::from_config(adapter)?;
    if let Some(dir) = input {
        fleet.input_dir = dir;
    }
    if let Some(dir) = output {
        fleet.output_dir = dir;
    }
    Ok(fleet)
}

pub fn open_source(fleet: &FleetConfig) -> Result<Box<dyn BarSource>, TelemetryError> {
    Ok(match fleet.input_format {
        InputFormat::Json => Box::new(JsonChartSource::open(&fleet.input_dir, &fleet.timeframes)?),
        InputFormat::Csv => Box::new(CsvBarSource::open(&fleet.input_dir, &fleet.csv_timeframe)?),
    })
}

fn run_generate(
    config_path: &PathBuf,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let fleet = match build_fleet_config(&adapter, input, output) {
        Ok(f) => f,
        Err(e) => return fail(&e),
    };

    let source = match open_source(&fleet) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if dry_run {
        return run_dry_run(&fleet, source.as_ref());
    }

    let sink = JsonFileSink::new(&fleet.output_dir)
        .with_canonical_dir(fleet.canonical_dir.clone());

    log::info!(
        "generating telemetry from {} into {}",
        fleet.input_dir.display(),
        fleet.output_dir.display()
    );
    match run_fleet(source.as_ref(), &sink, &fleet, Utc::now()) {
        Ok(report) => {
            print_fleet_report(&report, &fleet.output_dir);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_fleet_report(report: &FleetReport, output_dir: &Path) {
    eprintln!("\n=== Fleet Telemetry ===");
    eprintln!("Symbols:          {}", report.processed.len());
    eprintln!("Records written:  {}", report.telemetry_written);
    eprintln!("Timeframes:       {}", report.manifest.timeframes.join(", "));
    if !report.skipped.is_empty() {
        eprintln!("Skipped:          {}", report.skipped.len());
        for skip in &report.skipped {
            eprintln!("  {:<8} {}", skip.symbol, skip.reason);
        }
    }
    if !report.portfolios.is_empty() {
        eprintln!("\n=== Portfolio ===");
        for (label, summary) in &report.portfolios {
            eprintln!(
                "  {:<5} health={:>5.1}%  sentiment={:.2}  tickers={}",
                label,
                summary.health_score * 100.0,
                summary.sentiment,
                summary.summary.ticker_count
            );
        }
    }
    eprintln!("\nOutput: {}", output_dir.display());
}

fn run_dry_run(fleet: &FleetConfig, source: &dyn BarSource) -> ExitCode {
    let symbols = match source.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    print_engine(&fleet.engine);
    eprintln!("\nInput:");
    eprintln!("  dir:        {}", fleet.input_dir.display());
    eprintln!("  timeframes: {}", fleet.timeframe_labels().join(", "));
    eprintln!("  symbols:    {}", symbols.join(", "));
    eprintln!("\nBenchmarks:");
    for symbol in symbols.iter().filter(|s| !fleet.benchmarks.is_benchmark(s)) {
        eprintln!(
            "  {:<8} vs {}",
            symbol,
            fleet.benchmarks.resolve(symbol).unwrap_or("-")
        );
    }
    eprintln!("\nDry run complete: {} symbols would be processed", symbols.len());
    ExitCode::SUCCESS
}

fn run_summarize(csv_dir: &Path, out: &Path, config_path: Option<&PathBuf>) -> ExitCode {
    let (params, timeframe) = match config_path {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            let engine = match EngineConfig::from_config(&adapter) {
                Ok(e) => e,
                Err(e) => return fail(&e),
            };
            let timeframe = adapter
                .get_string("input", "csv_timeframe")
                .unwrap_or_else(|| DEFAULT_CSV_TIMEFRAME.to_string());
            (engine.metrics, timeframe)
        }
        None => (EngineConfig::default().metrics, DEFAULT_CSV_TIMEFRAME.to_string()),
    };

    eprintln!("Processing CSVs in {}...", csv_dir.display());
    let source = match CsvBarSource::open(csv_dir, &timeframe) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let sink = JsonFileSink::new(out).with_summaries_dir(Some(out.to_path_buf()));

    match run_summaries(&source, &sink, &params, Utc::now()) {
        Ok(summaries) => {
            for s in &summaries {
                eprintln!(
                    "  {:<8} {:>6} bars  trendAdherence={:.3}  chopSensitivity={:.3}",
                    s.ticker, s.bars, s.trend_adherence, s.chop_sensitivity
                );
            }
            eprintln!("\nSummaries written to {}", out.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// `data/market_summaries` pairs with `data/options_summaries`.
pub fn default_options_dir(summaries_out: &Path) -> PathBuf {
    summaries_out
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("options_summaries")
}

fn run_options(book_path: &Path, out: &Path) -> ExitCode {
    eprintln!("\nProcessing options from {}...", book_path.display());
    let book = match load_options_book(book_path) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    let sink = JsonFileSink::new(out).with_options_dir(Some(out.to_path_buf()));

    match run_options_summaries(&book, &sink, Utc::now().date_naive()) {
        Ok(summaries) => {
            for s in &summaries {
                eprintln!(
                    "  {:<8} {:<20} leverage={:.2}  {}d  catalysts={}",
                    s.ticker,
                    s.structure,
                    s.leverage_factor,
                    s.time_horizon_days,
                    s.upcoming_catalysts
                );
            }
            eprintln!("\nOptions summaries written to {}", out.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let fleet = match FleetConfig::from_config(&adapter) {
        Ok(f) => f,
        Err(e) => return fail(&e),
    };

    print_engine(&fleet.engine);
    eprintln!("\nTimeframes:");
    for (raw, label) in &fleet.timeframes {
        eprintln!("  {raw} -> {label}");
    }
    eprintln!("\nBenchmarks: {}", fleet.benchmarks.symbols.join(", "));
    if let Some(default) = &fleet.benchmarks.default {
        eprintln!("  default:   {default}");
    }
    for (symbol, bench) in &fleet.benchmarks.overrides {
        eprintln!("  {symbol:<8} -> {bench}");
    }
    eprintln!("\nConfig validated successfully");
    ExitCode::SUCCESS
}

fn print_engine(engine: &EngineConfig) {
    eprintln!("\nEngine:");
    eprintln!("  volatility: {}", engine.metrics.volatility_mode);
    eprintln!("  activity:   {}", engine.metrics.activity_mode);
    eprintln!("  classifier: {}", engine.classifier);
    eprintln!("  visual:     {}", engine.framing);
    eprintln!("  lookback:   {}", engine.metrics.lookback);
}
