//! Batch driver: evaluates every symbol of a [`BarSource`] and hands the
//! results to a [`TelemetrySink`].
//!
//! Symbols are evaluated independently on a rayon pool. Aggregation and every
//! write happen on the calling thread once all symbols are done, in sorted
//! symbol order.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::Serialize;

use super::bar::BarSequence;
use super::engine_config::{EngineConfig, FleetConfig};
use super::error::TelemetryError;
use super::market_summary::{summarize_market, MarketSummary};
use super::metric::MetricParams;
use super::options::{summarize_options, OptionsBook, OptionsSummary};
use super::portfolio::{summarize, PortfolioSummary};
use super::telemetry::{evaluate, Telemetry};
use crate::ports::bar_source::{BarSource, SymbolBars};
use crate::ports::telemetry_sink::TelemetrySink;

/// Which benchmark each symbol is measured against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BenchmarkPlan {
    pub symbols: Vec<String>,
    pub default: Option<String>,
    pub overrides: BTreeMap<String, String>,
}

impl BenchmarkPlan {
    pub fn is_benchmark(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Override first, then the default. Benchmarks are not measured against
    /// anything.
    pub fn resolve(&self, symbol: &str) -> Option<&str> {
        if self.is_benchmark(symbol) {
            return None;
        }
        self.overrides
            .get(symbol)
            .or(self.default.as_ref())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub timeframes: Vec<String>,
    pub benchmarks: Vec<String>,
    /// Processed symbols, benchmarks excluded.
    pub symbols: Vec<String>,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Manifest plus every telemetry record, keyed timeframe then symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedTelemetry {
    pub manifest: Manifest,
    pub telemetry: BTreeMap<String, BTreeMap<String, Telemetry>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Outcome of [`run_fleet`].
#[derive(Debug, Clone, PartialEq)]
pub struct FleetReport {
    pub processed: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
    pub telemetry_written: usize,
    pub portfolios: BTreeMap<String, PortfolioSummary>,
    pub manifest: Manifest,
}

struct SymbolOutcome {
    symbol: String,
    bars: SymbolBars,
    telemetry: Vec<Telemetry>,
}

pub fn run_fleet(
    source: &dyn BarSource,
    sink: &dyn TelemetrySink,
    config: &FleetConfig,
    updated_at: DateTime<Utc>,
) -> Result<FleetReport, TelemetryError> {
    let mut symbols = source.list_symbols()?;
    symbols.sort();
    symbols.dedup();
    log::info!("found {} symbols", symbols.len());

    let plan = &config.benchmarks;
    let mut benchmarks: BTreeMap<String, SymbolBars> = BTreeMap::new();
    for bench in symbols.iter().filter(|s| plan.is_benchmark(s)) {
        match source.load(bench) {
            Ok(bars) => {
                log::info!("loaded benchmark {bench}");
                benchmarks.insert(bench.clone(), bars);
            }
            Err(e @ TelemetryError::MalformedSource { .. }) => {
                log::warn!("skipping benchmark {bench}: {e}");
            }
            Err(e) => return Err(e),
        }
    }

    let labels = config.timeframe_labels();
    let evaluate_all = || -> Vec<Result<SymbolOutcome, TelemetryError>> {
        symbols
            .par_iter()
            .map(|symbol| -> Result<SymbolOutcome, TelemetryError> {
                let bars = match benchmarks.get(symbol) {
                    Some(bars) => bars.clone(),
                    None => source.load(symbol)?,
                };
                let benchmark = plan.resolve(symbol).and_then(|b| benchmarks.get(b));
                let telemetry =
                    evaluate_symbol(symbol, &bars, benchmark, &labels, &config.engine);
                Ok(SymbolOutcome {
                    symbol: symbol.clone(),
                    bars,
                    telemetry,
                })
            })
            .collect()
    };

    let results = if config.threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(std::io::Error::other)?;
        pool.install(evaluate_all)
    } else {
        evaluate_all()
    };

    let mut outcomes = Vec::new();
    let mut skipped = Vec::new();
    for (symbol, result) in symbols.iter().zip(results) {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(TelemetryError::MalformedSource { reason, .. }) => {
                log::warn!("skipping {symbol}: {reason}");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
            Err(e) => return Err(e),
        }
    }

    if outcomes.is_empty() {
        return Err(TelemetryError::NoData {
            reason: format!("no symbol could be processed ({} skipped)", skipped.len()),
        });
    }

    let mut by_timeframe: BTreeMap<String, BTreeMap<String, Telemetry>> = labels
        .iter()
        .map(|label| (label.clone(), BTreeMap::new()))
        .collect();
    let mut telemetry_written = 0;

    for outcome in &outcomes {
        if config.canonical_dir.is_some() {
            for (label, bars) in outcome.bars.iter().filter(|(l, _)| labels.contains(*l)) {
                if !bars.is_empty() {
                    sink.write_canonical(&outcome.symbol, label, bars)?;
                }
            }
        }
        for t in &outcome.telemetry {
            sink.write_telemetry(t)?;
            telemetry_written += 1;
            if let Some(slot) = by_timeframe.get_mut(&t.timeframe) {
                slot.insert(t.symbol.clone(), t.clone());
            }
        }
    }

    let mut portfolios = BTreeMap::new();
    for (label, records) in &by_timeframe {
        let members: Vec<Telemetry> = records
            .values()
            .filter(|t| !plan.is_benchmark(&t.symbol))
            .cloned()
            .collect();
        if let Some(summary) = summarize(&members) {
            log::info!(
                "{label}: health={:.0}%, sentiment={:.2}",
                summary.health_score * 100.0,
                summary.sentiment
            );
            sink.write_portfolio(label, &summary)?;
            portfolios.insert(label.clone(), summary);
        }
    }

    let processed: Vec<String> = outcomes.into_iter().map(|o| o.symbol).collect();
    let manifest = Manifest {
        timeframes: labels,
        benchmarks: plan.symbols.clone(),
        symbols: processed
            .iter()
            .filter(|s| !plan.is_benchmark(s))
            .cloned()
            .collect(),
        updated_at: updated_at.timestamp_millis(),
    };
    sink.write_manifest(&manifest)?;
    sink.write_combined(&CombinedTelemetry {
        manifest: manifest.clone(),
        telemetry: by_timeframe,
    })?;

    Ok(FleetReport {
        processed,
        skipped,
        telemetry_written,
        portfolios,
        manifest,
    })
}

/// One record per configured timeframe that has bars, in label order.
fn evaluate_symbol(
    symbol: &str,
    bars: &SymbolBars,
    benchmark: Option<&SymbolBars>,
    labels: &[String],
    engine: &EngineConfig,
) -> Vec<Telemetry> {
    labels
        .iter()
        .filter_map(|label| {
            let sequence = bars.get(label).filter(|b| !b.is_empty())?;
            let bench = benchmark.and_then(|b| b.get(label));
            let t = evaluate(symbol, label, sequence, bench, engine);
            log::debug!(
                "{symbol} {label}: price={:.2}, momentum={:+.2}, trend={:+.2}",
                t.price,
                t.momentum,
                t.trend
            );
            Some(t)
        })
        .collect()
}

/// One market summary per symbol from its first non-empty timeframe. Malformed
/// sources are skipped; fails when nothing could be summarized.
pub fn run_summaries(
    source: &dyn BarSource,
    sink: &dyn TelemetrySink,
    params: &MetricParams,
    generated_at: DateTime<Utc>,
) -> Result<Vec<MarketSummary>, TelemetryError> {
    let mut symbols = source.list_symbols()?;
    symbols.sort();
    symbols.dedup();

    let mut summaries = Vec::new();
    for symbol in &symbols {
        let bars = match source.load(symbol) {
            Ok(bars) => bars,
            Err(TelemetryError::MalformedSource { reason, .. }) => {
                log::warn!("skipping {symbol}: {reason}");
                continue;
            }
            Err(e) => return Err(e),
        };
        let Some(sequence) = first_non_empty(&bars) else {
            log::warn!("skipping {symbol}: no bars");
            continue;
        };
        if let Some(summary) = summarize_market(symbol, sequence, params, generated_at) {
            sink.write_summary(&summary)?;
            log::info!("{symbol}: {} bars summarized", summary.bars);
            summaries.push(summary);
        }
    }

    if summaries.is_empty() {
        return Err(TelemetryError::NoData {
            reason: "no symbol had bars to summarize".to_string(),
        });
    }
    Ok(summaries)
}

/// Summarize an options book and write one file per ticker. An empty book
/// is not an error; it writes nothing.
pub fn run_options_summaries(
    book: &OptionsBook,
    sink: &dyn TelemetrySink,
    today: NaiveDate,
) -> Result<Vec<OptionsSummary>, TelemetryError> {
    let summaries: Vec<OptionsSummary> = summarize_options(book, today).into_values().collect();
    if summaries.is_empty() {
        log::warn!("options book has no positions with a ticker");
    }
    for summary in &summaries {
        sink.write_options_summary(summary)?;
        log::info!("{}: {} options summary", summary.ticker, summary.structure);
    }
    Ok(summaries)
}

fn first_non_empty(bars: &SymbolBars) -> Option<&BarSequence> {
    bars.values().find(|b| !b.is_empty())
}
