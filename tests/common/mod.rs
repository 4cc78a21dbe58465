#![allow(dead_code)]

use fleet_telemetry::domain::bar::{Bar, BarSequence};
use fleet_telemetry::domain::error::TelemetryError;
use fleet_telemetry::domain::fleet::{CombinedTelemetry, Manifest};
use fleet_telemetry::domain::market_summary::MarketSummary;
use fleet_telemetry::domain::options::OptionsSummary;
use fleet_telemetry::domain::portfolio::PortfolioSummary;
use fleet_telemetry::domain::telemetry::Telemetry;
use fleet_telemetry::ports::bar_source::{BarSource, SymbolBars};
use fleet_telemetry::ports::telemetry_sink::TelemetrySink;
use std::collections::HashMap;
use std::sync::Mutex;

pub struct MockBarSource {
    pub data: HashMap<String, SymbolBars>,
    pub errors: HashMap<String, String>,
}

impl MockBarSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, timeframe: &str, bars: Vec<Bar>) -> Self {
        self.data
            .entry(symbol.to_string())
            .or_default()
            .insert(timeframe.to_string(), BarSequence::new(bars));
        self
    }

    /// Listed, but loading it fails as a malformed source.
    pub fn with_malformed(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl BarSource for MockBarSource {
    fn list_symbols(&self) -> Result<Vec<String>, TelemetryError> {
        let mut symbols: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        symbols.sort();
        Ok(symbols)
    }

    fn load(&self, symbol: &str) -> Result<SymbolBars, TelemetryError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TelemetryError::malformed(symbol, reason.clone()));
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub telemetry: Mutex<Vec<Telemetry>>,
    pub canonical: Mutex<Vec<(String, String, usize)>>,
    pub portfolios: Mutex<Vec<(String, PortfolioSummary)>>,
    pub manifests: Mutex<Vec<Manifest>>,
    pub combined: Mutex<Vec<CombinedTelemetry>>,
    pub summaries: Mutex<Vec<MarketSummary>>,
    pub options: Mutex<Vec<OptionsSummary>>,
}

impl TelemetrySink for RecordingSink {
    fn write_telemetry(&self, telemetry: &Telemetry) -> Result<(), TelemetryError> {
        self.telemetry.lock().unwrap().push(telemetry.clone());
        Ok(())
    }

    fn write_canonical(
        &self,
        symbol: &str,
        timeframe: &str,
        bars: &BarSequence,
    ) -> Result<(), TelemetryError> {
        self.canonical
            .lock()
            .unwrap()
            .push((symbol.to_string(), timeframe.to_string(), bars.len()));
        Ok(())
    }

    fn write_portfolio(
        &self,
        timeframe: &str,
        summary: &PortfolioSummary,
    ) -> Result<(), TelemetryError> {
        self.portfolios
            .lock()
            .unwrap()
            .push((timeframe.to_string(), summary.clone()));
        Ok(())
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), TelemetryError> {
        self.manifests.lock().unwrap().push(manifest.clone());
        Ok(())
    }

    fn write_combined(&self, combined: &CombinedTelemetry) -> Result<(), TelemetryError> {
        self.combined.lock().unwrap().push(combined.clone());
        Ok(())
    }

    fn write_summary(&self, summary: &MarketSummary) -> Result<(), TelemetryError> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }

    fn write_options_summary(&self, summary: &OptionsSummary) -> Result<(), TelemetryError> {
        self.options.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

/// `n` bars one minute apart at a constant close and volume.
pub fn flat_bars(n: usize, close: f64) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar {
            volume: Some(1_000.0),
            ..Bar::new(i as i64 * 60, close)
        })
        .collect()
}

/// Closes rising linearly from `start` to `end` with a bullish MACD on every bar.
pub fn rising_bars(n: usize, start: f64, end: f64) -> Vec<Bar> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n)
        .map(|i| Bar {
            macd: Some(0.5),
            macd_signal: Some(0.2),
            macd_histogram: Some(0.3),
            ..Bar::new(i as i64 * 60, start + step * i as f64)
        })
        .collect()
}

/// Closes falling linearly with a bearish MACD on every bar.
pub fn falling_bars(n: usize, start: f64, end: f64) -> Vec<Bar> {
    rising_bars(n, start, end)
        .into_iter()
        .map(|b| Bar {
            macd: Some(-0.5),
            macd_signal: Some(-0.2),
            macd_histogram: Some(-0.3),
            ..b
        })
        .collect()
}
