//! Bar input port trait.

use std::collections::BTreeMap;

use crate::domain::bar::BarSequence;
use crate::domain::error::TelemetryError;

/// Bar sequences of one symbol, keyed by output timeframe label (`1D`, `45m`).
pub type SymbolBars = BTreeMap<String, BarSequence>;

/// A source of per-symbol bar histories.
///
/// Sources are shared across the worker pool, hence `Send + Sync`.
pub trait BarSource: Send + Sync {
    /// Every symbol the source can load, benchmarks included, uppercase.
    fn list_symbols(&self) -> Result<Vec<String>, TelemetryError>;

    /// Load all timeframes of `symbol`. A file that violates the input
    /// contract is a [`TelemetryError::MalformedSource`].
    fn load(&self, symbol: &str) -> Result<SymbolBars, TelemetryError>;
}
