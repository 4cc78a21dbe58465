//! Bar and bar-sequence representation.
//!
//! Every field except `timestamp` and `close` may be absent on any bar. Absence
//! is kept as `None` and never coerced to zero; each metric decides what a gap
//! means for it.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub timestamp: i64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_ma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_histogram: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_short: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_mid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_long: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_estimate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_outer_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band_outer_bottom: Option<f64>,
    /// `None` when the source carries no buy column; `Some(false)` when it does
    /// and the marker did not fire on this bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_signal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_signal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_buy_signal: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sell_signal: Option<bool>,
    /// MACD/signal-line crossover flagged on this bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossover: Option<bool>,
}

impl Bar {
    pub fn new(timestamp: i64, close: f64) -> Self {
        Self {
            timestamp,
            close,
            ..Self::default()
        }
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|), using the close
    /// wherever high or low is missing.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let high = self.high.unwrap_or(self.close);
        let low = self.low.unwrap_or(self.close);
        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// High if present, otherwise close.
    pub fn high_or_close(&self) -> f64 {
        self.high.unwrap_or(self.close)
    }

    pub fn buy_fired(&self) -> bool {
        fired(self.buy_signal)
    }

    pub fn sell_fired(&self) -> bool {
        fired(self.sell_signal)
    }

    pub fn stop_fired_count(&self) -> usize {
        usize::from(fired(self.stop_buy_signal)) + usize::from(fired(self.stop_sell_signal))
    }
}

fn fired(marker: Option<bool>) -> bool {
    marker.unwrap_or(false)
}

/// Chronologically ordered bars for one symbol and timeframe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BarSequence {
    bars: Vec<Bar>,
}

impl BarSequence {
    /// Sorts by timestamp and collapses duplicate timestamps, keeping the
    /// bar that appeared last in the input.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.reverse();
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    /// The trailing `n` bars (all of them when shorter).
    pub fn tail(&self, n: usize) -> &[Bar] {
        tail(&self.bars, n)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

impl From<Vec<Bar>> for BarSequence {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}

pub fn tail(bars: &[Bar], n: usize) -> &[Bar] {
    &bars[bars.len().saturating_sub(n)..]
}
