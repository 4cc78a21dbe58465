//! Current drawdown from the trailing high, and the composite stress score.

use super::MetricParams;
use crate::domain::bar::{tail, Bar};
use crate::domain::stats::clamp01;

pub const DRAWDOWN_DEFAULT: f64 = 0.0;

/// `(close - trailing_high) / trailing_high` over the last `drawdown_lookback`
/// bars, in `[-1, 0]`. The trailing high uses each bar's high, or its close
/// when the high is missing.
pub fn drawdown(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < 2 || params.drawdown_lookback == 0 {
        return DRAWDOWN_DEFAULT;
    }
    let window = tail(bars, params.drawdown_lookback);
    let high = window
        .iter()
        .map(Bar::high_or_close)
        .filter(|h| h.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !high.is_finite() || high <= 0.0 {
        return DRAWDOWN_DEFAULT;
    }
    let current = window[window.len() - 1].close;
    ((current - high) / high).clamp(-1.0, 0.0)
}

/// Blend of drawdown depth and volatility, `min(1, 3|dd| + 0.5 vol)`.
pub fn stress(drawdown: f64, volatility: f64) -> f64 {
    clamp01(drawdown.abs() * 3.0 + volatility * 0.5)
}
