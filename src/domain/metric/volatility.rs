//! Realized volatility, in one of two conventions (see [`VolatilityMode`]).

use super::{MetricParams, VolatilityMode};
use crate::domain::bar::{tail, Bar};
use crate::domain::stats::{clamp01, mean, population_std, simple_returns};

/// Default for the raw-sigma convention: a moderate volatility.
pub const RAW_VOLATILITY_DEFAULT: f64 = 0.3;

/// Default for the bounded ATR convention.
pub const BOUNDED_VOLATILITY_DEFAULT: f64 = 0.5;

const ATR_PERCENT_SCALE: f64 = 10.0;

pub fn volatility(bars: &[Bar], params: &MetricParams) -> f64 {
    match params.volatility_mode {
        VolatilityMode::Raw => raw_volatility(bars, params.lookback),
        VolatilityMode::AtrPercent => atr_volatility(bars, params.lookback),
    }
}

/// Default value of the configured convention.
pub fn volatility_default(mode: VolatilityMode) -> f64 {
    match mode {
        VolatilityMode::Raw => RAW_VOLATILITY_DEFAULT,
        VolatilityMode::AtrPercent => BOUNDED_VOLATILITY_DEFAULT,
    }
}

/// Population sigma of the last `lookback` simple returns.
/// Needs `lookback + 1` bars.
pub fn raw_volatility(bars: &[Bar], lookback: usize) -> f64 {
    if lookback == 0 || bars.len() < lookback + 1 {
        return RAW_VOLATILITY_DEFAULT;
    }
    let closes: Vec<f64> = tail(bars, lookback + 1).iter().map(|b| b.close).collect();
    let returns = simple_returns(&closes);
    population_std(&returns).unwrap_or(RAW_VOLATILITY_DEFAULT)
}

/// Mean true range over the last `lookback` bars as a fraction of the last
/// close, times 10, clamped to `[0, 1]`. The first bar of the window uses its
/// own high-low range.
pub fn atr_volatility(bars: &[Bar], lookback: usize) -> f64 {
    if lookback == 0 || bars.len() < lookback {
        return BOUNDED_VOLATILITY_DEFAULT;
    }
    let start = bars.len() - lookback;
    let ranges: Vec<f64> = (start..bars.len())
        .map(|i| {
            let bar = &bars[i];
            if i == start {
                bar.high.unwrap_or(bar.close) - bar.low.unwrap_or(bar.close)
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();
    let Some(atr) = mean(&ranges) else {
        return BOUNDED_VOLATILITY_DEFAULT;
    };
    let last_close = bars[bars.len() - 1].close;
    let atr_pct = if last_close > 0.0 { atr / last_close } else { 0.0 };
    clamp01(atr_pct * ATR_PERCENT_SCALE)
}
