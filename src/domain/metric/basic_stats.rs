//! Whole-history return statistics for the market summary.

use super::{MetricParams, MIN_BEHAVIOR_BARS};
use crate::domain::bar::Bar;
use crate::domain::stats::{clamp01, mean, sample_std, simple_returns};

pub const VOLATILITY_FACTOR_DEFAULT: f64 = 0.5;

const MIN_FACTOR_RETURNS: usize = 5;

/// Realized volatility, mean return and worst peak-to-trough decline over the
/// full history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BasicStats {
    pub volatility: f64,
    pub avg_return: f64,
    pub max_drawdown: f64,
}

pub fn basic_stats(bars: &[Bar]) -> BasicStats {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let returns = simple_returns(&closes);
    BasicStats {
        volatility: sample_std(&returns).unwrap_or(0.0),
        avg_return: mean(&returns).unwrap_or(0.0),
        max_drawdown: max_drawdown(&closes),
    }
}

/// Mean absolute per-bar return against the reference level, clamped.
pub fn volatility_factor(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < MIN_BEHAVIOR_BARS || params.volatility_factor_reference <= 0.0 {
        return VOLATILITY_FACTOR_DEFAULT;
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let absolute: Vec<f64> = simple_returns(&closes).iter().map(|r| r.abs()).collect();
    if absolute.len() < MIN_FACTOR_RETURNS {
        return VOLATILITY_FACTOR_DEFAULT;
    }
    match mean(&absolute) {
        Some(avg) => clamp01(avg / params.volatility_factor_reference),
        None => VOLATILITY_FACTOR_DEFAULT,
    }
}

/// Most negative `close / running_peak - 1`; zero for an empty or rising series.
fn max_drawdown(closes: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &close in closes.iter().filter(|c| c.is_finite()) {
        peak = peak.max(close);
        if peak > 0.0 {
            worst = worst.min(close / peak - 1.0);
        }
    }
    worst
}
