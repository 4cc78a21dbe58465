//! Kernel respect: how often price stays inside a volatility-scaled band
//! around the kernel regression estimate.

use super::{MetricParams, MIN_BEHAVIOR_BARS};
use crate::domain::bar::Bar;
use crate::domain::stats::{population_std, robust_scale, simple_returns, SCALE_EPSILON};

pub const KERNEL_RESPECT_DEFAULT: f64 = 0.5;

/// Fraction of bars (among those carrying a kernel estimate) where
/// `|close - kernel| < |close| * scale * factor`.
///
/// `scale` is the MAD-based dispersion of bar returns; when the MAD collapses
/// (mostly flat returns with rare moves) the population sigma stands in.
pub fn kernel_respect(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < MIN_BEHAVIOR_BARS {
        return KERNEL_RESPECT_DEFAULT;
    }
    let pairs: Vec<(f64, f64)> = bars
        .iter()
        .filter_map(|b| b.kernel_estimate.map(|k| (b.close, k)))
        .filter(|(c, k)| c.is_finite() && k.is_finite())
        .collect();
    if pairs.is_empty() {
        return KERNEL_RESPECT_DEFAULT;
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let scale = return_scale(&simple_returns(&closes));

    let tolerance = scale * params.kernel_band_factor;
    let within = pairs
        .iter()
        .filter(|(close, kernel)| (close - kernel).abs() < close.abs() * tolerance)
        .count();
    within as f64 / pairs.len() as f64
}

fn return_scale(returns: &[f64]) -> f64 {
    let mad = robust_scale(returns);
    if mad > SCALE_EPSILON {
        return mad;
    }
    population_std(returns)
        .filter(|s| *s > 0.0)
        .unwrap_or(SCALE_EPSILON)
}
