//! Volume reliability: how steadily volume tracks its moving average.

use super::{MetricParams, MIN_BEHAVIOR_BARS};
use crate::domain::bar::Bar;
use crate::domain::stats::{clamp01, mean, population_std};

pub const VOLUME_RELIABILITY_DEFAULT: f64 = 0.5;

/// `1 / (1 + sigma(volume / volume_ma))`.
///
/// The MA column is used when the source has one; otherwise each bar's MA is
/// the trailing `volume_ma_window` mean of volume, defined once
/// `volume_ma_min_periods` volumes are available. Ratios with a missing or
/// non-positive MA are skipped.
pub fn volume_reliability(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < MIN_BEHAVIOR_BARS {
        return VOLUME_RELIABILITY_DEFAULT;
    }
    if !bars.iter().any(|b| b.volume.is_some_and(f64::is_finite)) {
        return VOLUME_RELIABILITY_DEFAULT;
    }

    let has_ma_column = bars.iter().any(|b| b.volume_ma.is_some());
    let averages: Vec<Option<f64>> = if has_ma_column {
        bars.iter().map(|b| b.volume_ma).collect()
    } else {
        rolling_volume_mean(bars, params.volume_ma_window, params.volume_ma_min_periods)
    };

    let ratios: Vec<f64> = bars
        .iter()
        .zip(averages)
        .filter_map(|(bar, ma)| {
            let volume = bar.volume?;
            let ma = ma.filter(|m| *m > 0.0)?;
            Some(volume / ma)
        })
        .filter(|r| r.is_finite())
        .collect();

    let Some(dispersion) = population_std(&ratios) else {
        return VOLUME_RELIABILITY_DEFAULT;
    };
    clamp01(1.0 / (1.0 + dispersion))
}

fn rolling_volume_mean(bars: &[Bar], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..bars.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let present: Vec<f64> = bars[start..=i]
                .iter()
                .filter_map(|b| b.volume)
                .filter(|v| v.is_finite())
                .collect();
            if present.len() < min_periods {
                return None;
            }
            mean(&present)
        })
        .collect()
}
