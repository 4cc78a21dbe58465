//! Volume activity in `[0, 1]`.

use super::{ActivityMode, MetricParams};
use crate::domain::bar::Bar;
use crate::domain::stats::{clamp01, mean, normalize, population_std, z_score};

pub const ACTIVITY_DEFAULT: f64 = 0.5;

pub fn activity(bars: &[Bar], params: &MetricParams) -> f64 {
    match params.activity_mode {
        ActivityMode::ZScore => zscore_activity(bars, params),
        ActivityMode::VolumeMaRatio => ratio_activity(bars),
    }
}

/// z-score of the last bar's volume against the mean and sigma of the
/// `lookback` bars before it, mapped from `[-R, R]` onto `[0, 1]`.
///
/// Bars without a volume inside the window are left out of the statistics.
/// A zero-mean window or a missing last volume is neutral.
pub fn zscore_activity(bars: &[Bar], params: &MetricParams) -> f64 {
    let lookback = params.lookback;
    if lookback == 0 || bars.len() < lookback + 1 {
        return ACTIVITY_DEFAULT;
    }
    let Some(current) = bars[bars.len() - 1].volume.filter(|v| v.is_finite()) else {
        return ACTIVITY_DEFAULT;
    };
    let window: Vec<f64> = bars[bars.len() - 1 - lookback..bars.len() - 1]
        .iter()
        .filter_map(|b| b.volume)
        .filter(|v| v.is_finite())
        .collect();
    let (Some(avg), Some(std)) = (mean(&window), population_std(&window)) else {
        return ACTIVITY_DEFAULT;
    };
    if avg == 0.0 {
        return ACTIVITY_DEFAULT;
    }
    let z = z_score(current, avg, std);
    let range = params.activity_z_range;
    normalize(z, -range, range, true)
}

/// Last volume over its moving-average column, halved and clamped, so a
/// volume at its average reads 0.5. Without a usable MA the volume is its own
/// average.
pub fn ratio_activity(bars: &[Bar]) -> f64 {
    let Some(last) = bars.last() else {
        return ACTIVITY_DEFAULT;
    };
    let Some(volume) = last.volume.filter(|v| v.is_finite()) else {
        return ACTIVITY_DEFAULT;
    };
    let volume_ma = last.volume_ma.filter(|ma| *ma > 0.0).unwrap_or(volume);
    let ratio = if volume_ma > 0.0 { volume / volume_ma } else { 1.0 };
    clamp01(ratio / 2.0)
}
