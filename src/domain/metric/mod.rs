//! Metric engine.
//!
//! Every metric is a pure function of a bar slice and [`MetricParams`] and
//! returns a bounded scalar. Short histories, missing columns and flat series
//! all resolve to the metric's named default instead of an error, because the
//! consuming visualization must always have something to render.
//!
//! Where more than one convention exists for the same metric, the variant is
//! an explicit enum chosen at configuration time.

pub mod activity;
pub mod band;
pub mod basic_stats;
pub mod drawdown;
pub mod follow_through;
pub mod kernel;
pub mod momentum;
pub mod persistence;
pub mod relative;
pub mod stop_hunt;
pub mod trend;
pub mod volatility;
pub mod volume;

use std::fmt;
use std::str::FromStr;

/// Realized-volatility convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolatilityMode {
    /// Population sigma of simple returns, unscaled.
    #[default]
    Raw,
    /// Mean true range as a fraction of the last close, scaled by 10 and
    /// clamped to `[0, 1]`.
    AtrPercent,
}

/// Volume-activity convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityMode {
    /// z-score of the last volume against the trailing window.
    #[default]
    ZScore,
    /// Last volume over its volume moving average, halved.
    VolumeMaRatio,
}

impl FromStr for VolatilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" | "stddev" => Ok(VolatilityMode::Raw),
            "atr" | "atr_pct" | "atr_percent" => Ok(VolatilityMode::AtrPercent),
            other => Err(format!("unknown volatility mode '{other}' (expected raw or atr)")),
        }
    }
}

impl fmt::Display for VolatilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityMode::Raw => write!(f, "raw"),
            VolatilityMode::AtrPercent => write!(f, "atr"),
        }
    }
}

impl FromStr for ActivityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zscore" | "z_score" => Ok(ActivityMode::ZScore),
            "volume_ma" | "ratio" => Ok(ActivityMode::VolumeMaRatio),
            other => Err(format!(
                "unknown activity mode '{other}' (expected zscore or volume_ma)"
            )),
        }
    }
}

impl fmt::Display for ActivityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityMode::ZScore => write!(f, "zscore"),
            ActivityMode::VolumeMaRatio => write!(f, "volume_ma"),
        }
    }
}

/// Tunable windows, reference ranges and thresholds for the metric engine.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricParams {
    /// Trailing window for trend, volatility, activity and relative performance.
    pub lookback: usize,
    /// Trailing window for the drawdown high-water mark.
    pub drawdown_lookback: usize,
    pub volatility_mode: VolatilityMode,
    pub activity_mode: ActivityMode,
    /// Half-width of the reference range for the lookback return in `trend`.
    pub trend_return_range: f64,
    /// Histogram reference half-range (H) for `momentum`.
    pub histogram_range: f64,
    /// MACD-line reference half-range (M) for `momentum`.
    pub macd_range: f64,
    pub histogram_weight: f64,
    /// z-score half-range mapped onto `[0, 1]` by `activity`.
    pub activity_z_range: f64,
    /// Half-width of the excess-return reference range.
    pub relative_range: f64,
    /// Kernel band width in multiples of the robust return scale.
    pub kernel_band_factor: f64,
    pub band_low_percentile: f64,
    pub band_high_percentile: f64,
    /// Forward bars inspected after a buy/sell marker.
    pub follow_horizon: usize,
    /// Favorable move that counts as follow-through.
    pub follow_target: f64,
    /// Stop-marker frequency treated as fully choppy.
    pub stop_reference_frequency: f64,
    /// Trailing window for the synthetic volume MA when no MA column exists.
    pub volume_ma_window: usize,
    pub volume_ma_min_periods: usize,
    /// Histogram streak length treated as fully persistent.
    pub persistence_reference_streak: f64,
    /// Mean absolute per-bar return treated as fully volatile.
    pub volatility_factor_reference: f64,
}

impl Default for MetricParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            drawdown_lookback: 50,
            volatility_mode: VolatilityMode::Raw,
            activity_mode: ActivityMode::ZScore,
            trend_return_range: 0.2,
            histogram_range: 0.5,
            macd_range: 2.0,
            histogram_weight: 0.7,
            activity_z_range: 2.0,
            relative_range: 0.3,
            kernel_band_factor: 2.0,
            band_low_percentile: 10.0,
            band_high_percentile: 90.0,
            follow_horizon: 8,
            follow_target: 0.012,
            stop_reference_frequency: 0.2,
            volume_ma_window: 40,
            volume_ma_min_periods: 10,
            persistence_reference_streak: 10.0,
            volatility_factor_reference: 0.015,
        }
    }
}

/// Minimum bars for the behavior metrics (kernel, band, stop-hunt, volume).
pub const MIN_BEHAVIOR_BARS: usize = 10;

/// Minimum bars for the forward-looking and streak metrics.
pub const MIN_SIGNAL_BARS: usize = 20;
