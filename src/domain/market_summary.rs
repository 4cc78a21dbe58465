//! Per-ticker behavioral profile built from the behavior metrics.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::bar::BarSequence;
use super::metric::{
    band::band_compression,
    basic_stats::{basic_stats, volatility_factor},
    follow_through::signal_follow_through,
    kernel::kernel_respect,
    persistence::macd_persistence,
    stop_hunt::stop_hunt_frequency,
    volume::volume_reliability,
    MetricParams,
};
use super::telemetry::round4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub ticker: String,
    pub bars: usize,
    pub time_range: TimeRange,
    #[serde(serialize_with = "round4::value")]
    pub kernel_respect_pct: f64,
    #[serde(serialize_with = "round4::value")]
    pub band_compression: f64,
    #[serde(serialize_with = "round4::value")]
    pub signal_follow_through: f64,
    #[serde(serialize_with = "round4::value")]
    pub stop_hunt_frequency: f64,
    #[serde(serialize_with = "round4::value")]
    pub volume_reliability: f64,
    #[serde(serialize_with = "round4::value")]
    pub macd_persistence: f64,
    #[serde(serialize_with = "round4::value")]
    pub volatility_factor: f64,
    #[serde(serialize_with = "round4::value")]
    pub volatility: f64,
    #[serde(serialize_with = "round4::value")]
    pub avg_return: f64,
    #[serde(serialize_with = "round4::value")]
    pub max_drawdown: f64,
    #[serde(serialize_with = "round4::value")]
    pub trend_adherence: f64,
    #[serde(serialize_with = "round4::value")]
    pub chop_sensitivity: f64,
    pub generated_at_utc: String,
}

/// `None` for an empty sequence.
pub fn summarize_market(
    ticker: &str,
    bars: &BarSequence,
    params: &MetricParams,
    generated_at: DateTime<Utc>,
) -> Option<MarketSummary> {
    let slice = bars.as_slice();
    let (first, last) = (slice.first()?, slice.last()?);

    let kernel_respect_pct = kernel_respect(slice, params);
    let band_compression = band_compression(slice, params);
    let signal_follow_through = signal_follow_through(slice, params);
    let stop_hunt_frequency = stop_hunt_frequency(slice, params);
    let macd_persistence = macd_persistence(slice, params);
    let volatility_factor = volatility_factor(slice, params);
    let stats = basic_stats(slice);

    Some(MarketSummary {
        ticker: ticker.to_string(),
        bars: slice.len(),
        time_range: TimeRange {
            start: first.timestamp,
            end: last.timestamp,
        },
        kernel_respect_pct,
        band_compression,
        signal_follow_through,
        stop_hunt_frequency,
        volume_reliability: volume_reliability(slice, params),
        macd_persistence,
        volatility_factor,
        volatility: stats.volatility,
        avg_return: stats.avg_return,
        max_drawdown: stats.max_drawdown,
        trend_adherence: trend_adherence(
            kernel_respect_pct,
            macd_persistence,
            signal_follow_through,
        ),
        chop_sensitivity: chop_sensitivity(
            stop_hunt_frequency,
            band_compression,
            volatility_factor,
        ),
        generated_at_utc: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

pub fn trend_adherence(kernel_respect: f64, persistence: f64, follow_through: f64) -> f64 {
    0.4 * kernel_respect + 0.3 * persistence + 0.3 * follow_through
}

pub fn chop_sensitivity(stop_hunt: f64, band_compression: f64, volatility_factor: f64) -> f64 {
    0.5 * stop_hunt + 0.3 * (1.0 - band_compression) + 0.2 * volatility_factor
}
