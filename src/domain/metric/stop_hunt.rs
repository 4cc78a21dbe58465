//! Stop-hunt frequency: how choppy a symbol is, from the rate of stop markers.

use super::{MetricParams, MIN_BEHAVIOR_BARS};
use crate::domain::bar::Bar;
use crate::domain::stats::clamp01;

pub const STOP_HUNT_DEFAULT: f64 = 0.3;

/// Fired stop-buy plus stop-sell markers per bar, divided by the reference
/// frequency and clamped. A source with no stop columns at all is default.
pub fn stop_hunt_frequency(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < MIN_BEHAVIOR_BARS || params.stop_reference_frequency <= 0.0 {
        return STOP_HUNT_DEFAULT;
    }
    let has_column = bars
        .iter()
        .any(|b| b.stop_buy_signal.is_some() || b.stop_sell_signal.is_some());
    if !has_column {
        return STOP_HUNT_DEFAULT;
    }
    let stops: usize = bars.iter().map(Bar::stop_fired_count).sum();
    let frequency = stops as f64 / bars.len() as f64;
    clamp01(frequency / params.stop_reference_frequency)
}
