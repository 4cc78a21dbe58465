//! Performance relative to a benchmark sequence, in `[-1, 1]`.

use super::MetricParams;
use crate::domain::bar::Bar;
use crate::domain::stats::{normalize, period_return, to_signed};

pub const RELATIVE_DEFAULT: f64 = 0.0;

/// Symbol return minus benchmark return over the trailing `lookback` bars of
/// each sequence, mapped through `[-R, R]`. Both sequences are read from
/// their own tails, so they only need to share a bar granularity.
pub fn relative_performance(bars: &[Bar], benchmark: &[Bar], params: &MetricParams) -> f64 {
    let lookback = params.lookback;
    if lookback == 0 || bars.len() < lookback || benchmark.len() < lookback {
        return RELATIVE_DEFAULT;
    }
    let symbol_ret = window_return(bars, lookback);
    let bench_ret = window_return(benchmark, lookback);
    let range = params.relative_range;
    to_signed(normalize(symbol_ret - bench_ret, -range, range, true))
}

fn window_return(bars: &[Bar], lookback: usize) -> f64 {
    let start = bars[bars.len() - lookback].close;
    let end = bars[bars.len() - 1].close;
    period_return(start, end)
}
