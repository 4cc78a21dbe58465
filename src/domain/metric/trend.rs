//! Trend score in `[-1, 1]`.
//!
//! Votes from the last bar: close above/below each moving average (+1/-1),
//! the MACD histogram sign (+1/-1), and the lookback return mapped through the
//! reference range. The score is the mean of whichever votes are available;
//! with no votes at all it is 0.

use super::MetricParams;
use crate::domain::bar::Bar;
use crate::domain::stats::{normalize, period_return, to_signed};

pub const TREND_DEFAULT: f64 = 0.0;

pub fn trend(bars: &[Bar], params: &MetricParams) -> f64 {
    let Some(last) = bars.last() else {
        return TREND_DEFAULT;
    };
    let price = last.close;

    let mut score = 0.0;
    let mut votes = 0usize;

    if price > 0.0 {
        for ma in [last.ma_short, last.ma_mid, last.ma_long].into_iter().flatten() {
            if ma > 0.0 {
                score += if price > ma { 1.0 } else { -1.0 };
                votes += 1;
            }
        }
    }

    if let Some(hist) = last.macd_histogram.filter(|h| *h != 0.0 && h.is_finite()) {
        score += if hist > 0.0 { 1.0 } else { -1.0 };
        votes += 1;
    }

    if bars.len() > params.lookback && params.lookback > 0 {
        let old = bars[bars.len() - params.lookback].close;
        if old > 0.0 {
            let ret = period_return(old, price);
            let range = params.trend_return_range;
            score += to_signed(normalize(ret, -range, range, true));
            votes += 1;
        }
    }

    if votes == 0 {
        return TREND_DEFAULT;
    }
    (score / votes as f64).clamp(-1.0, 1.0)
}
