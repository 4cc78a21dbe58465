//! Momentum score in `[-1, 1]` from the last bar's MACD histogram and line.
//!
//! `w * signed(hist / H) + (1 - w) * signed(macd / M)` where each term is the
//! value normalized over its fixed reference range. A missing value sits at
//! the center of its range and contributes 0.

use super::MetricParams;
use crate::domain::bar::Bar;
use crate::domain::stats::{normalize, to_signed};

pub const MOMENTUM_DEFAULT: f64 = 0.0;

pub fn momentum(bars: &[Bar], params: &MetricParams) -> f64 {
    let Some(last) = bars.last() else {
        return MOMENTUM_DEFAULT;
    };
    let hist = finite_or_zero(last.macd_histogram);
    let macd = finite_or_zero(last.macd);

    let h = params.histogram_range;
    let m = params.macd_range;
    let hist_norm = to_signed(normalize(hist, -h, h, true));
    let macd_norm = to_signed(normalize(macd, -m, m, true));

    let w = params.histogram_weight.clamp(0.0, 1.0);
    (hist_norm * w + macd_norm * (1.0 - w)).clamp(-1.0, 1.0)
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use approx::assert_abs_diff_eq;

    fn bar_with(hist: Option<f64>, macd: Option<f64>) -> Vec<Bar> {
        vec![Bar {
            macd_histogram: hist,
            macd,
            ..Bar::new(0, 100.0)
        }]
    }

    #[test]
    fn missing_indicators_are_neutral() {
        assert_eq!(momentum(&bar_with(None, None), &MetricParams::default()), 0.0);
        assert_eq!(momentum(&[], &MetricParams::default()), MOMENTUM_DEFAULT);
    }

    #[test]
    fn weighted_blend() {
        // hist 0.25 -> 0.75 -> 0.5 signed; macd 1.0 -> 0.75 -> 0.5 signed
        let m = momentum(&bar_with(Some(0.25), Some(1.0)), &MetricParams::default());
        assert_abs_diff_eq!(m, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn saturates_at_bounds() {
        let p = MetricParams::default();
        assert_abs_diff_eq!(momentum(&bar_with(Some(5.0), Some(50.0)), &p), 1.0);
        assert_abs_diff_eq!(momentum(&bar_with(Some(-5.0), Some(-50.0)), &p), -1.0);
    }

    #[test]
    fn positive_histogram_alone_is_positive() {
        let m = momentum(&bar_with(Some(0.1), None), &MetricParams::default());
        assert!(m > 0.0);
    }
}
