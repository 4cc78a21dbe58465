//! MACD persistence: how long histogram streaks last before flipping sign.

use super::{MetricParams, MIN_SIGNAL_BARS};
use crate::domain::bar::Bar;
use crate::domain::stats::{clamp01, mean};

pub const MACD_PERSISTENCE_DEFAULT: f64 = 0.5;

/// Mean run length of same-sign histogram streaks divided by the reference
/// streak length, clamped. Bars with a missing or exactly-zero histogram carry
/// no direction and are skipped without breaking the current streak.
pub fn macd_persistence(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < MIN_SIGNAL_BARS || params.persistence_reference_streak <= 0.0 {
        return MACD_PERSISTENCE_DEFAULT;
    }
    let signs = bars
        .iter()
        .filter_map(|b| b.macd_histogram)
        .filter(|h| h.is_finite() && *h != 0.0)
        .map(|h| h > 0.0);

    let streaks = streak_lengths(signs);
    let Some(avg) = mean(&streaks) else {
        return MACD_PERSISTENCE_DEFAULT;
    };
    clamp01(avg / params.persistence_reference_streak)
}

fn streak_lengths(signs: impl Iterator<Item = bool>) -> Vec<f64> {
    let mut streaks = Vec::new();
    let mut current: Option<(bool, usize)> = None;
    for sign in signs {
        current = match current {
            Some((s, n)) if s == sign => Some((s, n + 1)),
            Some((_, n)) => {
                streaks.push(n as f64);
                Some((sign, 1))
            }
            None => Some((sign, 1)),
        };
    }
    if let Some((_, n)) = current {
        streaks.push(n as f64);
    }
    streaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::test_support::bars_from_closes;
    use approx::assert_abs_diff_eq;

    fn with_histogram(values: &[f64]) -> Vec<Bar> {
        let mut bars = bars_from_closes(&vec![100.0; values.len()]);
        for (bar, h) in bars.iter_mut().zip(values) {
            bar.macd_histogram = Some(*h);
        }
        bars
    }

    #[test]
    fn streak_lengths_basic() {
        let streaks = streak_lengths([true, true, false, true, true, true].into_iter());
        assert_eq!(streaks, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn missing_histogram_is_default() {
        let bars = bars_from_closes(&[100.0; 30]);
        assert_eq!(
            macd_persistence(&bars, &MetricParams::default()),
            MACD_PERSISTENCE_DEFAULT
        );
    }

    #[test]
    fn alternating_signs_are_not_persistent() {
        let values: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 0.1 } else { -0.1 }).collect();
        let bars = with_histogram(&values);
        assert_abs_diff_eq!(macd_persistence(&bars, &MetricParams::default()), 0.1);
    }

    #[test]
    fn long_streaks_saturate() {
        let bars = with_histogram(&[0.2; 25]);
        assert_eq!(macd_persistence(&bars, &MetricParams::default()), 1.0);
    }

    #[test]
    fn five_bar_streaks_score_half() {
        let values: Vec<f64> = (0..20)
            .map(|i| if (i / 5) % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let bars = with_histogram(&values);
        assert_abs_diff_eq!(macd_persistence(&bars, &MetricParams::default()), 0.5);
    }
}
