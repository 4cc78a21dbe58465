//! Band compression: 1 when the bands are tight relative to their own recent
//! range of widths, 0 when they are at their widest.

use super::{MetricParams, MIN_BEHAVIOR_BARS};
use crate::domain::bar::Bar;
use crate::domain::stats::{clamp01, median, percentile};

pub const BAND_COMPRESSION_DEFAULT: f64 = 0.5;

/// Which pair of series defines the band width, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidthSource {
    OuterBands,
    LongShortAverages,
    LongMidAverages,
    HighLow,
}

impl WidthSource {
    const PRIORITY: [WidthSource; 4] = [
        WidthSource::OuterBands,
        WidthSource::LongShortAverages,
        WidthSource::LongMidAverages,
        WidthSource::HighLow,
    ];

    fn width(self, bar: &Bar) -> Option<f64> {
        let (a, b) = match self {
            WidthSource::OuterBands => (bar.band_outer_top?, bar.band_outer_bottom?),
            WidthSource::LongShortAverages => (bar.ma_long?, bar.ma_short?),
            WidthSource::LongMidAverages => (bar.ma_long?, bar.ma_mid?),
            WidthSource::HighLow => (bar.high?, bar.low?),
        };
        Some((a - b).abs())
    }

    /// First source with a width on at least one bar.
    fn select(bars: &[Bar]) -> Option<WidthSource> {
        Self::PRIORITY
            .into_iter()
            .find(|source| bars.iter().any(|b| source.width(b).is_some()))
    }
}

/// `1 - (median(w) - p_lo) / (p_hi - p_lo)` over the price-normalized widths
/// `w = width / close`, clamped to `[0, 1]`. A degenerate percentile range
/// (all widths equal) is neutral.
pub fn band_compression(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < MIN_BEHAVIOR_BARS {
        return BAND_COMPRESSION_DEFAULT;
    }
    let Some(source) = WidthSource::select(bars) else {
        return BAND_COMPRESSION_DEFAULT;
    };
    let widths: Vec<f64> = bars
        .iter()
        .filter(|b| b.close != 0.0)
        .filter_map(|b| source.width(b).map(|w| w / b.close))
        .filter(|w| w.is_finite())
        .collect();

    let (Some(lo), Some(hi), Some(mid)) = (
        percentile(&widths, params.band_low_percentile),
        percentile(&widths, params.band_high_percentile),
        median(&widths),
    ) else {
        return BAND_COMPRESSION_DEFAULT;
    };
    if hi <= lo {
        return BAND_COMPRESSION_DEFAULT;
    }
    clamp01(1.0 - (mid - lo) / (hi - lo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::test_support::bars_from_closes;
    use approx::assert_abs_diff_eq;

    fn with_widths(widths: &[f64]) -> Vec<Bar> {
        let mut bars = bars_from_closes(&vec![100.0; widths.len()]);
        for (bar, w) in bars.iter_mut().zip(widths) {
            bar.band_outer_top = Some(100.0 + w / 2.0);
            bar.band_outer_bottom = Some(100.0 - w / 2.0);
        }
        bars
    }

    #[test]
    fn no_band_data_is_default() {
        let bars = bars_from_closes(&[100.0; 20]);
        assert_eq!(band_compression(&bars, &MetricParams::default()), BAND_COMPRESSION_DEFAULT);
    }

    #[test]
    fn constant_width_is_neutral() {
        let bars = with_widths(&[4.0; 20]);
        assert_eq!(band_compression(&bars, &MetricParams::default()), BAND_COMPRESSION_DEFAULT);
    }

    #[test]
    fn symmetric_widths_sit_mid_range() {
        let widths: Vec<f64> = (1..=11).map(|w| w as f64).collect();
        let bars = with_widths(&widths);
        assert_abs_diff_eq!(
            band_compression(&bars, &MetricParams::default()),
            0.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn mostly_tight_bands_are_compressed() {
        let mut widths = vec![1.0; 15];
        widths.extend([10.0, 10.0, 10.0, 10.0, 10.0]);
        let bars = with_widths(&widths);
        assert!(band_compression(&bars, &MetricParams::default()) > 0.9);
    }

    #[test]
    fn mostly_wide_bands_are_expanded() {
        let mut widths = vec![10.0; 15];
        widths.extend([1.0, 1.0, 1.0, 1.0, 1.0]);
        let bars = with_widths(&widths);
        assert!(band_compression(&bars, &MetricParams::default()) < 0.1);
    }

    #[test]
    fn falls_back_to_high_low() {
        let mut bars = bars_from_closes(&vec![100.0; 11]);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.high = Some(100.0 + i as f64);
            bar.low = Some(100.0);
        }
        assert_eq!(WidthSource::select(&bars), Some(WidthSource::HighLow));
        assert_abs_diff_eq!(
            band_compression(&bars, &MetricParams::default()),
            0.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn outer_bands_take_priority() {
        let mut bars = with_widths(&[2.0; 12]);
        bars[0].ma_long = Some(110.0);
        bars[0].ma_short = Some(90.0);
        assert_eq!(WidthSource::select(&bars), Some(WidthSource::OuterBands));
    }
}
