//! Zero-safe statistical primitives shared by every metric.
//!
//! None of these functions divide by zero or return NaN for empty, flat or
//! missing input: a flat series is neutral, not an error.

/// Smallest scale `robust_scale` will report.
pub const SCALE_EPSILON: f64 = 1e-6;

/// Consistency constant turning a MAD into a normal-equivalent sigma.
const MAD_TO_SIGMA: f64 = 1.4826;

/// Bound `x` to `[lo, hi]`. A missing (or NaN) value maps to the midpoint.
pub fn clamp(x: Option<f64>, lo: f64, hi: f64) -> f64 {
    match x {
        Some(v) if !v.is_nan() => v.max(lo).min(hi),
        _ => (lo + hi) / 2.0,
    }
}

pub fn clamp01(x: f64) -> f64 {
    clamp(Some(x), 0.0, 1.0)
}

/// Affine map of `x` from `[lo, hi]` onto `[0, 1]`; a zero-width range is 0.5.
pub fn normalize(x: f64, lo: f64, hi: f64, clamp_output: bool) -> f64 {
    if hi == lo {
        return 0.5;
    }
    let norm = (x - lo) / (hi - lo);
    if clamp_output { clamp01(norm) } else { norm }
}

/// Map a unit score in `[0, 1]` onto `[-1, 1]`.
pub fn to_signed(unit: f64) -> f64 {
    unit * 2.0 - 1.0
}

pub fn z_score(x: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 || !std.is_finite() {
        return 0.0;
    }
    (x - mean) / std
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Sample standard deviation (divides by n - 1); needs two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear-interpolated percentile (`q` in 0..=100) over the finite values.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let sorted = sorted_finite(values);
    percentile_sorted(&sorted, q)
}

fn percentile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Median-absolute-deviation scale, `1.4826 * median(|v - median(v)|)`.
///
/// Non-finite values are ignored. Empty or all-equal input yields
/// [`SCALE_EPSILON`] so callers can divide by the result unconditionally.
pub fn robust_scale(values: &[f64]) -> f64 {
    let Some(med) = median(values) else {
        return SCALE_EPSILON;
    };
    let deviations: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - med).abs())
        .collect();
    let mad = median(&deviations).unwrap_or(0.0);
    (MAD_TO_SIGMA * mad).max(SCALE_EPSILON)
}

/// Bar-to-bar simple returns. Pairs whose earlier close is not positive are
/// skipped.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Return from `start` to `end`, 0 when `start` is not positive.
pub fn period_return(start: f64, end: f64) -> f64 {
    if start > 0.0 { (end - start) / start } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn clamp_missing_is_midpoint() {
        assert_eq!(clamp(None, 0.0, 1.0), 0.5);
        assert_eq!(clamp(None, -1.0, 1.0), 0.0);
        assert_eq!(clamp(Some(f64::NAN), 2.0, 4.0), 3.0);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(Some(5.0), 0.0, 1.0), 1.0);
        assert_eq!(clamp(Some(-5.0), 0.0, 1.0), 0.0);
        assert_eq!(clamp(Some(0.25), 0.0, 1.0), 0.25);
    }

    #[test]
    fn normalize_zero_width_range() {
        assert_eq!(normalize(42.0, 3.0, 3.0, true), 0.5);
        assert_eq!(normalize(-1e9, 0.0, 0.0, false), 0.5);
    }

    #[test]
    fn normalize_maps_and_clamps() {
        assert_abs_diff_eq!(normalize(0.0, -0.5, 0.5, true), 0.5);
        assert_abs_diff_eq!(normalize(1.0, -0.5, 0.5, true), 1.0);
        assert_abs_diff_eq!(normalize(1.0, -0.5, 0.5, false), 1.5);
    }

    #[test]
    fn z_score_flat_series_is_zero() {
        assert_eq!(z_score(10.0, 3.0, 0.0), 0.0);
        assert_abs_diff_eq!(z_score(5.0, 3.0, 2.0), 1.0);
    }

    #[test]
    fn std_variants() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(population_std(&values).unwrap(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            sample_std(&values).unwrap(),
            (32.0_f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );
        assert!(population_std(&[]).is_none());
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_abs_diff_eq!(percentile(&values, 10.0).unwrap(), 1.4, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&values, 90.0).unwrap(), 4.6, epsilon = 1e-12);
        assert_abs_diff_eq!(median(&values).unwrap(), 3.0);
        assert_abs_diff_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn percentile_ignores_nan() {
        assert_abs_diff_eq!(median(&[f64::NAN, 1.0, 3.0]).unwrap(), 2.0);
        assert!(median(&[f64::NAN]).is_none());
    }

    #[test]
    fn robust_scale_known_value() {
        // median 3, deviations [2,1,0,1,2] -> MAD 1
        let scale = robust_scale(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_abs_diff_eq!(scale, 1.4826, epsilon = 1e-12);
    }

    #[test]
    fn robust_scale_degenerate_is_epsilon() {
        assert_eq!(robust_scale(&[]), SCALE_EPSILON);
        assert_eq!(robust_scale(&[7.0, 7.0, 7.0]), SCALE_EPSILON);
    }

    #[test]
    fn robust_scale_resists_outlier() {
        let calm = robust_scale(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let spiked = robust_scale(&[1.0, 2.0, 3.0, 4.0, 500.0]);
        assert_abs_diff_eq!(calm, spiked, epsilon = 1e-12);
    }

    #[test]
    fn simple_returns_skip_non_positive_base() {
        let r = simple_returns(&[100.0, 110.0, 0.0, 5.0]);
        assert_eq!(r.len(), 2);
        assert_abs_diff_eq!(r[0], 0.1);
        assert_abs_diff_eq!(r[1], -1.0);
    }

    #[test]
    fn period_return_zero_start() {
        assert_eq!(period_return(0.0, 10.0), 0.0);
        assert_abs_diff_eq!(period_return(100.0, 125.0), 0.25);
    }
}
