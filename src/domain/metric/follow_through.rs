//! Signal follow-through: the hit rate of buy/sell markers, judged by whether
//! price moves a fixed favorable amount within a fixed forward horizon.

use super::{MetricParams, MIN_SIGNAL_BARS};
use crate::domain::bar::Bar;

pub const FOLLOW_THROUGH_DEFAULT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Buy,
    Sell,
}

/// For each fired marker with at least one forward bar: a buy hits when the
/// highest close in the next `follow_horizon` bars is `follow_target` above
/// entry; a sell hits when entry is `follow_target` above the lowest forward
/// close. Returns hits / evaluated signals.
pub fn signal_follow_through(bars: &[Bar], params: &MetricParams) -> f64 {
    if bars.len() < MIN_SIGNAL_BARS || params.follow_horizon == 0 {
        return FOLLOW_THROUGH_DEFAULT;
    }

    let mut evaluated = 0usize;
    let mut hits = 0usize;

    for (i, bar) in bars.iter().enumerate() {
        let sides = [
            bar.buy_fired().then_some(Side::Buy),
            bar.sell_fired().then_some(Side::Sell),
        ];
        for side in sides.into_iter().flatten() {
            if let Some(hit) = evaluate(bars, i, side, params) {
                evaluated += 1;
                if hit {
                    hits += 1;
                }
            }
        }
    }

    if evaluated == 0 {
        return FOLLOW_THROUGH_DEFAULT;
    }
    hits as f64 / evaluated as f64
}

fn evaluate(bars: &[Bar], i: usize, side: Side, params: &MetricParams) -> Option<bool> {
    let entry = bars[i].close;
    if !entry.is_finite() || entry == 0.0 || i + 1 >= bars.len() {
        return None;
    }
    let end = bars.len().min(i + 1 + params.follow_horizon);
    let forward = bars[i + 1..end].iter().map(|b| b.close).filter(|c| c.is_finite());
    match side {
        Side::Buy => {
            let best = forward.fold(f64::NEG_INFINITY, f64::max);
            best.is_finite().then(|| best / entry - 1.0 >= params.follow_target)
        }
        Side::Sell => {
            let best = forward.fold(f64::INFINITY, f64::min);
            (best.is_finite() && best > 0.0).then(|| entry / best - 1.0 >= params.follow_target)
        }
    }
}
