//! Portfolio-level summary folded from per-symbol telemetry.

use serde::Serialize;

use super::stats::normalize;
use super::telemetry::{round4, Telemetry};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBreakdown {
    #[serde(serialize_with = "round4::value")]
    pub avg_momentum: f64,
    #[serde(serialize_with = "round4::value")]
    pub avg_volatility: f64,
    #[serde(serialize_with = "round4::value")]
    pub avg_stress: f64,
    pub ticker_count: usize,
}

/// Aggregate over a timeframe's non-benchmark symbols. `drawdown` and
/// `day_change` are coarse approximations from stress and momentum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub as_of: i64,
    #[serde(serialize_with = "round4::value")]
    pub health_score: f64,
    #[serde(serialize_with = "round4::value")]
    pub volatility: f64,
    #[serde(serialize_with = "round4::value")]
    pub drawdown: f64,
    #[serde(serialize_with = "round4::value")]
    pub sentiment: f64,
    #[serde(serialize_with = "round4::value")]
    pub day_change: f64,
    pub summary: PortfolioBreakdown,
}

/// Returns `None` for an empty set. Callers exclude benchmarks beforehand.
pub fn summarize(results: &[Telemetry]) -> Option<PortfolioSummary> {
    let first = results.first()?;
    let count = results.len() as f64;

    let mut health = 0.0;
    let mut momentum = 0.0;
    let mut volatility = 0.0;
    let mut stress = 0.0;
    for t in results {
        health += (1.0 - t.risk.stress).max(0.0) * 0.7 + t.momentum.max(0.0) * 0.3;
        momentum += t.momentum;
        volatility += t.volatility;
        stress += t.risk.stress;
    }

    let avg_momentum = momentum / count;
    let avg_volatility = volatility / count;
    let avg_stress = stress / count;

    Some(PortfolioSummary {
        kind: "portfolio",
        as_of: first.as_of,
        health_score: health / count,
        volatility: avg_volatility,
        drawdown: avg_stress * -0.3,
        sentiment: normalize(avg_momentum, -0.5, 0.5, true),
        day_change: avg_momentum * 0.1,
        summary: PortfolioBreakdown {
            avg_momentum,
            avg_volatility,
            avg_stress,
            ticker_count: results.len(),
        },
    })
}
