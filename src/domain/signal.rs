//! Stateless bull/bear/neutral classification.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::bar::Bar;

const HISTOGRAM_THRESHOLD: f64 = 0.1;
const MACD_MARGIN: f64 = 0.05;
const TREND_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    Bull,
    Bear,
    Neutral,
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalState::Bull => write!(f, "bull"),
            SignalState::Bear => write!(f, "bear"),
            SignalState::Neutral => write!(f, "neutral"),
        }
    }
}

/// Decision policy; one policy applies to a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierPolicy {
    /// Crossover, then histogram magnitude, then MACD/signal spread.
    #[default]
    MacdCross,
    /// Trend and momentum thresholds, for sources without MACD columns.
    TrendMomentum,
}

impl FromStr for ClassifierPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macd" | "macd_cross" => Ok(ClassifierPolicy::MacdCross),
            "trend" | "trend_momentum" => Ok(ClassifierPolicy::TrendMomentum),
            other => Err(format!(
                "unknown classifier '{other}' (expected macd_cross or trend_momentum)"
            )),
        }
    }
}

impl fmt::Display for ClassifierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierPolicy::MacdCross => write!(f, "macd_cross"),
            ClassifierPolicy::TrendMomentum => write!(f, "trend_momentum"),
        }
    }
}

/// Classify from the last bar's MACD fields or from the trend/momentum scores,
/// depending on `policy`. First matching rule wins.
pub fn classify(
    policy: ClassifierPolicy,
    last: Option<&Bar>,
    trend: f64,
    momentum: f64,
) -> SignalState {
    match policy {
        ClassifierPolicy::MacdCross => last.map_or(SignalState::Neutral, classify_macd),
        ClassifierPolicy::TrendMomentum => classify_trend(trend, momentum),
    }
}

fn classify_macd(bar: &Bar) -> SignalState {
    let hist = bar.macd_histogram.filter(|h| h.is_finite());

    if bar.crossover == Some(true) {
        return match hist {
            Some(h) if h < 0.0 => SignalState::Bear,
            _ => SignalState::Bull,
        };
    }
    if let Some(h) = hist.filter(|h| h.abs() > HISTOGRAM_THRESHOLD) {
        return if h > 0.0 {
            SignalState::Bull
        } else {
            SignalState::Bear
        };
    }
    match (bar.macd, bar.macd_signal) {
        (Some(macd), Some(signal)) if macd > signal + MACD_MARGIN => SignalState::Bull,
        (Some(macd), Some(signal)) if macd < signal - MACD_MARGIN => SignalState::Bear,
        _ => SignalState::Neutral,
    }
}

fn classify_trend(trend: f64, momentum: f64) -> SignalState {
    if trend > TREND_THRESHOLD && momentum > 0.0 {
        SignalState::Bull
    } else if trend < -TREND_THRESHOLD && momentum < 0.0 {
        SignalState::Bear
    } else {
        SignalState::Neutral
    }
}
