//! Options position book and its per-ticker exposure summaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days assumed for a position whose expiry is missing or not `YYYY-MM-DD`.
pub const UNKNOWN_EXPIRY_DAYS: i64 = 365;
pub const DEFAULT_DELTA: f64 = 0.5;

const LEVERAGED_ABOVE: f64 = 1.3;
const HIGH_PRESSURE_CATALYSTS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptionsBook {
    pub positions: Vec<OptionPosition>,
    pub catalysts: Vec<Catalyst>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptionPosition {
    pub ticker: Option<String>,
    pub structure: Option<String>,
    pub delta: Option<f64>,
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Catalyst {
    pub ticker: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPosture {
    Leveraged,
    Moderate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalystPressure {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSummary {
    pub ticker: String,
    pub structure: String,
    pub delta_exposure: f64,
    pub time_horizon_days: i64,
    /// Rounded to two decimals.
    pub leverage_factor: f64,
    pub upcoming_catalysts: usize,
    pub risk_posture: RiskPosture,
    pub catalyst_pressure: CatalystPressure,
}

/// Leverage implied by the structure name: LEAPs scale with delta, spreads
/// are capped, anything else is unlevered. Matching is a case-insensitive
/// substring test, LEAP first.
pub fn leverage_factor(structure: &str, delta: f64) -> f64 {
    let structure = structure.to_uppercase();
    if structure.contains("LEAP") {
        1.5 + 2.0 * delta
    } else if structure.contains("SPREAD") {
        1.2
    } else {
        1.0
    }
}

/// Whole calendar days from `today` to the expiry, floored at zero.
pub fn days_to_expiry(expiry: Option<&str>, today: NaiveDate) -> i64 {
    expiry
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        .map(|date| (date - today).num_days())
        .unwrap_or(UNKNOWN_EXPIRY_DAYS)
        .max(0)
}

/// One summary per ticker. Positions without a ticker are skipped; when a
/// ticker appears more than once the later position wins.
pub fn summarize_options(
    book: &OptionsBook,
    today: NaiveDate,
) -> BTreeMap<String, OptionsSummary> {
    let mut catalyst_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for ticker in book.catalysts.iter().filter_map(|c| c.ticker.as_deref()) {
        if !ticker.is_empty() {
            *catalyst_counts.entry(ticker).or_default() += 1;
        }
    }

    let mut out = BTreeMap::new();
    for position in &book.positions {
        let Some(ticker) = position.ticker.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        let structure = position.structure.clone().unwrap_or_default();
        let delta = position.delta.unwrap_or(DEFAULT_DELTA);
        let leverage = leverage_factor(&structure, delta);
        let catalysts = catalyst_counts.get(ticker).copied().unwrap_or(0);

        let summary = OptionsSummary {
            ticker: ticker.to_string(),
            structure,
            delta_exposure: delta,
            time_horizon_days: days_to_expiry(position.expiry.as_deref(), today),
            leverage_factor: (leverage * 100.0).round() / 100.0,
            upcoming_catalysts: catalysts,
            risk_posture: if leverage > LEVERAGED_ABOVE {
                RiskPosture::Leveraged
            } else {
                RiskPosture::Moderate
            },
            catalyst_pressure: if catalysts >= HIGH_PRESSURE_CATALYSTS {
                CatalystPressure::High
            } else {
                CatalystPressure::Low
            },
        };
        out.insert(ticker.to_string(), summary);
    }
    out
}
