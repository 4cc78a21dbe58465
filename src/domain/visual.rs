//! Visual mapper: metric scores to bounded render parameters.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::metric::VolatilityMode;
use super::stats::clamp01;
use super::telemetry::round4;

/// Which of the two opposite framings of volatility and drawdown is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualFraming {
    /// `thrust = 2|m|`, `cohesion = 1 - vol - |dd|` (higher is better).
    #[default]
    Cohesion,
    /// `thrust = max(0, m) * a`, `damage = max(0, -trend) * vol` (higher is worse).
    Damage,
}

impl FromStr for VisualFraming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cohesion" => Ok(VisualFraming::Cohesion),
            "damage" => Ok(VisualFraming::Damage),
            other => Err(format!(
                "unknown visual framing '{other}' (expected cohesion or damage)"
            )),
        }
    }
}

impl fmt::Display for VisualFraming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualFraming::Cohesion => write!(f, "cohesion"),
            VisualFraming::Damage => write!(f, "damage"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualInputs {
    pub trend: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub activity: f64,
    pub drawdown: f64,
}

/// Exactly one of `cohesion` and `damage` is set, per framing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualParams {
    #[serde(serialize_with = "round4::value")]
    pub glow: f64,
    #[serde(serialize_with = "round4::value")]
    pub jitter: f64,
    #[serde(serialize_with = "round4::value")]
    pub thrust: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "round4::option"
    )]
    pub cohesion: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "round4::option"
    )]
    pub damage: Option<f64>,
    #[serde(serialize_with = "round4::value")]
    pub ring: f64,
}

/// Jitter gain per volatility convention: raw sigma is small, ATR% is already
/// scaled into `[0, 1]`.
pub fn jitter_gain(mode: VolatilityMode) -> f64 {
    match mode {
        VolatilityMode::Raw => 1.5,
        VolatilityMode::AtrPercent => 0.3,
    }
}

pub fn map_visual(
    inputs: &VisualInputs,
    framing: VisualFraming,
    mode: VolatilityMode,
) -> VisualParams {
    let VisualInputs {
        trend,
        momentum,
        volatility,
        activity,
        drawdown,
    } = *inputs;

    let glow = clamp01(0.5 * momentum.abs() + 0.5 * activity);
    let jitter = clamp01(jitter_gain(mode) * volatility);
    let ring = clamp01(0.8 * volatility);

    let (thrust, cohesion, damage) = match framing {
        VisualFraming::Cohesion => (
            clamp01(2.0 * momentum.abs()),
            Some(clamp01(1.0 - volatility - drawdown.abs())),
            None,
        ),
        VisualFraming::Damage => (
            clamp01(momentum.max(0.0) * activity),
            None,
            Some(clamp01((-trend).max(0.0) * volatility)),
        ),
    };

    VisualParams {
        glow,
        jitter,
        thrust,
        cohesion,
        damage,
        ring,
    }
}
