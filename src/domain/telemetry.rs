//! Per-(symbol, timeframe) telemetry record: runs the metric engine, the
//! classifier and the visual mapper over one bar sequence.

use serde::Serialize;

use super::bar::{Bar, BarSequence};
use super::engine_config::EngineConfig;
use super::metric::{
    activity::activity, drawdown, momentum::momentum, relative::relative_performance,
    trend::trend, volatility::volatility,
};
use super::signal::{classify, SignalState};
use super::visual::{map_visual, VisualInputs, VisualParams};

/// Serializers that round floats to 4 decimals on output only; the in-memory
/// values keep full precision.
pub(crate) mod round4 {
    use serde::Serializer;

    pub fn round(x: f64) -> f64 {
        (x * 10_000.0).round() / 10_000.0
    }

    pub fn value<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(round(*x))
    }

    pub fn option<S: Serializer>(x: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match x {
            Some(v) => s.serialize_some(&round(*v)),
            None => s.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Risk {
    #[serde(serialize_with = "round4::value")]
    pub drawdown: f64,
    #[serde(serialize_with = "round4::value")]
    pub stress: f64,
}

/// Raw indicator values of the last bar, passed through for reference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IndicatorSnapshot {
    #[serde(serialize_with = "round4::option")]
    pub macd: Option<f64>,
    #[serde(serialize_with = "round4::option")]
    pub signal: Option<f64>,
    #[serde(serialize_with = "round4::option")]
    pub hist: Option<f64>,
    pub g100: Option<f64>,
    pub g150: Option<f64>,
    pub g200: Option<f64>,
}

impl IndicatorSnapshot {
    fn of(bar: &Bar) -> Self {
        Self {
            macd: bar.macd,
            signal: bar.macd_signal,
            hist: bar.macd_histogram,
            g100: bar.ma_short,
            g150: bar.ma_mid,
            g200: bar.ma_long,
        }
    }
}

/// Scores for one symbol at its last bar. Built once by [`evaluate`] and not
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub symbol: String,
    #[serde(rename = "tf")]
    pub timeframe: String,
    pub as_of: i64,
    #[serde(serialize_with = "round4::value")]
    pub price: f64,
    #[serde(serialize_with = "round4::value")]
    pub chg_pct: f64,
    #[serde(serialize_with = "round4::value")]
    pub trend: f64,
    #[serde(serialize_with = "round4::value")]
    pub momentum: f64,
    #[serde(serialize_with = "round4::value")]
    pub volatility: f64,
    #[serde(serialize_with = "round4::value")]
    pub activity: f64,
    pub signal_state: SignalState,
    #[serde(serialize_with = "round4::value")]
    pub relative_performance: f64,
    pub risk: Risk,
    pub indicators: IndicatorSnapshot,
    pub visual: VisualParams,
}

/// Evaluate one bar sequence. An empty sequence yields the all-defaults record
/// (`as_of` and `price` zero, every metric at its named default).
pub fn evaluate(
    symbol: &str,
    timeframe: &str,
    bars: &BarSequence,
    benchmark: Option<&BarSequence>,
    config: &EngineConfig,
) -> Telemetry {
    let params = &config.metrics;
    let slice = bars.as_slice();
    let last = bars.last();

    let trend = trend(slice, params);
    let momentum = momentum(slice, params);
    let volatility = volatility(slice, params);
    let activity = activity(slice, params);
    let drawdown = drawdown::drawdown(slice, params);
    let stress = drawdown::stress(drawdown, volatility);
    let relative_performance = benchmark
        .map(|b| relative_performance(slice, b.as_slice(), params))
        .unwrap_or(0.0);
    let signal_state = classify(config.classifier, last, trend, momentum);

    let visual = map_visual(
        &VisualInputs {
            trend,
            momentum,
            volatility,
            activity,
            drawdown,
        },
        config.framing,
        params.volatility_mode,
    );

    let price = last.map_or(0.0, |b| b.close);
    Telemetry {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        as_of: last.map_or(0, |b| b.timestamp),
        price,
        chg_pct: change_pct(slice),
        trend,
        momentum,
        volatility,
        activity,
        signal_state,
        relative_performance,
        risk: Risk { drawdown, stress },
        indicators: last.map(IndicatorSnapshot::of).unwrap_or_default(),
        visual,
    }
}

/// Percent change of the last close from the previous one; zero without a
/// positive previous close.
fn change_pct(bars: &[Bar]) -> f64 {
    match bars {
        [.., prev, last] if prev.close > 0.0 => (last.close - prev.close) / prev.close * 100.0,
        _ => 0.0,
    }
}
