//! Engine and fleet configuration, built and validated from a [`ConfigPort`].
//!
//! Every variant choice and tunable the pipeline reads is carried here and
//! passed in explicitly; nothing downstream consults process-wide state.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::error::TelemetryError;
use crate::domain::fleet::BenchmarkPlan;
use crate::domain::metric::{ActivityMode, MetricParams, VolatilityMode};
use crate::domain::signal::ClassifierPolicy;
use crate::domain::visual::VisualFraming;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INPUT_DIR: &str = "data/raw/charts";
pub const DEFAULT_OUTPUT_DIR: &str = "data/telemetry";
pub const DEFAULT_TIMEFRAMES: &str = "daily:1D,intraday:45m,intraday15:15m";
pub const DEFAULT_CSV_TIMEFRAME: &str = "45m";
pub const DEFAULT_BENCHMARKS: &str = "XAR,SPY,QQQ";
pub const DEFAULT_BENCHMARK: &str = "XAR";
pub const DEFAULT_OVERRIDES: &str = "GE:SPY,GME:SPY,RTX:SPY,LHX:SPY,COHR:SPY,EVEX:SPY";

/// Variant selections and metric parameters for a single evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub metrics: MetricParams,
    pub classifier: ClassifierPolicy,
    pub framing: VisualFraming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// `<symbol>.json` files keyed by raw timeframe name.
    #[default]
    Json,
    /// Vendor CSV exports, one timeframe per directory.
    Csv,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(InputFormat::Json),
            "csv" => Ok(InputFormat::Csv),
            other => Err(format!("unknown input format '{other}' (expected json or csv)")),
        }
    }
}

/// Everything a fleet run needs beyond the engine itself.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetConfig {
    pub engine: EngineConfig,
    pub input_format: InputFormat,
    pub input_dir: PathBuf,
    /// Raw source key to output timeframe label, in output order.
    pub timeframes: Vec<(String, String)>,
    pub csv_timeframe: String,
    pub output_dir: PathBuf,
    pub canonical_dir: Option<PathBuf>,
    pub benchmarks: BenchmarkPlan,
    /// Worker threads for the symbol pool; 0 leaves the choice to rayon.
    /// `[batch] parallel = false` forces 1.
    pub threads: usize,
}

impl FleetConfig {
    pub fn timeframe_labels(&self) -> Vec<String> {
        self.timeframes.iter().map(|(_, label)| label.clone()).collect()
    }
}

impl EngineConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TelemetryError> {
        Ok(Self {
            metrics: metric_params(config)?,
            classifier: parse_variant(config, "classifier")?,
            framing: parse_variant(config, "visual")?,
        })
    }
}

/// Windows, reference ranges and thresholds from `[engine]`; each key falls
/// back to its [`MetricParams::default`] value.
fn metric_params(config: &dyn ConfigPort) -> Result<MetricParams, TelemetryError> {
    let d = MetricParams::default();

    let lookback = window(config, "lookback", d.lookback, 2)?;
    let drawdown_lookback = window(config, "drawdown_lookback", d.drawdown_lookback, 1)?;
    let follow_horizon = window(config, "follow_horizon", d.follow_horizon, 1)?;
    let volume_ma_window = window(config, "volume_ma_window", d.volume_ma_window, 1)?;
    let volume_ma_min_periods =
        window(config, "volume_ma_min_periods", d.volume_ma_min_periods, 1)?;
    if volume_ma_min_periods > volume_ma_window {
        return Err(TelemetryError::invalid(
            "engine",
            "volume_ma_min_periods",
            "volume_ma_min_periods must not exceed volume_ma_window",
        ));
    }

    let histogram_weight = config.get_double("engine", "histogram_weight", d.histogram_weight);
    if !(0.0..=1.0).contains(&histogram_weight) {
        return Err(TelemetryError::invalid(
            "engine",
            "histogram_weight",
            "histogram_weight must be between 0 and 1",
        ));
    }

    let band_low_percentile =
        config.get_double("engine", "band_low_percentile", d.band_low_percentile);
    let band_high_percentile =
        config.get_double("engine", "band_high_percentile", d.band_high_percentile);
    if !(0.0..=100.0).contains(&band_low_percentile)
        || !(0.0..=100.0).contains(&band_high_percentile)
        || band_low_percentile >= band_high_percentile
    {
        return Err(TelemetryError::invalid(
            "engine",
            "band_high_percentile",
            "band percentiles must satisfy 0 <= low < high <= 100",
        ));
    }

    Ok(MetricParams {
        lookback,
        drawdown_lookback,
        volatility_mode: parse_variant::<VolatilityMode>(config, "volatility")?,
        activity_mode: parse_variant::<ActivityMode>(config, "activity")?,
        trend_return_range: positive(config, "trend_return_range", d.trend_return_range)?,
        histogram_range: positive(config, "histogram_range", d.histogram_range)?,
        macd_range: positive(config, "macd_range", d.macd_range)?,
        histogram_weight,
        activity_z_range: positive(config, "activity_z_range", d.activity_z_range)?,
        relative_range: positive(config, "relative_range", d.relative_range)?,
        kernel_band_factor: positive(config, "kernel_band_factor", d.kernel_band_factor)?,
        band_low_percentile,
        band_high_percentile,
        follow_horizon,
        follow_target: positive(config, "follow_target", d.follow_target)?,
        stop_reference_frequency: positive(
            config,
            "stop_reference_frequency",
            d.stop_reference_frequency,
        )?,
        volume_ma_window,
        volume_ma_min_periods,
        persistence_reference_streak: positive(
            config,
            "persistence_reference_streak",
            d.persistence_reference_streak,
        )?,
        volatility_factor_reference: positive(
            config,
            "volatility_factor_reference",
            d.volatility_factor_reference,
        )?,
    })
}

fn window(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
    min: i64,
) -> Result<usize, TelemetryError> {
    let value = config.get_int("engine", key, default as i64);
    if value < min {
        return Err(TelemetryError::invalid(
            "engine",
            key,
            format!("{key} must be at least {min}"),
        ));
    }
    Ok(value as usize)
}

fn positive(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, TelemetryError> {
    let value = config.get_double("engine", key, default);
    if !value.is_finite() || value <= 0.0 {
        return Err(TelemetryError::invalid(
            "engine",
            key,
            format!("{key} must be positive"),
        ));
    }
    Ok(value)
}

impl FleetConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TelemetryError> {
        let engine = EngineConfig::from_config(config)?;

        let input_format = match config.get_string("input", "format") {
            Some(s) => s
                .parse()
                .map_err(|reason: String| TelemetryError::invalid("input", "format", reason))?,
            None => InputFormat::default(),
        };

        let timeframes = parse_pairs(
            &string_or(config, "input", "timeframes", DEFAULT_TIMEFRAMES),
            "input",
            "timeframes",
        )?;
        if timeframes.is_empty() {
            return Err(TelemetryError::invalid(
                "input",
                "timeframes",
                "at least one timeframe is required",
            ));
        }

        let csv_timeframe = string_or(config, "input", "csv_timeframe", DEFAULT_CSV_TIMEFRAME);
        if csv_timeframe.is_empty() {
            return Err(TelemetryError::invalid(
                "input",
                "csv_timeframe",
                "csv_timeframe must not be empty",
            ));
        }

        // a CSV directory carries exactly one timeframe
        let timeframes = match input_format {
            InputFormat::Csv => vec![(csv_timeframe.clone(), csv_timeframe.clone())],
            InputFormat::Json => timeframes,
        };

        let threads = config.get_int("batch", "threads", 0);
        if threads < 0 {
            return Err(TelemetryError::invalid(
                "batch",
                "threads",
                "threads must be non-negative",
            ));
        }
        // a sequential run is a single-worker pool
        let threads = if config.get_bool("batch", "parallel", true) {
            threads
        } else {
            1
        };

        Ok(Self {
            engine,
            input_format,
            input_dir: PathBuf::from(string_or(config, "input", "dir", DEFAULT_INPUT_DIR)),
            timeframes,
            csv_timeframe,
            output_dir: PathBuf::from(string_or(config, "output", "dir", DEFAULT_OUTPUT_DIR)),
            canonical_dir: optional_path(config, "output", "canonical_dir"),
            benchmarks: benchmark_plan(config)?,
            threads: threads as usize,
        })
    }
}

fn benchmark_plan(config: &dyn ConfigPort) -> Result<BenchmarkPlan, TelemetryError> {
    let symbols: Vec<String> = string_or(config, "benchmarks", "symbols", DEFAULT_BENCHMARKS)
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    let default = string_or(config, "benchmarks", "default", DEFAULT_BENCHMARK).to_uppercase();
    if !default.is_empty() && !symbols.is_empty() && !symbols.contains(&default) {
        return Err(TelemetryError::invalid(
            "benchmarks",
            "default",
            format!("default benchmark {default} is not listed in symbols"),
        ));
    }

    let overrides: BTreeMap<String, String> = parse_pairs(
        &string_or(config, "benchmarks", "overrides", DEFAULT_OVERRIDES),
        "benchmarks",
        "overrides",
    )?
    .into_iter()
    .map(|(symbol, bench)| (symbol.to_uppercase(), bench.to_uppercase()))
    .collect();

    let unknown = overrides
        .iter()
        .find(|(_, b)| !symbols.is_empty() && !symbols.contains(b));
    if let Some((symbol, bench)) = unknown {
        return Err(TelemetryError::invalid(
            "benchmarks",
            "overrides",
            format!("{symbol} maps to {bench}, which is not listed in symbols"),
        ));
    }

    Ok(BenchmarkPlan {
        symbols,
        default: (!default.is_empty()).then_some(default),
        overrides,
    })
}

fn parse_variant<T>(config: &dyn ConfigPort, key: &str) -> Result<T, TelemetryError>
where
    T: FromStr<Err = String> + Default,
{
    match config.get_string("engine", key) {
        Some(s) if !s.trim().is_empty() => s
            .parse()
            .map_err(|reason: String| TelemetryError::invalid("engine", key, reason)),
        _ => Ok(T::default()),
    }
}

/// `a:b,c:d` into ordered pairs. Blank entries are ignored.
fn parse_pairs(
    value: &str,
    section: &str,
    key: &str,
) -> Result<Vec<(String, String)>, TelemetryError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                Ok((a.trim().to_string(), b.trim().to_string()))
            }
            _ => Err(TelemetryError::invalid(
                section,
                key,
                format!("expected name:value, got '{entry}'"),
            )),
        })
        .collect()
}

fn string_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

fn optional_path(config: &dyn ConfigPort, section: &str, key: &str) -> Option<PathBuf> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}
