//! JSON chart data adapter.
//!
//! Reads `<symbol>.json` files shaped `{ "<raw timeframe>": [ {t, c, ...}, ... ] }`.
//! Raw timeframe keys are mapped to output labels; keys not in the map are
//! ignored. Bar keys go through the same alias table as CSV headers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::column_alias::{ColumnMap, Field};
use super::csv_adapter::{parse_marker, parse_number, parse_time};
use super::ticker::infer_ticker;
use crate::domain::bar::{Bar, BarSequence};
use crate::domain::error::TelemetryError;
use crate::ports::bar_source::{BarSource, SymbolBars};

const IGNORED_FILES: [&str; 2] = ["index.json", "stats.json"];

pub struct JsonChartSource {
    timeframes: Vec<(String, String)>,
    files: BTreeMap<String, PathBuf>,
}

impl JsonChartSource {
    pub fn open(dir: &Path, timeframes: &[(String, String)]) -> Result<Self, TelemetryError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let ignored = path
                .file_name()
                .is_some_and(|n| IGNORED_FILES.iter().any(|i| n == *i));
            if is_json && !ignored {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
        for path in paths {
            match infer_ticker(&path) {
                Ok(symbol) => {
                    if let Some(existing) = files.get(&symbol) {
                        log::warn!(
                            "{} duplicates {} for {symbol}, ignoring it",
                            path.display(),
                            existing.display()
                        );
                        continue;
                    }
                    files.insert(symbol, path);
                }
                Err(e) => log::warn!("{e}"),
            }
        }

        Ok(Self {
            timeframes: timeframes.to_vec(),
            files,
        })
    }
}

impl BarSource for JsonChartSource {
    fn list_symbols(&self) -> Result<Vec<String>, TelemetryError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn load(&self, symbol: &str) -> Result<SymbolBars, TelemetryError> {
        let path = self
            .files
            .get(symbol)
            .ok_or_else(|| TelemetryError::malformed(symbol, "no chart file for this symbol"))?;
        let content = fs::read_to_string(path)?;
        parse_chart(&content, &path.display().to_string(), &self.timeframes)
    }
}

pub fn parse_chart(
    content: &str,
    source_name: &str,
    timeframes: &[(String, String)],
) -> Result<SymbolBars, TelemetryError> {
    let root: Value = serde_json::from_str(content)
        .map_err(|e| TelemetryError::malformed(source_name, format!("invalid JSON: {e}")))?;
    let Value::Object(root) = root else {
        return Err(TelemetryError::malformed(
            source_name,
            "expected an object keyed by timeframe",
        ));
    };

    let mut out = SymbolBars::new();
    for (raw_key, label) in timeframes {
        let Some(value) = root.get(raw_key) else {
            continue;
        };
        let Value::Array(items) = value else {
            return Err(TelemetryError::malformed(
                source_name,
                format!("'{raw_key}' is not an array of bars"),
            ));
        };
        let bars: Vec<Bar> = items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(bar_from_object)
            .collect();
        if bars.len() < items.len() {
            log::debug!(
                "{source_name} {raw_key}: dropped {} bars without time or close",
                items.len() - bars.len()
            );
        }
        out.insert(label.clone(), BarSequence::new(bars));
    }
    Ok(out)
}

fn bar_from_object(object: &Map<String, Value>) -> Option<Bar> {
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    let columns = ColumnMap::resolve(&keys);
    let value = |field: Field| columns.get(field).and_then(|i| object.get(keys[i]));
    let number = |field: Field| value(field).and_then(as_number);
    let marker = |field: Field| value(field).map(as_marker);

    let timestamp = value(Field::Time).and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_time(s),
        _ => None,
    })?;
    let close = number(Field::Close)?;

    Some(Bar {
        open: number(Field::Open),
        high: number(Field::High),
        low: number(Field::Low),
        volume: number(Field::Volume),
        volume_ma: number(Field::VolumeMa),
        macd: number(Field::Macd),
        macd_signal: number(Field::MacdSignal),
        macd_histogram: number(Field::MacdHistogram),
        ma_short: number(Field::MaShort),
        ma_mid: number(Field::MaMid),
        ma_long: number(Field::MaLong),
        kernel_estimate: number(Field::Kernel),
        band_outer_top: number(Field::BandOuterTop),
        band_outer_bottom: number(Field::BandOuterBottom),
        buy_signal: marker(Field::Buy),
        sell_signal: marker(Field::Sell),
        stop_buy_signal: marker(Field::StopBuy),
        stop_sell_signal: marker(Field::StopSell),
        crossover: marker(Field::Crossover),
        ..Bar::new(timestamp, close)
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn as_marker(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x.is_finite() && x != 0.0),
        Value::String(s) => parse_marker(s),
        _ => false,
    }
}
