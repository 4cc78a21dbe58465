//! CSV export data adapter.
//!
//! One directory of vendor chart exports, all of a single timeframe. Column
//! names are resolved through [`column_alias`](super::column_alias); cells
//! that do not parse are treated as missing values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::column_alias::{ColumnMap, Field};
use super::ticker::infer_ticker;
use crate::domain::bar::{Bar, BarSequence};
use crate::domain::error::TelemetryError;
use crate::ports::bar_source::{BarSource, SymbolBars};

pub struct CsvBarSource {
    timeframe: String,
    files: BTreeMap<String, PathBuf>,
}

impl CsvBarSource {
    /// Index every `*.csv` file in `dir` by inferred ticker. Files whose name
    /// yields no ticker are logged and left out.
    pub fn open(dir: &Path, timeframe: &str) -> Result<Self, TelemetryError> {
        let entries = fs::read_dir(dir)?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
        for path in paths {
            match infer_ticker(&path) {
                Ok(ticker) => {
                    if let Some(existing) = files.get(&ticker) {
                        log::warn!(
                            "{} duplicates {} for {ticker}, ignoring it",
                            path.display(),
                            existing.display()
                        );
                        continue;
                    }
                    files.insert(ticker, path);
                }
                Err(e) => log::warn!("{e}"),
            }
        }

        Ok(Self {
            timeframe: timeframe.to_string(),
            files,
        })
    }
}

impl BarSource for CsvBarSource {
    fn list_symbols(&self) -> Result<Vec<String>, TelemetryError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn load(&self, symbol: &str) -> Result<SymbolBars, TelemetryError> {
        let path = self
            .files
            .get(symbol)
            .ok_or_else(|| TelemetryError::malformed(symbol, "no CSV export for this symbol"))?;
        let content = fs::read_to_string(path)?;
        let bars = parse_csv(&content, &path.display().to_string())?;
        Ok(BTreeMap::from([(self.timeframe.clone(), bars)]))
    }
}

/// Parse one export. Rows without a usable time or close are dropped.
pub fn parse_csv(content: &str, source_name: &str) -> Result<BarSequence, TelemetryError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| TelemetryError::malformed(source_name, format!("CSV header error: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = ColumnMap::resolve(&headers);
    for required in [Field::Time, Field::Close] {
        if !columns.has(required) {
            return Err(TelemetryError::malformed(
                source_name,
                format!("missing required '{}' column", required.aliases()[0]),
            ));
        }
    }

    let mut bars = Vec::new();
    let mut dropped = 0usize;
    for result in rdr.records() {
        let record = result
            .map_err(|e| TelemetryError::malformed(source_name, format!("CSV parse error: {e}")))?;
        let cell = |field: Field| columns.get(field).and_then(|i| record.get(i));
        let number = |field: Field| cell(field).and_then(parse_number);
        let marker =
            |field: Field| columns.has(field).then(|| cell(field).is_some_and(parse_marker));

        let (Some(timestamp), Some(close)) = (
            cell(Field::Time).and_then(parse_time),
            number(Field::Close),
        ) else {
            dropped += 1;
            continue;
        };

        bars.push(Bar {
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
        });
    }

    if dropped > 0 {
        log::debug!("{source_name}: dropped {dropped} rows without time or close");
    }
    Ok(BarSequence::new(bars))
}

/// Finite number, or `None` for blanks, `NaN` and text.
pub(crate) fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

/// A marker fires on any non-zero number or `true`.
pub(crate) fn parse_marker(cell: &str) -> bool {
    let cell = cell.trim();
    cell.eq_ignore_ascii_case("true") || parse_number(cell).is_some_and(|x| x != 0.0)
}

/// Unix seconds, RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_time(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(seconds) = cell.parse::<i64>() {
        return Some(seconds);
    }
    if let Some(seconds) = parse_number(cell) {
        return Some(seconds as i64);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, format) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = "time,open,high,low,close,Kernel Regression Estimate,\
        Buy,Sell,StopBuy,StopSell,Volume,Volume MA,MACD,Signal Line,Histogram\n\
        1700000000,10,11,9,10.5,10.4,0,0,1,0,1000,900,0.1,0.05,0.05\n\
        1700002700,10.5,12,10,11.5,10.9,1,0,0,0,1500,950,0.2,0.1,0.1\n\
        1700005400,11.5,12,11,NaN,11.1,0,0,0,0,800,960,0.2,0.1,0.1\n";

    fn setup_test_data() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BATS_RKLB, 45_ccede.csv"), EXPORT).unwrap();
        fs::write(dir.path().join("LUNR.csv"), "time,close\n1700000000,5.0\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        dir
    }

    #[test]
    fn lists_tickers_from_file_names() {
        let dir = setup_test_data();
        let source = CsvBarSource::open(dir.path(), "45m").unwrap();
        assert_eq!(source.list_symbols().unwrap(), vec!["LUNR", "RKLB"]);
    }

    #[test]
    fn loads_vendor_export() {
        let dir = setup_test_data();
        let source = CsvBarSource::open(dir.path(), "45m").unwrap();
        let bars = source.load("RKLB").unwrap();
        let seq = &bars["45m"];

        assert_eq!(seq.len(), 2);
        let first = &seq.as_slice()[0];
        assert_eq!(first.timestamp, 1_700_000_000);
        assert_eq!(first.close, 10.5);
        assert_eq!(first.kernel_estimate, Some(10.4));
        assert_eq!(first.stop_buy_signal, Some(true));
        assert_eq!(first.buy_signal, Some(false));
        assert_eq!(first.volume_ma, Some(900.0));
        assert_eq!(first.macd_histogram, Some(0.05));
        assert_eq!(first.crossover, None);
        assert_eq!(seq.as_slice()[1].buy_signal, Some(true));
    }

    #[test]
    fn missing_close_column_is_malformed() {
        let err = parse_csv("time,open\n1,2\n", "bad.csv").unwrap_err();
        match err {
            TelemetryError::MalformedSource { source_name, reason } => {
                assert_eq!(source_name, "bad.csv");
                assert!(reason.contains("close"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_symbol_is_malformed() {
        let dir = setup_test_data();
        let source = CsvBarSource::open(dir.path(), "45m").unwrap();
        assert!(matches!(
            source.load("ASTS"),
            Err(TelemetryError::MalformedSource { .. })
        ));
    }

    #[test]
    fn time_formats() {
        assert_eq!(parse_time("1700000000"), Some(1_700_000_000));
        assert_eq!(parse_time("1700000000.0"), Some(1_700_000_000));
        assert_eq!(parse_time("1970-01-02"), Some(86_400));
        assert_eq!(parse_time("1970-01-01T00:01:00Z"), Some(60));
        assert_eq!(parse_time("1970-01-01 00:02:00"), Some(120));
        assert_eq!(parse_time("yesterday"), None);
    }

    #[test]
    fn markers_and_numbers() {
        assert!(parse_marker("1"));
        assert!(parse_marker("1.0"));
        assert!(parse_marker("TRUE"));
        assert!(!parse_marker("0"));
        assert!(!parse_marker(""));
        assert!(!parse_marker("NaN"));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number("n/a"), None);
    }
}
