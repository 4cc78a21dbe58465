//! JSON file sink.
//!
//! Layout under the output directory:
//! `<tf>/<SYMBOL>.telemetry.json`, `<tf>/portfolio.telemetry.json`,
//! `manifest.json` and `combined.telemetry.json`. Canonical bars go to
//! `<canonical>/<tf>/<SYMBOL>.json`, market summaries to
//! `<summaries>/<TICKER>.json` and options summaries to
//! `<options>/<TICKER>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::bar::BarSequence;
use crate::domain::error::TelemetryError;
use crate::domain::fleet::{CombinedTelemetry, Manifest};
use crate::domain::market_summary::MarketSummary;
use crate::domain::options::OptionsSummary;
use crate::domain::portfolio::PortfolioSummary;
use crate::domain::telemetry::Telemetry;
use crate::ports::telemetry_sink::TelemetrySink;

pub struct JsonFileSink {
    out_dir: PathBuf,
    canonical_dir: Option<PathBuf>,
    summaries_dir: Option<PathBuf>,
    options_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct CanonicalFile<'a> {
    symbol: &'a str,
    tf: &'a str,
    bars: &'a BarSequence,
}

impl JsonFileSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            canonical_dir: None,
            summaries_dir: None,
            options_dir: None,
        }
    }

    pub fn with_canonical_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.canonical_dir = dir;
        self
    }

    /// Defaults to the output directory itself.
    pub fn with_summaries_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.summaries_dir = dir;
        self
    }

    /// Defaults to the output directory itself.
    pub fn with_options_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.options_dir = dir;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), TelemetryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, body)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

impl TelemetrySink for JsonFileSink {
    fn write_telemetry(&self, telemetry: &Telemetry) -> Result<(), TelemetryError> {
        let path = self
            .out_dir
            .join(&telemetry.timeframe)
            .join(format!("{}.telemetry.json", telemetry.symbol));
        write_json(&path, telemetry, true)
    }

    fn write_canonical(
        &self,
        symbol: &str,
        timeframe: &str,
        bars: &BarSequence,
    ) -> Result<(), TelemetryError> {
        let Some(dir) = &self.canonical_dir else {
            return Ok(());
        };
        let path = dir.join(timeframe).join(format!("{symbol}.json"));
        let file = CanonicalFile {
            symbol,
            tf: timeframe,
            bars,
        };
        write_json(&path, &file, false)
    }

    fn write_portfolio(
        &self,
        timeframe: &str,
        summary: &PortfolioSummary,
    ) -> Result<(), TelemetryError> {
        let path = self.out_dir.join(timeframe).join("portfolio.telemetry.json");
        write_json(&path, summary, true)
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), TelemetryError> {
        write_json(&self.out_dir.join("manifest.json"), manifest, true)
    }

    fn write_combined(&self, combined: &CombinedTelemetry) -> Result<(), TelemetryError> {
        write_json(&self.out_dir.join("combined.telemetry.json"), combined, false)
    }

    fn write_summary(&self, summary: &MarketSummary) -> Result<(), TelemetryError> {
        let dir = self.summaries_dir.as_ref().unwrap_or(&self.out_dir);
        write_json(&dir.join(format!("{}.json", summary.ticker)), summary, true)
    }

    fn write_options_summary(&self, summary: &OptionsSummary) -> Result<(), TelemetryError> {
        let dir = self.options_dir.as_ref().unwrap_or(&self.out_dir);
        write_json(&dir.join(format!("{}.json", summary.ticker)), summary, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::engine_config::EngineConfig;
    use crate::domain::telemetry::evaluate;
    use tempfile::TempDir;

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn telemetry_lands_under_timeframe() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let bars = BarSequence::new(vec![Bar::new(0, 10.0), Bar::new(60, 11.0)]);
        let t = evaluate("RKLB", "45m", &bars, None, &EngineConfig::default());

        sink.write_telemetry(&t).unwrap();

        let json = read_json(&dir.path().join("45m/RKLB.telemetry.json"));
        assert_eq!(json["symbol"], "RKLB");
        assert_eq!(json["price"], 11.0);
    }

    #[test]
    fn canonical_skipped_without_dir() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path().join("telemetry"));
        let bars = BarSequence::new(vec![Bar::new(0, 10.0)]);

        sink.write_canonical("RKLB", "1D", &bars).unwrap();
        assert!(!dir.path().join("canonical").exists());

        let sink = sink.with_canonical_dir(Some(dir.path().join("canonical")));
        sink.write_canonical("RKLB", "1D", &bars).unwrap();
        let json = read_json(&dir.path().join("canonical/1D/RKLB.json"));
        assert_eq!(json["tf"], "1D");
        assert_eq!(json["bars"][0]["close"], 10.0);
    }

    #[test]
    fn manifest_is_pretty_and_combined_is_compact() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path());
        let manifest = Manifest {
            timeframes: vec!["1D".into()],
            benchmarks: vec!["XAR".into()],
            symbols: vec!["RKLB".into()],
            updated_at: 1,
        };
        sink.write_manifest(&manifest).unwrap();
        sink.write_combined(&CombinedTelemetry {
            manifest: manifest.clone(),
            telemetry: Default::default(),
        })
        .unwrap();

        let pretty = fs::read_to_string(dir.path().join("manifest.json")).unwrap();
        assert!(pretty.contains('\n'));
        let compact = fs::read_to_string(dir.path().join("combined.telemetry.json")).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn options_summaries_go_to_their_own_dir() {
        use crate::domain::options::{summarize_options, OptionPosition, OptionsBook};

        let dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(dir.path().join("market_summaries"))
            .with_options_dir(Some(dir.path().join("options_summaries")));
        let book = OptionsBook {
            positions: vec![OptionPosition {
                ticker: Some("LUNR".into()),
                structure: Some("call spread".into()),
                ..OptionPosition::default()
            }],
            catalysts: vec![],
        };
        let today = chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        for summary in summarize_options(&book, today).values() {
            sink.write_options_summary(summary).unwrap();
        }

        let json = read_json(&dir.path().join("options_summaries/LUNR.json"));
        assert_eq!(json["leverageFactor"], 1.2);
        assert_eq!(json["riskPosture"], "moderate");
        assert!(!dir.path().join("market_summaries").exists());
    }
}
