//! Telemetry output port trait.

use crate::domain::bar::BarSequence;
use crate::domain::error::TelemetryError;
use crate::domain::fleet::{CombinedTelemetry, Manifest};
use crate::domain::market_summary::MarketSummary;
use crate::domain::options::OptionsSummary;
use crate::domain::portfolio::PortfolioSummary;
use crate::domain::telemetry::Telemetry;

/// Port for persisting pipeline results. Called from a single thread after
/// all symbols have been evaluated.
pub trait TelemetrySink {
    fn write_telemetry(&self, telemetry: &Telemetry) -> Result<(), TelemetryError>;

    /// Normalized copy of the input bars.
    fn write_canonical(
        &self,
        symbol: &str,
        timeframe: &str,
        bars: &BarSequence,
    ) -> Result<(), TelemetryError>;

    fn write_portfolio(
        &self,
        timeframe: &str,
        summary: &PortfolioSummary,
    ) -> Result<(), TelemetryError>;

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), TelemetryError>;

    fn write_combined(&self, combined: &CombinedTelemetry) -> Result<(), TelemetryError>;

    fn write_summary(&self, summary: &MarketSummary) -> Result<(), TelemetryError>;

    fn write_options_summary(&self, summary: &OptionsSummary) -> Result<(), TelemetryError>;
}
