//! Ticker inference from export file names.

use std::path::Path;

use crate::domain::error::TelemetryError;

const MAX_TICKER_LEN: usize = 6;

/// Exchange prefixes charting vendors put in front of the ticker.
const EXCHANGE_PREFIXES: [&str; 6] = ["BATS_", "NASDAQ_", "NYSE_", "AMEX_", "ARCA_", "CBOE_"];

/// `BATS_RKLB, 45_ccede.csv`, `RKLB_45.csv` and `RKLB.csv` all give `RKLB`.
///
/// Spaces are ignored and `-` reads as `_`. A known exchange prefix is
/// dropped when a letter follows it; the ticker is the leading run of letters
/// of what remains, uppercased, at most six long.
pub fn infer_ticker(path: &Path) -> Result<String, TelemetryError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| if c == '-' { '_' } else { c })
        .collect();

    let rest = strip_exchange(&stem);
    let ticker = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase();

    if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN {
        return Err(TelemetryError::malformed(
            name,
            "cannot infer a ticker symbol from the file name",
        ));
    }
    Ok(ticker)
}

fn strip_exchange(stem: &str) -> &str {
    EXCHANGE_PREFIXES
        .iter()
        .find_map(|prefix| {
            let head = stem.get(..prefix.len())?;
            let rest = &stem[prefix.len()..];
            let ticker_follows = rest.starts_with(|c: char| c.is_ascii_alphabetic());
            (head.eq_ignore_ascii_case(prefix) && ticker_follows).then_some(rest)
        })
        .unwrap_or(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(name: &str) -> String {
        infer_ticker(Path::new(name)).unwrap()
    }

    #[test]
    fn vendor_export_name() {
        assert_eq!(ticker("charts/BATS_RKLB, 45_ccede.csv"), "RKLB");
        assert_eq!(ticker("NASDAQ_ASTS, 1D.csv"), "ASTS");
        assert_eq!(ticker("bats_lunr-45.csv"), "LUNR");
    }

    #[test]
    fn plain_name() {
        assert_eq!(ticker("RKLB.csv"), "RKLB");
        assert_eq!(ticker("xar.json"), "XAR");
    }

    #[test]
    fn timeframe_suffix_is_not_the_ticker() {
        assert_eq!(ticker("AAPL_daily.csv"), "AAPL");
        assert_eq!(ticker("SPY_1D.csv"), "SPY");
        assert_eq!(ticker("RKLB_45.csv"), "RKLB");
        assert_eq!(ticker("lunr_45.csv"), "LUNR");
    }

    #[test]
    fn bare_exchange_name_is_a_ticker() {
        assert_eq!(ticker("BATS.csv"), "BATS");
        assert_eq!(ticker("BATS_45.csv"), "BATS");
    }

    #[test]
    fn untyped_name_is_malformed() {
        let err = infer_ticker(Path::new("12345.csv")).unwrap_err();
        assert!(matches!(err, TelemetryError::MalformedSource { .. }));
        assert!(infer_ticker(Path::new("TOOLONGNAME.csv")).is_err());
    }
}
