//! Options book loader: `{ "positions": [...], "catalysts": [...] }`.

use std::fs;
use std::path::Path;

use crate::domain::error::TelemetryError;
use crate::domain::options::OptionsBook;

pub fn load_options_book(path: &Path) -> Result<OptionsBook, TelemetryError> {
    let content = fs::read_to_string(path)?;
    parse_options_book(&content, &path.display().to_string())
}

pub fn parse_options_book(
    content: &str,
    source_name: &str,
) -> Result<OptionsBook, TelemetryError> {
    serde_json::from_str(content).map_err(|e| {
        TelemetryError::malformed(source_name, format!("invalid options book: {e}"))
    })
}
