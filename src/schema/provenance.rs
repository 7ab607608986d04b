//! Optional provenance metadata: where a record came from, when, and how sure we are.

use crate::error::InputError;
use crate::schema::Table;

use regex::Regex;
use std::sync::LazyLock;

pub const WELL_KNOWN_METADATA_COLS: [&str; 3] = ["source_ref", "date", "confidence"];

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

/// Empty, or shaped like YYYY-MM-DD.
pub fn is_valid_optional_date(value: &str) -> bool {
    value.is_empty() || DATE_RE.is_match(value)
}

/// Parse a confidence entry: blank means "not given", otherwise a float in [0, 1].
pub fn parse_optional_confidence(value: &str) -> Result<Option<f64>, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(c) if (0.0..=1.0).contains(&c) => Ok(Some(c)),
        _ => Err(InputError::InvalidConfidence(value.to_string())),
    }
}

/// Add any missing metadata column, filled with "".
pub fn ensure_metadata_columns(table: &mut Table) {
    for column in WELL_KNOWN_METADATA_COLS {
        table.ensure_column(column);
    }
}
