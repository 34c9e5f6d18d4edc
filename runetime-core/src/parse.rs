//! Parse user-entered numbers such as `"95QnVt"`, `"1.5M"` or `"1e300"`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scale::{ScaleLookup, ScaleTable};

static SUFFIXED: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(\d*\.?\d+)\s*([A-Za-z]+)\s*$").ok());

/// Parsed number plus an optional user-facing warning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedValue {
    pub value: f64,
    #[serde(default)]
    pub warning: Option<String>,
}

impl ParsedValue {
    const fn plain(value: f64) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    /// `number * magnitude`, or the silent zero when the product overflows.
    fn scaled(number: f64, magnitude: f64) -> Self {
        let value = number * magnitude;
        if value.is_finite() {
            Self::plain(value)
        } else {
            Self::default()
        }
    }

    fn ambiguous(candidates: &[String]) -> Self {
        Self {
            value: 0.0,
            warning: Some(format!("ambiguous: use one of {}", candidates.join(", "))),
        }
    }
}

/// Parse `input` against the suffix registry.
///
/// Never fails: unreadable input yields `0` without a warning, and a suffix that
/// only matches several case variants yields `0` with a warning naming them.
#[must_use]
pub fn parse_value(table: &ScaleTable, input: &str) -> ParsedValue {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ParsedValue::default();
    }

    if let Some(parsed) = parse_suffixed(table, trimmed) {
        return parsed;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => ParsedValue::plain(value),
        _ => ParsedValue::default(),
    }
}

/// `None` means the suffixed grammar did not apply or the suffix is unknown.
fn parse_suffixed(table: &ScaleTable, trimmed: &str) -> Option<ParsedValue> {
    let captures = SUFFIXED.as_ref()?.captures(trimmed)?;
    let number: f64 = captures.get(1)?.as_str().parse().ok()?;
    let suffix = captures.get(2)?.as_str();

    if let Some(magnitude) = table.lookup_exact(suffix) {
        return Some(ParsedValue::scaled(number, magnitude));
    }
    match table.lookup_case_insensitive(suffix) {
        ScaleLookup::Ambiguous(candidates) => Some(ParsedValue::ambiguous(candidates)),
        ScaleLookup::Magnitude(magnitude) => Some(ParsedValue::scaled(number, magnitude)),
        ScaleLookup::NotFound => {
            log::debug!("unrecognized scale suffix {suffix:?} in {trimmed:?}");
            None
        }
    }
}
