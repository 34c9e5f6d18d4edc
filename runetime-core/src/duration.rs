//! Human-readable summaries for (possibly astronomical) durations.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::{
    DURATION_UNITS_SHOWN, FOREVER_YEARS, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
    SECONDS_PER_YEAR,
};
use crate::numbers::floor_f64_to_u64;

/// Placeholders shown instead of a number once a wait exceeds a century.
pub const FOREVER_QUOTES: [&str; 8] = [
    "Heat death of the universe",
    "Longer than the age of the universe",
    "Your great-great-grandchildren might see it",
    "Until the sun burns out",
    "When pigs fly",
    "Not in this lifetime",
    "Eventually... maybe",
    "Approximately forever",
];

const UNITS: [(&str, f64); 5] = [
    ("year", SECONDS_PER_YEAR),
    ("day", SECONDS_PER_DAY),
    ("hour", SECONDS_PER_HOUR),
    ("minute", SECONDS_PER_MINUTE),
    ("second", 1.0),
];

/// Summarize `seconds` as up to three non-zero calendar units.
///
/// Negative or non-finite input renders `"..."`, sub-second waits render
/// `"Instant"`. Anything beyond a century picks one of [`FOREVER_QUOTES`] from
/// `rng`, so that branch is deterministic only for a seeded source.
pub fn format_duration<R: Rng + ?Sized>(seconds: f64, rng: &mut R) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "...".to_string();
    }
    if seconds < 1.0 {
        return "Instant".to_string();
    }
    if seconds > FOREVER_YEARS * SECONDS_PER_YEAR {
        return FOREVER_QUOTES
            .choose(rng)
            .copied()
            .unwrap_or(FOREVER_QUOTES[0])
            .to_string();
    }

    let mut remaining = seconds.floor();
    let mut parts: Vec<String> = Vec::with_capacity(DURATION_UNITS_SHOWN);
    for (name, size) in UNITS {
        let count = floor_f64_to_u64(remaining / size);
        remaining -= (remaining / size).floor() * size;
        if count == 0 {
            continue;
        }
        let plural = if count > 1 { "s" } else { "" };
        parts.push(format!("{count} {name}{plural}"));
        if parts.len() == DURATION_UNITS_SHOWN {
            break;
        }
    }
    parts.join(", ")
}

/// Whether `seconds` falls in the placeholder range of [`format_duration`].
#[must_use]
pub fn is_effectively_forever(seconds: f64) -> bool {
    seconds.is_finite() && seconds > FOREVER_YEARS * SECONDS_PER_YEAR
}
