//! Numeric conversion helpers centralizing safe numeric casts and rounding.

use num_traits::cast::cast;

use crate::constants::SIGNIFICANT_DIGITS;

/// Convert an acquisition count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(f64::MAX)
}

/// Floor a non-negative f64 into a u64, returning 0 for non-finite or negative values.
#[must_use]
pub fn floor_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, u64>(value.floor()).unwrap_or(u64::MAX)
}

/// Round to three significant digits, mirroring a `toPrecision(3)` round trip.
///
/// Rounding goes through the decimal exponent form so very small and very
/// large inputs never overflow an intermediate scale factor.
#[must_use]
pub fn round_significant(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let precision = SIGNIFICANT_DIGITS - 1;
    // Near f64::MAX the rounded digits can overflow.
    match format!("{value:.precision$e}").parse::<f64>() {
        Ok(rounded) if rounded.is_finite() => rounded,
        _ => value,
    }
}

/// Render a float without insignificant trailing zeros.
///
/// Values outside `[1e-6, 1e21)` switch to exponent notation so tiny
/// remainders never print as a long run of zeros.
#[must_use]
pub fn display_plain(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}
