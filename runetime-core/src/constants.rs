//! Centralized numeric constants for the rune-time engine.
//!
//! Formatting thresholds, calendar unit sizes and simulation bounds live
//! here so the observable output can only change through reviewed code.

// Number formatting --------------------------------------------------------
/// Whole numbers below this render as plain integers without a suffix.
pub(crate) const PLAIN_INTEGER_LIMIT: f64 = 1000.0;
/// Significant digits kept when rendering a scaled value.
pub(crate) const SIGNIFICANT_DIGITS: usize = 3;

// Duration formatting ------------------------------------------------------
pub(crate) const SECONDS_PER_MINUTE: f64 = 60.0;
pub(crate) const SECONDS_PER_HOUR: f64 = 3_600.0;
pub(crate) const SECONDS_PER_DAY: f64 = 86_400.0;
/// Fixed 365-day year; leap years are not modelled.
pub(crate) const SECONDS_PER_YEAR: f64 = 31_536_000.0;
/// Durations beyond this many years are reported with a placeholder quote.
pub(crate) const FOREVER_YEARS: f64 = 100.0;
/// Number of non-zero units shown in a duration summary.
pub(crate) const DURATION_UNITS_SHOWN: usize = 3;

// Simulation ---------------------------------------------------------------
/// Hard ceiling on recorded trace lines per simulation.
pub const TRACE_LIMIT: usize = 200;
/// Default cap on simulated acquisitions per request.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;
