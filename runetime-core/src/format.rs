//! Render numbers as `"<value> <suffix>"` using a [`ScaleTable`].

use crate::constants::PLAIN_INTEGER_LIMIT;
use crate::numbers::{display_plain, round_significant};
use crate::scale::ScaleTable;

/// Format `value` with the largest suffix whose magnitude does not exceed it.
///
/// Total over all inputs: non-finite values render as `"0"`, small whole numbers
/// render bare, and values below the smallest configured magnitude fall back to
/// a three-significant-digit bare number.
#[must_use]
pub fn format_value(table: &ScaleTable, value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value < PLAIN_INTEGER_LIMIT {
        return display_plain(value);
    }

    match table.largest_at_most(value) {
        Some(entry) => {
            let scaled = display_plain(round_significant(value / entry.magnitude));
            if entry.suffix.is_empty() {
                scaled
            } else {
                format!("{scaled} {}", entry.suffix)
            }
        }
        None => display_plain(round_significant(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ScaleTable {
        ScaleTable::build([("", 1.0), ("K", 1e3), ("M", 1e6), ("QnVt", 1e78)]).unwrap()
    }

    #[test]
    fn small_integers_render_bare() {
        let table = table();
        assert_eq!(format_value(&table, 0.0), "0");
        assert_eq!(format_value(&table, 7.0), "7");
        assert_eq!(format_value(&table, 999.0), "999");
    }

    #[test]
    fn scaled_values_keep_three_significant_digits() {
        let table = table();
        assert_eq!(format_value(&table, 1_000.0), "1 K");
        assert_eq!(format_value(&table, 1_234_567.0), "1.23 M");
        assert_eq!(format_value(&table, 9.5e79), "95 QnVt");
        assert_eq!(format_value(&table, 12.345), "12.3");
    }

    #[test]
    fn values_below_smallest_magnitude_fall_back() {
        let table = table();
        assert_eq!(format_value(&table, 0.123_456), "0.123");
        let bare = ScaleTable::build([("K", 1e3)]).unwrap();
        assert_eq!(format_value(&bare, 12.5), "12.5");
    }

    #[test]
    fn non_finite_values_render_zero() {
        let table = table();
        assert_eq!(format_value(&table, f64::NAN), "0");
        assert_eq!(format_value(&table, f64::INFINITY), "0");
        assert_eq!(format_value(&table, f64::NEG_INFINITY), "0");
        assert_eq!(format_value(&table, -0.0), "0");
    }

    #[test]
    fn largest_finite_value_stays_numeric() {
        let bare = ScaleTable::build([("", 1.0)]).unwrap();
        let text = format_value(&bare, f64::MAX);
        assert_ne!(text, "inf");
        assert!(text.parse::<f64>().is_ok_and(f64::is_finite), "{text}");
    }

    #[test]
    fn negative_values_do_not_panic() {
        let table = table();
        assert_eq!(format_value(&table, -5.0), "-5");
        assert_eq!(format_value(&table, -5.5), "-5.5");
        assert_eq!(format_value(&ScaleTable::default(), 2_500.0), "2500");
    }
}
