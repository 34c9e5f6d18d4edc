//! Closed-form estimates for a constant production rate.

/// Mean seconds per copy at a constant rate; `+inf` when the rate is not positive.
#[must_use]
pub fn time_per_rune(chance: f64, rps: f64) -> f64 {
    if rps.is_nan() || rps <= 0.0 {
        return f64::INFINITY;
    }
    chance / rps
}

/// Expected copies obtained in `seconds`.
#[must_use]
pub fn runes_in(chance: f64, rps: f64, seconds: f64) -> f64 {
    if chance <= 0.0 || rps.is_nan() || rps <= 0.0 || seconds <= 0.0 {
        return 0.0;
    }
    rps * seconds / chance
}

/// Probability of at least one copy within `seconds`.
///
/// Each produced unit is an independent `1 / chance` roll, so the result is
/// `1 - (1 - 1/chance)^(rps * seconds)`, evaluated in log space to stay accurate
/// for odds far beyond f64's integer precision.
#[must_use]
pub fn probability_within(chance: f64, rps: f64, seconds: f64) -> f64 {
    if rps.is_nan() || rps <= 0.0 || seconds.is_nan() || seconds <= 0.0 {
        return 0.0;
    }
    if chance <= 1.0 {
        return 1.0;
    }
    let rolls = rps * seconds;
    let per_roll_miss = (-1.0 / chance).ln_1p();
    let probability = -(rolls * per_roll_miss).exp_m1();
    probability.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_per_rune_handles_dead_rate() {
        assert!((time_per_rune(1e12, 1e6) - 1e6).abs() < 1e-6);
        assert!(time_per_rune(10.0, 0.0).is_infinite());
        assert!(time_per_rune(10.0, f64::NAN).is_infinite());
    }

    #[test]
    fn runes_in_scales_linearly() {
        assert!((runes_in(100.0, 10.0, 60.0) - 6.0).abs() < 1e-12);
        assert!(runes_in(100.0, -1.0, 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn probability_matches_geometric_model() {
        let p = probability_within(2.0, 1.0, 1.0);
        assert!((p - 0.5).abs() < 1e-12);
        let p = probability_within(2.0, 1.0, 2.0);
        assert!((p - 0.75).abs() < 1e-12);
    }

    #[test]
    fn probability_stays_accurate_for_huge_odds() {
        // Expected one copy: 1 - e^-1.
        let p = probability_within(9.5e79, 9.5e76, 1_000.0);
        assert!((p - (1.0 - (-1.0f64).exp())).abs() < 1e-9);
        assert!(probability_within(1e300, 1.0, 1.0) > 0.0);
    }

    #[test]
    fn probability_edges() {
        assert!((probability_within(0.5, 1.0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!(probability_within(10.0, 0.0, 100.0).abs() < f64::EPSILON);
        assert!(probability_within(10.0, 1.0, 0.0).abs() < f64::EPSILON);
    }
}
