//! Iterative acquisition-time projection with compounding per-copy bonuses.
//!
//! Each copy of a rune can change the production rate for every later copy, and
//! additive, multiplicative and power bonuses compose in a path-dependent way, so
//! the projection walks one acquisition at a time instead of using a closed form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::format_value;
use crate::limits::SimulationLimits;
use crate::numbers::count_to_f64;
use crate::rune::{BonusEffect, ModifierKind, Rune, TargetStat};
use crate::scale::ScaleTable;

/// Precondition violations that callers are expected to filter out upstream.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("rune {0:?} has a special cost and cannot be simulated")]
    UnsupportedChance(String),
    #[error("end count {end} must be greater than start count {start}")]
    EmptyRange { start: u64, end: u64 },
    #[error("{requested} acquisitions exceed the limit of {max}")]
    TooManySteps { requested: u64, max: u64 },
    #[error("rune {rune:?} caps at {max_count} copies (requested {end})")]
    ExceedsMaxCount { rune: String, max_count: u64, end: u64 },
}

/// Inputs for one projection: simulate copies `start_count + 1 ..= end_count`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub start_count: u64,
    pub end_count: u64,
    pub initial_speed: f64,
    pub initial_bulk: f64,
}

/// Result of a projection. `total_time_seconds` is `+inf` when the rate dropped
/// to zero or below at some step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub total_time_seconds: f64,
    pub final_rps: f64,
    pub trace_log: Vec<String>,
    /// Acquisitions whose time was added to the total.
    pub steps: u64,
}

impl SimulationOutcome {
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.total_time_seconds.is_infinite()
    }
}

/// Transient per-run state; never shared between runs.
#[derive(Debug, Clone)]
struct SimulationState {
    current_speed: f64,
    current_bulk: f64,
    cumulative_time_seconds: f64,
    trace_log: Vec<String>,
    trace_limit: usize,
}

impl SimulationState {
    fn new(speed: f64, bulk: f64, trace_limit: usize) -> Self {
        Self {
            current_speed: speed,
            current_bulk: bulk,
            cumulative_time_seconds: 0.0,
            trace_log: Vec::with_capacity(trace_limit.min(16)),
            trace_limit,
        }
    }

    fn rps(&self) -> f64 {
        self.current_speed * self.current_bulk
    }

    fn record(&mut self, line: String) {
        if self.trace_log.len() < self.trace_limit {
            self.trace_log.push(line);
        }
    }

    /// Terminal entries always land, replacing the last line when the log is full.
    fn record_terminal(&mut self, line: String) {
        if self.trace_log.len() >= self.trace_limit {
            self.trace_log.pop();
        }
        self.trace_log.push(line);
    }

    fn rate_mut(&mut self, stat: TargetStat) -> Option<&mut f64> {
        match stat {
            TargetStat::RuneSpeed => Some(&mut self.current_speed),
            TargetStat::RuneBulk => Some(&mut self.current_bulk),
            TargetStat::Other => None,
        }
    }

    fn apply_bonus(&mut self, bonus: &BonusEffect, count: u64) {
        let Some(magnitude) = bonus.numeric_magnitude() else {
            return;
        };
        let Some(rate) = self.rate_mut(bonus.target_stat) else {
            return;
        };
        match bonus.modifier_kind {
            ModifierKind::Additive => *rate += magnitude,
            // Approximation: the dataset gives no scaling law for exponential
            // bonuses, so they compound as a flat multiplier per copy.
            ModifierKind::Multiplier if bonus.is_compounding() => *rate *= magnitude,
            ModifierKind::Multiplier => {
                *rate *= capped_linear_step(magnitude, bonus.cap, count);
            }
            ModifierKind::Power => *rate = rate.powf(magnitude),
            // No rate rule exists for subtractive bonuses.
            ModifierKind::Subtractive => {}
        }
    }

    fn into_outcome(self, total_time_seconds: f64, steps: u64) -> SimulationOutcome {
        SimulationOutcome {
            total_time_seconds,
            final_rps: self.rps(),
            trace_log: self.trace_log,
            steps,
        }
    }
}

/// NaN counts as not positive.
fn is_positive(value: f64) -> bool {
    value > 0.0
}

/// Ratio that moves a capped linear multiplier from `count` copies to `count + 1`.
///
/// The accumulated multiplier is `min(1 + count * (magnitude - 1), cap)`; the
/// returned ratio is `1.0` once the cap is reached or when the base is not positive.
#[must_use]
pub fn capped_linear_step(magnitude: f64, cap: Option<f64>, count: u64) -> f64 {
    let linear = magnitude - 1.0;
    let clamp = |value: f64| cap.map_or(value, |cap| value.min(cap));
    let before = clamp(1.0 + count_to_f64(count) * linear);
    let after = clamp(1.0 + count_to_f64(count + 1) * linear);
    if before > 0.0 && after != before {
        after / before
    } else {
        1.0
    }
}

/// Runs projections against one scale table and set of limits.
#[derive(Debug, Clone, Copy)]
pub struct Simulator<'a> {
    table: &'a ScaleTable,
    limits: SimulationLimits,
}

impl<'a> Simulator<'a> {
    #[must_use]
    pub const fn new(table: &'a ScaleTable, limits: SimulationLimits) -> Self {
        Self { table, limits }
    }

    #[must_use]
    pub const fn limits(&self) -> SimulationLimits {
        self.limits
    }

    /// Project the time to acquire copies `start_count + 1 ..= end_count` of `rune`.
    ///
    /// A non-positive rate, initially or at any later step, is not an error: the
    /// outcome reports `+inf` seconds and a trace entry explaining the stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the rune has a special cost, the range is empty, the
    /// range exceeds the configured step budget, or `end_count` exceeds the
    /// rune's `max_count`.
    pub fn simulate(
        &self,
        rune: &Rune,
        request: SimulationRequest,
    ) -> Result<SimulationOutcome, SimulationError> {
        let odds = self.check(rune, &request)?;
        let mut state = SimulationState::new(
            request.initial_speed,
            request.initial_bulk,
            self.limits.trace_limit,
        );

        if !is_positive(state.rps()) {
            log::debug!("{}: initial rate {} is not positive", rune.name, state.rps());
            state.record_terminal(format!(
                "Rate is not positive (speed {} x bulk {}); the rune is never acquired",
                self.fmt(request.initial_speed),
                self.fmt(request.initial_bulk),
            ));
            let mut outcome = state.into_outcome(f64::INFINITY, 0);
            outcome.final_rps = 0.0;
            return Ok(outcome);
        }

        log::debug!(
            "simulating {} from {} to {} at rps {}",
            rune.name,
            request.start_count,
            request.end_count,
            state.rps()
        );

        for count in request.start_count..request.end_count {
            let rps = state.rps();
            if !is_positive(rps) {
                log::debug!("{}: rate dropped to {rps} before copy {}", rune.name, count + 1);
                state.record_terminal(format!(
                    "#{}: rate dropped to {}; stopping",
                    count + 1,
                    self.fmt(rps)
                ));
                let steps = count - request.start_count;
                return Ok(state.into_outcome(f64::INFINITY, steps));
            }

            let step_seconds = odds / rps;
            state.cumulative_time_seconds += step_seconds;
            if state.trace_log.len() < state.trace_limit {
                let line = format!(
                    "#{}: speed {} | bulk {} | rps {} | {} seconds",
                    count + 1,
                    self.fmt(state.current_speed),
                    self.fmt(state.current_bulk),
                    self.fmt(rps),
                    self.fmt(step_seconds),
                );
                state.record(line);
            }

            for bonus in &rune.bonuses {
                state.apply_bonus(bonus, count);
            }
        }

        let total = state.cumulative_time_seconds;
        let outcome = state.into_outcome(total, request.end_count - request.start_count);
        log::debug!(
            "{}: {} copies in {}s, final rps {}",
            rune.name,
            outcome.steps,
            outcome.total_time_seconds,
            outcome.final_rps
        );
        Ok(outcome)
    }

    fn check(&self, rune: &Rune, request: &SimulationRequest) -> Result<f64, SimulationError> {
        let odds = rune
            .chance
            .odds()
            .ok_or_else(|| SimulationError::UnsupportedChance(rune.name.clone()))?;
        if request.end_count <= request.start_count {
            return Err(SimulationError::EmptyRange {
                start: request.start_count,
                end: request.end_count,
            });
        }
        let requested = request.end_count - request.start_count;
        if requested > self.limits.max_steps {
            return Err(SimulationError::TooManySteps {
                requested,
                max: self.limits.max_steps,
            });
        }
        if let Some(max_count) = rune.max_count
            && request.end_count > max_count
        {
            return Err(SimulationError::ExceedsMaxCount {
                rune: rune.name.clone(),
                max_count,
                end: request.end_count,
            });
        }
        Ok(odds)
    }

    fn fmt(&self, value: f64) -> String {
        format_value(self.table, value)
    }
}

/// Convenience wrapper using [`SimulationLimits::default`].
///
/// # Errors
///
/// See [`Simulator::simulate`].
pub fn simulate(
    table: &ScaleTable,
    rune: &Rune,
    request: SimulationRequest,
) -> Result<SimulationOutcome, SimulationError> {
    Simulator::new(table, SimulationLimits::default()).simulate(rune, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rune::BonusEffect;

    fn table() -> ScaleTable {
        ScaleTable::build([("", 1.0), ("K", 1e3), ("M", 1e6)]).unwrap()
    }

    fn request(start: u64, end: u64, speed: f64, bulk: f64) -> SimulationRequest {
        SimulationRequest {
            start_count: start,
            end_count: end,
            initial_speed: speed,
            initial_bulk: bulk,
        }
    }

    #[test]
    fn no_bonus_run_is_linear() {
        let rune = Rune::with_odds("Plain", 1e12);
        let outcome = simulate(&table(), &rune, request(0, 3, 1e6, 1.0)).unwrap();
        assert!((outcome.total_time_seconds - 3_000_000.0).abs() < 1e-6);
        assert!((outcome.final_rps - 1e6).abs() < f64::EPSILON);
        assert_eq!(outcome.trace_log.len(), 3);
        assert_eq!(outcome.steps, 3);
        assert!(outcome.trace_log[0].starts_with("#1: speed 1 M | bulk 1 | rps 1 M"));
    }

    #[test]
    fn additive_bonus_raises_rate_after_each_copy() {
        let rune = Rune::with_odds("Basic", 10.0).with_bonus(BonusEffect::new(
            TargetStat::RuneSpeed,
            ModifierKind::Additive,
            1.0,
        ));
        let outcome = simulate(&table(), &rune, request(0, 2, 1.0, 1.0)).unwrap();
        // 10 / 1 + 10 / 2
        assert!((outcome.total_time_seconds - 15.0).abs() < 1e-9);
        assert!((outcome.final_rps - 3.0).abs() < 1e-9);
    }

    #[test]
    fn compounding_multiplier_is_flat_per_copy() {
        let mut bonus = BonusEffect::multiplier(TargetStat::RuneBulk, 2.0, None);
        bonus.is_exponential = true;
        let rune = Rune::with_odds("Abyssal", 8.0).with_bonus(bonus);
        let outcome = simulate(&table(), &rune, request(0, 3, 1.0, 1.0)).unwrap();
        // 8 + 4 + 2
        assert!((outcome.total_time_seconds - 14.0).abs() < 1e-9);
        assert!((outcome.final_rps - 8.0).abs() < 1e-9);
    }

    #[test]
    fn power_bonus_raises_rate_to_magnitude() {
        let rune = Rune::with_odds("Singularity", 100.0).with_bonus(BonusEffect::new(
            TargetStat::RuneSpeed,
            ModifierKind::Power,
            2.0,
        ));
        let outcome = simulate(&table(), &rune, request(0, 2, 3.0, 1.0)).unwrap();
        assert!((outcome.final_rps - 81.0).abs() < 1e-9);
    }

    #[test]
    fn inert_bonuses_leave_rate_alone() {
        let mut label = BonusEffect::multiplier(TargetStat::RuneSpeed, 1.0, None);
        label.magnitude = crate::rune::BonusAmount::Label("x2 at night".to_string());
        let rune = Rune::with_odds("Mixed", 10.0)
            .with_bonus(BonusEffect::multiplier(TargetStat::Other, 5.0, None))
            .with_bonus(BonusEffect::new(TargetStat::RuneSpeed, ModifierKind::Subtractive, 0.5))
            .with_bonus(label);
        let outcome = simulate(&table(), &rune, request(0, 4, 2.0, 1.0)).unwrap();
        assert!((outcome.final_rps - 2.0).abs() < f64::EPSILON);
        assert!((outcome.total_time_seconds - 20.0).abs() < 1e-9);
    }

    #[test]
    fn capped_linear_step_stops_at_cap() {
        assert!((capped_linear_step(1.1, Some(2.0), 0) - 1.1).abs() < 1e-12);
        assert!((capped_linear_step(1.1, Some(2.0), 10) - 1.0).abs() < f64::EPSILON);
        assert!((capped_linear_step(1.1, None, 10) - 2.1 / 2.0).abs() < 1e-12);
        // A base at or below zero never scales the rate.
        assert!((capped_linear_step(0.5, None, 2) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_positive_initial_rate_is_unbounded() {
        let rune = Rune::with_odds("Plain", 10.0);
        let outcome = simulate(&table(), &rune, request(0, 5, 0.0, 3.0)).unwrap();
        assert!(outcome.is_unbounded());
        assert!(outcome.final_rps.abs() < f64::EPSILON);
        assert_eq!(outcome.trace_log.len(), 1);
        assert_eq!(outcome.steps, 0);

        let nan = simulate(&table(), &rune, request(0, 5, f64::NAN, 1.0)).unwrap();
        assert!(nan.is_unbounded());
    }

    #[test]
    fn rate_dropping_mid_run_aborts() {
        let rune = Rune::with_odds("Drain", 10.0).with_bonus(BonusEffect::new(
            TargetStat::RuneSpeed,
            ModifierKind::Additive,
            -1.0,
        ));
        let outcome = simulate(&table(), &rune, request(0, 5, 2.0, 1.0)).unwrap();
        assert!(outcome.is_unbounded());
        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.trace_log.len(), 3);
        assert!(outcome.trace_log[2].contains("stopping"));
    }

    #[test]
    fn trace_respects_configured_limit() {
        let limits = SimulationLimits {
            max_steps: 100,
            trace_limit: 5,
        };
        let rune = Rune::with_odds("Plain", 1.0);
        let table = table();
        let outcome = Simulator::new(&table, limits)
            .simulate(&rune, request(0, 50, 1.0, 1.0))
            .unwrap();
        assert_eq!(outcome.trace_log.len(), 5);
        assert_eq!(outcome.steps, 50);
    }

    #[test]
    fn abort_line_replaces_last_entry_of_full_trace() {
        let limits = SimulationLimits {
            max_steps: 100,
            trace_limit: 5,
        };
        let rune = Rune::with_odds("Drain", 10.0).with_bonus(BonusEffect::new(
            TargetStat::RuneSpeed,
            ModifierKind::Additive,
            -1.0,
        ));
        let table = table();
        let outcome = Simulator::new(&table, limits)
            .simulate(&rune, request(0, 20, 10.0, 1.0))
            .unwrap();
        assert!(outcome.is_unbounded());
        assert_eq!(outcome.steps, 10);
        assert_eq!(outcome.trace_log.len(), 5);
        assert!(outcome.trace_log[3].starts_with("#4: "));
        assert_eq!(
            outcome.trace_log.last().map(String::as_str),
            Some("#11: rate dropped to 0; stopping")
        );
    }

    #[test]
    fn preconditions_are_reported() {
        let table = table();
        let mut special = Rune::with_odds("Token", 1.0);
        special.chance = crate::rune::Chance::Special(crate::rune::SpecialCost {
            value: 3.0,
            unit: "Gems".to_string(),
        });
        assert_eq!(
            simulate(&table, &special, request(0, 1, 1.0, 1.0)),
            Err(SimulationError::UnsupportedChance("Token".to_string()))
        );

        let plain = Rune::with_odds("Plain", 1.0);
        assert_eq!(
            simulate(&table, &plain, request(4, 4, 1.0, 1.0)),
            Err(SimulationError::EmptyRange { start: 4, end: 4 })
        );

        let strict = SimulationLimits {
            max_steps: 10,
            trace_limit: 200,
        };
        assert_eq!(
            Simulator::new(&table, strict).simulate(&plain, request(0, 11, 1.0, 1.0)),
            Err(SimulationError::TooManySteps {
                requested: 11,
                max: 10
            })
        );

        let mut capped = Rune::with_odds("Capped", 1.0);
        capped.max_count = Some(3);
        assert!(matches!(
            simulate(&table, &capped, request(0, 4, 1.0, 1.0)),
            Err(SimulationError::ExceedsMaxCount { max_count: 3, .. })
        ));
    }
}
