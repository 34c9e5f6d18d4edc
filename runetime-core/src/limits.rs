//! Simulation bounds loaded from optional configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_MAX_STEPS, TRACE_LIMIT};

/// Errors raised when limit invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum LimitsError {
    #[error("max_steps must be at least 1")]
    ZeroSteps,
    #[error("trace_limit must be between 1 and {max} (got {value})")]
    TraceLimit { value: usize, max: usize },
    #[error("limits JSON is invalid: {0}")]
    Json(String),
}

/// Caps applied to every simulation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationLimits {
    /// Largest `end - start` accepted by the simulator.
    #[serde(default = "SimulationLimits::default_max_steps")]
    pub max_steps: u64,
    /// Trace lines recorded per run; never above [`TRACE_LIMIT`].
    #[serde(default = "SimulationLimits::default_trace_limit")]
    pub trace_limit: usize,
}

impl SimulationLimits {
    const fn default_max_steps() -> u64 {
        DEFAULT_MAX_STEPS
    }

    const fn default_trace_limit() -> usize {
        TRACE_LIMIT
    }

    /// Check the invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_steps` is zero or `trace_limit` is outside `1..=200`.
    pub const fn validate(&self) -> Result<(), LimitsError> {
        if self.max_steps == 0 {
            return Err(LimitsError::ZeroSteps);
        }
        if self.trace_limit == 0 || self.trace_limit > TRACE_LIMIT {
            return Err(LimitsError::TraceLimit {
                value: self.trace_limit,
                max: TRACE_LIMIT,
            });
        }
        Ok(())
    }

    /// Parse and validate limits from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are out of range.
    pub fn from_json(json: &str) -> Result<Self, LimitsError> {
        let limits: Self =
            serde_json::from_str(json).map_err(|err| LimitsError::Json(err.to_string()))?;
        limits.validate()?;
        Ok(limits)
    }
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            max_steps: Self::default_max_steps(),
            trace_limit: Self::default_trace_limit(),
        }
    }
}
