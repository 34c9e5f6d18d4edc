//! Runetime Engine
//!
//! Numeric core for estimating how long rune acquisition takes when rates and
//! odds span from single units to astronomically large magnitudes. The crate
//! covers suffix parsing and formatting, the compounding acquisition simulator
//! and human-readable duration summaries, without any I/O of its own.

pub mod catalog;
pub mod constants;
pub mod duration;
pub mod estimate;
pub mod format;
pub mod limits;
pub mod numbers;
pub mod parse;
pub mod rune;
pub mod scale;
pub mod simulate;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use catalog::{CatalogData, CatalogError, RuneCatalog};
pub use constants::TRACE_LIMIT;
pub use duration::{FOREVER_QUOTES, format_duration, is_effectively_forever};
pub use estimate::{probability_within, runes_in, time_per_rune};
pub use format::format_value;
pub use limits::{LimitsError, SimulationLimits};
pub use parse::{ParsedValue, parse_value};
pub use rune::{BonusAmount, BonusEffect, Chance, ModifierKind, Rune, SpecialCost, TargetStat};
pub use scale::{ScaleEntry, ScaleError, ScaleLookup, ScaleTable};
pub use simulate::{
    SimulationError, SimulationOutcome, SimulationRequest, Simulator, capped_linear_step, simulate,
};

/// Trait for abstracting dataset retrieval.
/// Platform-specific implementations (files, HTTP, bundled assets) provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the scale and rune dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be retrieved or decoded.
    fn load_catalog(&self) -> Result<CatalogData, Self::Error>;
}

/// Errors surfaced by [`Calculator`] queries.
#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Limits(#[from] LimitsError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("unknown rune {0:?}")]
    UnknownRune(String),
}

/// Request for a time-to-acquire projection expressed the way a user types it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtaRequest {
    pub rune: String,
    /// Rune speed, e.g. `"95QnVt"`.
    pub rate: String,
    /// Rune bulk; `None` means 1.
    #[serde(default)]
    pub bulk: Option<String>,
    #[serde(default)]
    pub start: u64,
    pub end: u64,
}

/// Projection result with the parsed inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtaReport {
    pub rune: String,
    pub rate: ParsedValue,
    pub bulk: ParsedValue,
    pub outcome: SimulationOutcome,
}

impl EtaReport {
    /// Parser warnings for the rate and bulk inputs, in that order.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.rate
            .warning
            .as_deref()
            .into_iter()
            .chain(self.bulk.warning.as_deref())
    }

    /// Human summary of the projected time; see [`format_duration`].
    pub fn duration<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format_duration(self.outcome.total_time_seconds, rng)
    }
}

/// Constant-rate odds for one rune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsReport {
    pub rune: String,
    pub rps: ParsedValue,
    pub seconds: f64,
    pub time_per_rune: f64,
    pub expected_runes: f64,
    pub probability: f64,
}

/// Read-only session over one dataset: scale registry, rune catalog and limits.
#[derive(Debug, Clone)]
pub struct Calculator {
    table: ScaleTable,
    catalog: RuneCatalog,
    limits: SimulationLimits,
}

impl Calculator {
    /// Build a calculator from a decoded dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the scale table or rune catalog violates its
    /// invariants, or if `limits` is out of range.
    pub fn new(data: &CatalogData, limits: SimulationLimits) -> Result<Self, CalculatorError> {
        limits.validate()?;
        Ok(Self {
            table: data.scale_table()?,
            catalog: data.rune_catalog()?,
            limits,
        })
    }

    /// Load a dataset through `loader` and build a calculator over it.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the dataset is invalid.
    pub fn from_loader<L>(loader: &L, limits: SimulationLimits) -> Result<Self, anyhow::Error>
    where
        L: CatalogLoader,
        L::Error: Into<anyhow::Error>,
    {
        let data = loader.load_catalog().map_err(Into::into)?;
        Ok(Self::new(&data, limits)?)
    }

    #[must_use]
    pub const fn table(&self) -> &ScaleTable {
        &self.table
    }

    #[must_use]
    pub const fn catalog(&self) -> &RuneCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn limits(&self) -> SimulationLimits {
        self.limits
    }

    #[must_use]
    pub const fn simulator(&self) -> Simulator<'_> {
        Simulator::new(&self.table, self.limits)
    }

    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        format::format_value(&self.table, value)
    }

    #[must_use]
    pub fn parse_value(&self, input: &str) -> ParsedValue {
        parse::parse_value(&self.table, input)
    }

    fn rune(&self, name: &str) -> Result<&Rune, CalculatorError> {
        self.catalog
            .get(name)
            .ok_or_else(|| CalculatorError::UnknownRune(name.to_string()))
    }

    /// Parse the user inputs and project the time to acquire the requested copies.
    ///
    /// An unreadable or ambiguous rate parses to zero and yields an unbounded
    /// outcome; the parser warning travels with the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the rune is unknown or the request violates a
    /// simulation precondition.
    pub fn eta(&self, request: &EtaRequest) -> Result<EtaReport, CalculatorError> {
        let rune = self.rune(&request.rune)?;
        let rate = self.parse_value(&request.rate);
        let bulk = request.bulk.as_deref().map_or(
            ParsedValue {
                value: 1.0,
                warning: None,
            },
            |raw| self.parse_value(raw),
        );
        let outcome = self.simulator().simulate(
            rune,
            SimulationRequest {
                start_count: request.start,
                end_count: request.end,
                initial_speed: rate.value,
                initial_bulk: bulk.value,
            },
        )?;
        Ok(EtaReport {
            rune: rune.name.clone(),
            rate,
            bulk,
            outcome,
        })
    }

    /// Constant-rate odds of obtaining `rune` within `seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rune is unknown or has a special cost.
    pub fn odds(&self, rune: &str, rate: &str, seconds: f64) -> Result<OddsReport, CalculatorError> {
        let rune = self.rune(rune)?;
        let chance = rune
            .chance
            .odds()
            .ok_or_else(|| SimulationError::UnsupportedChance(rune.name.clone()))?;
        let rps = self.parse_value(rate);
        Ok(OddsReport {
            rune: rune.name.clone(),
            seconds,
            time_per_rune: time_per_rune(chance, rps.value),
            expected_runes: runes_in(chance, rps.value, seconds),
            probability: probability_within(chance, rps.value, seconds),
            rps,
        })
    }
}
