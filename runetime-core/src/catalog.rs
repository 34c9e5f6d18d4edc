//! Rune catalog and the dataset document it is loaded from.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rune::Rune;
use crate::scale::{ScaleError, ScaleTable};

/// Errors raised while turning a dataset into a usable catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scale table is invalid: {0}")]
    Scale(#[from] ScaleError),
    #[error("rune {0:?} appears more than once")]
    DuplicateRune(String),
}

/// Raw dataset as delivered by a loader: scale suffixes plus rune records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub scales: BTreeMap<String, f64>,
    #[serde(default)]
    pub runes: Vec<Rune>,
}

impl CatalogData {
    /// Load a dataset from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a dataset.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the scale registry described by this dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if two suffixes share a magnitude.
    pub fn scale_table(&self) -> Result<ScaleTable, CatalogError> {
        let raw = self
            .scales
            .iter()
            .map(|(suffix, magnitude)| (suffix.clone(), *magnitude));
        Ok(ScaleTable::build(raw)?)
    }

    /// Build the rune catalog described by this dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if two runes share a name.
    pub fn rune_catalog(&self) -> Result<RuneCatalog, CatalogError> {
        RuneCatalog::new(self.runes.clone())
    }
}

/// Immutable, name-indexed collection of runes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuneCatalog {
    runes: Vec<Rune>,
    by_name: HashMap<String, usize>,
}

impl RuneCatalog {
    /// Index `runes` by case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateRune`] when two names fold to the same key.
    pub fn new(runes: Vec<Rune>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(runes.len());
        for (idx, rune) in runes.iter().enumerate() {
            if by_name.insert(rune.name.to_lowercase(), idx).is_some() {
                return Err(CatalogError::DuplicateRune(rune.name.clone()));
            }
        }
        Ok(Self { runes, by_name })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rune> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .and_then(|idx| self.runes.get(*idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rune> {
        self.runes.iter()
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Rune> {
        self.runes.iter().filter(move |rune| rune.has_tag(tag))
    }

    /// Runes whose chance is plain odds.
    pub fn simulatable(&self) -> impl Iterator<Item = &Rune> {
        self.runes.iter().filter(|rune| rune.is_simulatable())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.runes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }
}
