//! Magnitude-suffix registry.
//!
//! A [`ScaleTable`] is built once from raw `suffix -> magnitude` data and is
//! read-only afterwards. Entries are kept sorted by descending magnitude so the
//! formatter can match largest-first, and a lowercase index flags suffixes whose
//! case-insensitive spelling collides (for example `Tqg` and `TQg`).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use thiserror::Error;

/// One suffix and the magnitude it stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleEntry {
    pub suffix: String,
    pub magnitude: f64,
}

/// Original-case suffixes sharing one lowercase spelling.
pub type Candidates = SmallVec<[String; 2]>;

#[derive(Debug, Clone, PartialEq)]
enum FoldedEntry {
    Unique(f64),
    Ambiguous(Candidates),
}

/// Result of a case-insensitive suffix lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleLookup<'a> {
    /// Exactly one suffix folds to the requested spelling.
    Magnitude(f64),
    /// Several case variants fold to the requested spelling.
    Ambiguous(&'a [String]),
    NotFound,
}

/// Errors raised while building a scale table from raw data.
#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("suffixes {first:?} and {second:?} share magnitude {magnitude:e}")]
    DuplicateMagnitude {
        first: String,
        second: String,
        magnitude: f64,
    },
}

/// Immutable, descending-sorted suffix registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaleTable {
    entries: Vec<ScaleEntry>,
    exact: HashMap<String, f64>,
    folded: HashMap<String, FoldedEntry>,
}

impl ScaleTable {
    /// Build a table from raw `suffix -> magnitude` pairs.
    ///
    /// Non-positive and non-finite magnitudes are dropped with a warning; they can
    /// never be matched by the formatter.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::DuplicateMagnitude`] when two suffixes map to the same
    /// magnitude.
    pub fn build<I, S>(raw: I) -> Result<Self, ScaleError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut entries: Vec<ScaleEntry> = Vec::new();
        for (suffix, magnitude) in raw {
            let suffix = suffix.into();
            if !magnitude.is_finite() || magnitude <= 0.0 {
                log::warn!("dropping scale suffix {suffix:?}: magnitude {magnitude} is not positive");
                continue;
            }
            entries.push(ScaleEntry { suffix, magnitude });
        }

        entries.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[0].magnitude.total_cmp(&pair[1].magnitude).is_eq())
        {
            return Err(ScaleError::DuplicateMagnitude {
                first: pair[1].suffix.clone(),
                second: pair[0].suffix.clone(),
                magnitude: pair[0].magnitude,
            });
        }

        let exact: HashMap<String, f64> = entries
            .iter()
            .map(|entry| (entry.suffix.clone(), entry.magnitude))
            .collect();

        let mut groups: BTreeMap<String, Vec<&ScaleEntry>> = BTreeMap::new();
        for entry in &entries {
            groups
                .entry(entry.suffix.to_lowercase())
                .or_default()
                .push(entry);
        }

        let mut folded = HashMap::with_capacity(groups.len());
        for (lower, members) in groups {
            let folded_entry = match members.as_slice() {
                [single] => FoldedEntry::Unique(single.magnitude),
                many => {
                    // Smallest magnitude first keeps warnings in reading order.
                    let candidates: Candidates = many
                        .iter()
                        .rev()
                        .map(|entry| entry.suffix.clone())
                        .collect();
                    log::debug!("ambiguous scale suffix {lower:?}: {candidates:?}");
                    FoldedEntry::Ambiguous(candidates)
                }
            };
            folded.insert(lower, folded_entry);
        }

        Ok(Self {
            entries,
            exact,
            folded,
        })
    }

    /// Entries sorted by descending magnitude.
    #[must_use]
    pub fn entries(&self) -> &[ScaleEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-sensitive suffix lookup.
    #[must_use]
    pub fn lookup_exact(&self, suffix: &str) -> Option<f64> {
        self.exact.get(suffix).copied()
    }

    /// Case-insensitive suffix lookup that reports collisions instead of guessing.
    #[must_use]
    pub fn lookup_case_insensitive(&self, suffix: &str) -> ScaleLookup<'_> {
        match self.folded.get(&suffix.to_lowercase()) {
            Some(FoldedEntry::Unique(magnitude)) => ScaleLookup::Magnitude(*magnitude),
            Some(FoldedEntry::Ambiguous(candidates)) => ScaleLookup::Ambiguous(candidates.as_slice()),
            None => ScaleLookup::NotFound,
        }
    }

    /// Every lowercase spelling that maps to more than one suffix, with its candidates.
    pub fn ambiguous_groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.folded.iter().filter_map(|(lower, entry)| match entry {
            FoldedEntry::Ambiguous(candidates) => Some((lower.as_str(), candidates.as_slice())),
            FoldedEntry::Unique(_) => None,
        })
    }

    /// First entry whose magnitude does not exceed `value`.
    #[must_use]
    pub fn largest_at_most(&self, value: f64) -> Option<&ScaleEntry> {
        self.entries
            .iter()
            .find(|entry| entry.magnitude > 0.0 && entry.magnitude <= value)
    }
}

impl Serialize for ScaleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: BTreeMap<&str, f64> = self
            .entries
            .iter()
            .map(|entry| (entry.suffix.as_str(), entry.magnitude))
            .collect();
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ScaleTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Self::build(raw).map_err(serde::de::Error::custom)
    }
}
