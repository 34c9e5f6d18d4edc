//! Rune records and the bonus effects they grant per acquisition.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Cost of a rune that is bought with something other than production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialCost {
    pub value: f64,
    pub unit: String,
}

/// How hard a rune is to obtain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Chance {
    /// Expected production units per copy ("1 in N").
    Odds(f64),
    /// Purchased with another currency; cannot be simulated.
    Special(SpecialCost),
}

impl Chance {
    /// Plain odds value when the rune can be simulated.
    #[must_use]
    pub const fn odds(&self) -> Option<f64> {
        match self {
            Self::Odds(odds) => Some(*odds),
            Self::Special(_) => None,
        }
    }
}

/// Stat a bonus modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetStat {
    RuneSpeed,
    RuneBulk,
    /// Any stat the rate simulation does not model (luck, walkspeed, ...).
    #[serde(other)]
    Other,
}

/// How a bonus combines with the current stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierKind {
    Additive,
    Multiplier,
    Subtractive,
    Power,
}

/// Bonus magnitude as shipped in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BonusAmount {
    Value(f64),
    /// Free-form description; never simulated.
    Label(String),
}

/// Per-acquisition effect granted by owning one more copy of a rune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusEffect {
    pub target_stat: TargetStat,
    pub modifier_kind: ModifierKind,
    pub magnitude: BonusAmount,
    #[serde(default)]
    pub cap: Option<f64>,
    #[serde(default)]
    pub is_exponential: bool,
    #[serde(default)]
    pub is_dual_exponential: bool,
}

impl BonusEffect {
    /// Plain multiplier bonus, the most common dataset shape.
    #[must_use]
    pub const fn multiplier(target_stat: TargetStat, magnitude: f64, cap: Option<f64>) -> Self {
        Self {
            target_stat,
            modifier_kind: ModifierKind::Multiplier,
            magnitude: BonusAmount::Value(magnitude),
            cap,
            is_exponential: false,
            is_dual_exponential: false,
        }
    }

    #[must_use]
    pub const fn new(target_stat: TargetStat, modifier_kind: ModifierKind, magnitude: f64) -> Self {
        Self {
            target_stat,
            modifier_kind,
            magnitude: BonusAmount::Value(magnitude),
            cap: None,
            is_exponential: false,
            is_dual_exponential: false,
        }
    }

    /// Numeric magnitude when the bonus can take part in rate simulation.
    #[must_use]
    pub fn numeric_magnitude(&self) -> Option<f64> {
        match self.magnitude {
            BonusAmount::Value(value) if value.is_finite() => Some(value),
            BonusAmount::Value(_) | BonusAmount::Label(_) => None,
        }
    }

    /// Either flavour of exponential growth flag.
    #[must_use]
    pub const fn is_compounding(&self) -> bool {
        self.is_exponential || self.is_dual_exponential
    }
}

/// A collectible rune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rune {
    pub name: String,
    #[serde(default)]
    pub source: String,
    pub chance: Chance,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub bonuses: Vec<BonusEffect>,
    #[serde(default)]
    pub max_count: Option<u64>,
}

impl Rune {
    /// Rune with plain odds and no bonuses (useful for tests and ad-hoc queries).
    #[must_use]
    pub fn with_odds(name: impl Into<String>, odds: f64) -> Self {
        Self {
            name: name.into(),
            source: String::new(),
            chance: Chance::Odds(odds),
            tags: BTreeSet::new(),
            bonuses: Vec::new(),
            max_count: None,
        }
    }

    #[must_use]
    pub fn with_bonus(mut self, bonus: BonusEffect) -> Self {
        self.bonuses.push(bonus);
        self
    }

    #[must_use]
    pub const fn is_simulatable(&self) -> bool {
        matches!(self.chance, Chance::Odds(_))
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rune_from_json_accepts_both_chance_shapes() {
        let json = r#"[
            {
                "name": "Polychrome",
                "source": "Color Pack",
                "chance": 2.5e9,
                "tags": ["color"],
                "bonuses": [
                    {"targetStat": "runeSpeed", "modifierKind": "multiplier", "magnitude": 1.1, "cap": 2.0},
                    {"targetStat": "luck", "modifierKind": "additive", "magnitude": 0.5}
                ],
                "maxCount": 1000
            },
            {"name": "Token", "chance": {"value": 250, "unit": "Tickets"}}
        ]"#;
        let runes: Vec<Rune> = serde_json::from_str(json).unwrap();
        assert_eq!(runes[0].chance.odds(), Some(2.5e9));
        assert_eq!(runes[0].max_count, Some(1000));
        assert_eq!(runes[0].bonuses[0].cap, Some(2.0));
        assert_eq!(runes[0].bonuses[1].target_stat, TargetStat::Other);
        assert!(runes[0].has_tag("COLOR"));
        assert!(!runes[1].is_simulatable());
        assert_eq!(
            runes[1].chance,
            Chance::Special(SpecialCost {
                value: 250.0,
                unit: "Tickets".to_string()
            })
        );
    }

    #[test]
    fn label_magnitudes_are_not_numeric() {
        let json = r#"{"targetStat": "runeSpeed", "modifierKind": "multiplier", "magnitude": "x2 while equipped"}"#;
        let bonus: BonusEffect = serde_json::from_str(json).unwrap();
        assert_eq!(bonus.numeric_magnitude(), None);

        let nan = BonusEffect::new(TargetStat::RuneBulk, ModifierKind::Additive, f64::NAN);
        assert_eq!(nan.numeric_magnitude(), None);
    }

    #[test]
    fn compounding_flag_covers_both_variants() {
        let mut bonus = BonusEffect::multiplier(TargetStat::RuneBulk, 1.02, None);
        assert!(!bonus.is_compounding());
        bonus.is_dual_exponential = true;
        assert!(bonus.is_compounding());
    }
}
