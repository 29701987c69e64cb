//! Symbol catalog and bonus-reel labels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::jackpot::JackpotTier;

/// Symbol category (display grouping only, never affects payout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SymbolCategory {
    /// Card ranks (10, J, Q, K, A)
    Low = 0,
    /// Themed mid symbols
    Mid = 1,
    /// Premium symbols
    High = 2,
    /// Wild
    Wild = 3,
    /// Jackpot trigger
    Bonus = 4,
}

impl SymbolCategory {
    /// Special symbols are never used as filler next to a target
    pub fn is_special(&self) -> bool {
        matches!(self, Self::Wild | Self::Bonus)
    }
}

/// A symbol definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol ID
    pub id: u32,
    /// Category
    pub category: SymbolCategory,
}

impl Symbol {
    pub const fn new(id: u32, category: SymbolCategory) -> Self {
        Self { id, category }
    }
}

/// Immutable symbol catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
}

impl SymbolCatalog {
    /// Build a catalog from an explicit symbol list
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Ancient treasures set: card ranks, scarab and urn, eye/mummy/pyramid,
    /// plus wild (100) and crown bonus (101)
    pub fn ancient_treasures() -> Self {
        use SymbolCategory::*;
        Self::new(vec![
            Symbol::new(0, Low),
            Symbol::new(1, Low),
            Symbol::new(2, Low),
            Symbol::new(3, Low),
            Symbol::new(4, Low),
            Symbol::new(5, Mid),
            Symbol::new(6, Mid),
            Symbol::new(7, High),
            Symbol::new(8, High),
            Symbol::new(9, High),
            Symbol::new(100, Wild),
            Symbol::new(101, Bonus),
        ])
    }

    /// Get symbol by ID
    pub fn get(&self, id: u32) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Check membership
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// All symbol IDs in catalog order
    pub fn ids(&self) -> Vec<u32> {
        self.symbols.iter().map(|s| s.id).collect()
    }

    /// IDs of non-special symbols (filler candidates)
    pub fn filler_ids(&self) -> Vec<u32> {
        self.symbols
            .iter()
            .filter(|s| !s.category.is_special())
            .map(|s| s.id)
            .collect()
    }

    /// First duplicated ID, if any
    pub fn first_duplicate(&self) -> Option<u32> {
        self.symbols.iter().enumerate().find_map(|(i, s)| {
            self.symbols[..i].iter().any(|o| o.id == s.id).then_some(s.id)
        })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::ancient_treasures()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BONUS LABELS
// ═══════════════════════════════════════════════════════════════════════════════

/// Label shown on the vertical bonus reel
///
/// Serialized as its display text (`"x5"`, `"GRAND"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BonusLabel {
    /// Win multiplier
    Multiplier(u32),
    /// Jackpot tier award
    Jackpot(JackpotTier),
}

impl BonusLabel {
    /// Default label ring: multipliers interleaved with tiers
    pub fn default_set() -> Vec<BonusLabel> {
        vec![
            Self::Multiplier(2),
            Self::Jackpot(JackpotTier::Mini),
            Self::Multiplier(3),
            Self::Jackpot(JackpotTier::Minor),
            Self::Multiplier(5),
            Self::Jackpot(JackpotTier::Major),
            Self::Multiplier(10),
            Self::Jackpot(JackpotTier::Grand),
        ]
    }
}

impl fmt::Display for BonusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multiplier(n) => write!(f, "x{}", n),
            Self::Jackpot(tier) => f.write_str(tier.display_name()),
        }
    }
}

/// Unparseable bonus label text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown bonus label: {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for BonusLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(tier) = JackpotTier::from_name(s) {
            return Ok(Self::Jackpot(tier));
        }
        s.strip_prefix('x')
            .or_else(|| s.strip_prefix('X'))
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(Self::Multiplier)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl TryFrom<String> for BonusLabel {
    type Error = UnknownLabel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BonusLabel> for String {
    fn from(label: BonusLabel) -> Self {
        label.to_string()
    }
}
