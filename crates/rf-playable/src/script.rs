//! Result script — the predetermined spin outcomes
//!
//! A playable never rolls dice: every spin plays the next entry of a fixed,
//! validated script. Once the script is exhausted the last entry repeats
//! forever, so the creative always ends in its final state.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::jackpot::JackpotTier;
use crate::symbols::{BonusLabel, SymbolCatalog};

/// A single scripted spin result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedOutcome {
    /// Center-row symbol for each reel, left to right
    pub reel_stops: Vec<u32>,
    /// Credits paid once the reels settle
    pub win_amount: u64,
    /// Escalate to the end-card after this spin
    #[serde(default)]
    pub is_jackpot: bool,
    /// Label the bonus reel lands on
    pub bonus_target: BonusLabel,
}

impl ScriptedOutcome {
    pub fn new(reel_stops: &[u32], win_amount: u64, bonus_target: BonusLabel) -> Self {
        Self {
            reel_stops: reel_stops.to_vec(),
            win_amount,
            is_jackpot: false,
            bonus_target,
        }
    }

    /// Mark as the jackpot (end-card) outcome
    pub fn jackpot(mut self) -> Self {
        self.is_jackpot = true;
        self
    }
}

/// Ordered, read-only outcome sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultScript {
    outcomes: Vec<ScriptedOutcome>,
}

impl ResultScript {
    /// Validate outcomes against the reel layout, catalog and label set
    pub fn new(
        outcomes: Vec<ScriptedOutcome>,
        reel_count: u8,
        catalog: &SymbolCatalog,
        labels: &[BonusLabel],
    ) -> Result<Self, ConfigError> {
        if outcomes.is_empty() {
            return Err(ConfigError::EmptyScript);
        }

        for (index, outcome) in outcomes.iter().enumerate() {
            if outcome.reel_stops.len() != reel_count as usize {
                return Err(ConfigError::ReelStopCount {
                    index,
                    expected: reel_count as usize,
                    actual: outcome.reel_stops.len(),
                });
            }
            if let Some(&symbol) = outcome.reel_stops.iter().find(|&&id| !catalog.contains(id)) {
                return Err(ConfigError::UnknownSymbol { index, symbol });
            }
            if !labels.contains(&outcome.bonus_target) {
                return Err(ConfigError::UnknownBonusTarget {
                    index,
                    label: outcome.bonus_target.to_string(),
                });
            }
        }

        Ok(Self { outcomes })
    }

    /// Three-spin narrative: small win, near-miss teaser, forced GRAND
    pub fn ancient_treasures_outcomes() -> Vec<ScriptedOutcome> {
        vec![
            ScriptedOutcome::new(&[1, 2, 1, 2, 1], 50, BonusLabel::Multiplier(2)),
            ScriptedOutcome::new(&[8, 8, 8, 8, 5], 200, BonusLabel::Multiplier(5)),
            ScriptedOutcome::new(
                &[101, 101, 101, 101, 101],
                15000,
                BonusLabel::Jackpot(JackpotTier::Grand),
            )
            .jackpot(),
        ]
    }

    /// Outcome for a spin index; past the end, the last entry repeats
    pub fn next_outcome(&self, spin_index: u64) -> &ScriptedOutcome {
        let last = self.outcomes.len() - 1;
        let index = usize::try_from(spin_index).map_or(last, |i| i.min(last));
        &self.outcomes[index]
    }

    /// Index of the first jackpot entry
    pub fn first_jackpot(&self) -> Option<usize> {
        self.outcomes.iter().position(|o| o.is_jackpot)
    }

    pub fn outcomes(&self) -> &[ScriptedOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Always false for a constructed script
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_script() -> ResultScript {
        ResultScript::new(
            ResultScript::ancient_treasures_outcomes(),
            5,
            &SymbolCatalog::default(),
            &BonusLabel::default_set(),
        )
        .unwrap()
    }

    #[test]
    fn test_in_bounds_lookup() {
        let script = default_script();
        assert_eq!(script.len(), 3);
        assert_eq!(script.next_outcome(0).win_amount, 50);
        assert_eq!(script.next_outcome(1).reel_stops, vec![8, 8, 8, 8, 5]);
        assert!(script.next_outcome(2).is_jackpot);
    }

    #[test]
    fn test_steady_state_after_exhaustion() {
        let script = default_script();
        let last = script.next_outcome(2).clone();
        for index in [3, 4, 10, 1_000, u64::MAX] {
            assert_eq!(script.next_outcome(index), &last);
        }
    }

    #[test]
    fn test_first_jackpot() {
        assert_eq!(default_script().first_jackpot(), Some(2));
    }

    #[test]
    fn test_rejects_empty_script() {
        let result = ResultScript::new(
            Vec::new(),
            5,
            &SymbolCatalog::default(),
            &BonusLabel::default_set(),
        );
        assert!(matches!(result, Err(ConfigError::EmptyScript)));
    }

    #[test]
    fn test_rejects_reel_count_mismatch() {
        let outcomes = vec![ScriptedOutcome::new(&[1, 2, 3], 0, BonusLabel::Multiplier(2))];
        let result = ResultScript::new(
            outcomes,
            5,
            &SymbolCatalog::default(),
            &BonusLabel::default_set(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::ReelStopCount {
                index: 0,
                expected: 5,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_rejects_unknown_symbol() {
        let outcomes = vec![
            ScriptedOutcome::new(&[1, 1, 1, 1, 1], 0, BonusLabel::Multiplier(2)),
            ScriptedOutcome::new(&[1, 1, 42, 1, 1], 0, BonusLabel::Multiplier(2)),
        ];
        let result = ResultScript::new(
            outcomes,
            5,
            &SymbolCatalog::default(),
            &BonusLabel::default_set(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::UnknownSymbol {
                index: 1,
                symbol: 42
            })
        ));
    }

    #[test]
    fn test_rejects_label_outside_set() {
        let outcomes = vec![ScriptedOutcome::new(&[1, 1, 1, 1, 1], 0, BonusLabel::Multiplier(7))];
        let result = ResultScript::new(
            outcomes,
            5,
            &SymbolCatalog::default(),
            &BonusLabel::default_set(),
        );
        assert!(matches!(result, Err(ConfigError::UnknownBonusTarget { index: 0, .. })));
    }
}
