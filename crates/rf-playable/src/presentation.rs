//! Read-only view of a session for the presentation layer

use std::fmt;

use serde::Serialize;

use crate::controller::GameState;
use crate::jackpot::{JackpotPool, JackpotTier};
use crate::reel::{LabelMotion, SymbolMotion};
use crate::script::ScriptedOutcome;
use crate::symbols::BonusLabel;

/// One main reel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReelView {
    pub reel_index: u8,
    /// Center-row target of the current or last spin
    pub target_symbol: Option<u32>,
    /// Spin trigger: true while the reel is in motion
    pub spinning: bool,
    /// Resting window, top to bottom
    pub visible: Vec<u32>,
    /// Motion plan of the current or last spin
    pub motion: Option<SymbolMotion>,
}

/// The vertical bonus reel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusReelView {
    pub target_label: Option<BonusLabel>,
    pub spinning: bool,
    pub motion: Option<LabelMotion>,
}

/// Published after every applied transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: GameState,
    pub spin_index: u64,
    pub balance: i64,
    pub last_win: u64,
    pub jackpots: JackpotPool,
    pub active_outcome: Option<ScriptedOutcome>,
    pub reels: Vec<ReelView>,
    pub bonus_reel: BonusReelView,
}

impl Snapshot {
    /// Spin button enabled
    pub fn can_spin(&self) -> bool {
        self.state == GameState::Idle
    }

    /// End-card overlay (and its download button) visible
    pub fn show_end_card(&self) -> bool {
        self.state == GameState::EndCard
    }

    pub fn is_loading(&self) -> bool {
        self.state == GameState::Loading
    }

    pub fn any_reel_spinning(&self) -> bool {
        self.bonus_reel.spinning || self.reels.iter().any(|r| r.spinning)
    }

    /// Center row of the main grid
    pub fn payline(&self) -> Vec<u32> {
        self.reels
            .iter()
            .filter_map(|r| r.visible.get(r.visible.len() / 2).copied())
            .collect()
    }

    pub fn status_line(&self) -> StatusLine<'_> {
        StatusLine(self)
    }
}

/// One-line textual HUD: win, credits, jackpot ticker
pub struct StatusLine<'a>(&'a Snapshot);

impl fmt::Display for StatusLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        write!(
            f,
            "{:?} | WIN ${} | CREDITS ${}",
            snapshot.state,
            group_thousands(snapshot.last_win as i64),
            group_thousands(snapshot.balance)
        )?;
        for tier in JackpotTier::ALL {
            // Display floors the pool, like the ticker readout
            let value = snapshot.jackpots.get(tier).floor() as i64;
            write!(f, " | {} {}", tier.display_name(), group_thousands(value))?;
        }
        Ok(())
    }
}

/// `1234567` → `1,234,567`
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
