//! Spin controller — the session state machine
//!
//! ```text
//! Loading ──bootstrap──> Idle ──spin──> Spinning ──settled──> Idle
//!                                            │
//!                                            └─(jackpot)──> ResultHold ──hold──> EndCard
//! ```
//!
//! `SpinController::transition` is the only code that mutates a
//! `SpinSession`. It never sleeps or calls out: timers, animator triggers
//! and ad-platform calls are returned as `Effect`s for the runtime to run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, CreativeConfig, EconomyConfig};
use crate::script::{ResultScript, ScriptedOutcome};
use crate::timing::{SettleMode, TimingConfig, millis};

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Loading screen, not yet interactive
    Loading,
    /// Waiting for a spin tap
    Idle,
    /// Reels in motion
    Spinning,
    /// Jackpot amount on screen before the end-card
    ResultHold,
    /// End-card with the download call-to-action (terminal)
    EndCard,
}

/// Reel identity for completion signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReelSlot {
    Main(u8),
    Bonus,
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Loading delay elapsed
    BootstrapElapsed,
    /// User tapped spin
    SpinRequested,
    /// A reel finished its transition
    ReelSettled { slot: ReelSlot, spin_id: u64 },
    /// Fixed settle timer fired
    SettleTimerElapsed { spin_id: u64 },
    /// Result hold elapsed
    HoldElapsed { spin_id: u64 },
    /// User tapped the end-card call-to-action
    DownloadTapped,
}

/// Work requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Post `event` back into the session after `after`
    Schedule { event: SessionEvent, after: Duration },
    /// Spin every reel (and the bonus reel) to the outcome's targets
    StartReels { spin_id: u64, outcome: ScriptedOutcome },
    NotifyReady,
    NotifyEndCard,
    NotifyDownloadIntent,
}

/// Result of feeding one event
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Transition {
    /// Event ignored; session untouched
    Rejected(&'static str),
    /// Session updated; run these effects
    Applied(Vec<Effect>),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn effects(&self) -> &[Effect] {
        match self {
            Self::Applied(effects) => effects,
            Self::Rejected(_) => &[],
        }
    }
}

/// Completion barrier over all reels of one spin
#[derive(Debug, Clone, Default)]
struct SettleBarrier {
    spin_id: u64,
    settled: Vec<bool>,
}

impl SettleBarrier {
    fn arm(&mut self, spin_id: u64, reel_total: usize) {
        self.spin_id = spin_id;
        self.settled = vec![false; reel_total];
    }

    /// Record a completion; false for stale spins, unknown or repeated slots
    fn mark(&mut self, spin_id: u64, index: usize) -> bool {
        if spin_id != self.spin_id {
            return false;
        }
        match self.settled.get_mut(index) {
            Some(done) if !*done => {
                *done = true;
                true
            }
            _ => false,
        }
    }

    fn remaining(&self) -> usize {
        self.settled.iter().filter(|done| !**done).count()
    }

    fn is_complete(&self) -> bool {
        !self.settled.is_empty() && self.remaining() == 0
    }
}

/// Mutable session state
#[derive(Debug, Clone)]
pub struct SpinSession {
    state: GameState,
    spin_index: u64,
    balance: i64,
    last_win: u64,
    active_outcome: Option<ScriptedOutcome>,
    barrier: SettleBarrier,
}

impl SpinSession {
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Accepted spins so far
    pub fn spin_index(&self) -> u64 {
        self.spin_index
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn last_win(&self) -> u64 {
        self.last_win
    }

    pub fn active_outcome(&self) -> Option<&ScriptedOutcome> {
        self.active_outcome.as_ref()
    }

    /// Reels still in motion for the current spin
    pub fn reels_remaining(&self) -> usize {
        if self.state == GameState::Spinning {
            self.barrier.remaining()
        } else {
            0
        }
    }
}

/// The spin state machine
#[derive(Debug, Clone)]
pub struct SpinController {
    script: ResultScript,
    economy: EconomyConfig,
    timing: TimingConfig,
    reels: u8,
}

impl SpinController {
    /// Validate the config and build a controller
    pub fn from_config(config: &CreativeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            script: config.build_script()?,
            economy: config.economy.clone(),
            timing: config.timing.clone(),
            reels: config.layout.reels,
        })
    }

    pub fn script(&self) -> &ResultScript {
        &self.script
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Fresh session in `Loading`
    pub fn new_session(&self) -> SpinSession {
        SpinSession {
            state: GameState::Loading,
            spin_index: 0,
            balance: self.economy.initial_balance,
            last_win: 0,
            active_outcome: None,
            barrier: SettleBarrier::default(),
        }
    }

    /// Effects to run when the session starts
    pub fn boot(&self, session: &SpinSession) -> Vec<Effect> {
        if session.state != GameState::Loading {
            return Vec::new();
        }
        vec![Effect::Schedule {
            event: SessionEvent::BootstrapElapsed,
            after: millis(self.timing.bootstrap_delay_ms),
        }]
    }

    /// Apply one event
    pub fn transition(&self, session: &mut SpinSession, event: SessionEvent) -> Transition {
        use GameState::*;

        match (session.state, event) {
            (Loading, SessionEvent::BootstrapElapsed) => {
                session.state = Idle;
                Transition::Applied(vec![Effect::NotifyReady])
            }

            (Idle, SessionEvent::SpinRequested) => self.accept_spin(session),
            (_, SessionEvent::SpinRequested) => Transition::Rejected("spin requested while not idle"),

            (Spinning, SessionEvent::ReelSettled { slot, spin_id }) => {
                let Some(index) = self.slot_index(slot) else {
                    return Transition::Rejected("unknown reel");
                };
                if !session.barrier.mark(spin_id, index) {
                    return Transition::Rejected("stale or repeated reel completion");
                }
                if self.timing.settle_mode == SettleMode::Barrier && session.barrier.is_complete() {
                    self.settle(session)
                } else {
                    Transition::Applied(Vec::new())
                }
            }

            (Spinning, SessionEvent::SettleTimerElapsed { spin_id })
                if self.timing.settle_mode == SettleMode::FixedTimer
                    && spin_id == session.spin_index =>
            {
                self.settle(session)
            }

            (ResultHold, SessionEvent::HoldElapsed { spin_id }) if spin_id == session.spin_index => {
                session.state = EndCard;
                Transition::Applied(vec![Effect::NotifyEndCard])
            }

            (EndCard, SessionEvent::DownloadTapped) => {
                Transition::Applied(vec![Effect::NotifyDownloadIntent])
            }

            (_, SessionEvent::DownloadTapped) => Transition::Rejected("no end-card on screen"),
            _ => Transition::Rejected("event not valid in current state"),
        }
    }

    fn accept_spin(&self, session: &mut SpinSession) -> Transition {
        let outcome = self.script.next_outcome(session.spin_index).clone();

        session.balance = session.balance.saturating_sub(self.economy.spin_cost);
        session.last_win = 0;
        session.spin_index += 1;
        session.state = GameState::Spinning;
        session.active_outcome = Some(outcome.clone());

        let spin_id = session.spin_index;
        session.barrier.arm(spin_id, self.reels as usize + 1);

        let mut effects = vec![Effect::StartReels { spin_id, outcome }];
        if self.timing.settle_mode == SettleMode::FixedTimer {
            effects.push(Effect::Schedule {
                event: SessionEvent::SettleTimerElapsed { spin_id },
                after: millis(self.timing.settle_timer_ms),
            });
        }
        Transition::Applied(effects)
    }

    fn settle(&self, session: &mut SpinSession) -> Transition {
        let Some(outcome) = session.active_outcome.as_ref() else {
            return Transition::Rejected("no active outcome");
        };
        let win = outcome.win_amount;
        let is_jackpot = outcome.is_jackpot;

        session.balance = session
            .balance
            .saturating_add(i64::try_from(win).unwrap_or(i64::MAX));
        session.last_win = win;

        if is_jackpot {
            session.state = GameState::ResultHold;
            Transition::Applied(vec![Effect::Schedule {
                event: SessionEvent::HoldElapsed {
                    spin_id: session.spin_index,
                },
                after: millis(self.timing.result_hold_ms),
            }])
        } else {
            session.state = GameState::Idle;
            Transition::Applied(Vec::new())
        }
    }

    fn slot_index(&self, slot: ReelSlot) -> Option<usize> {
        match slot {
            ReelSlot::Main(i) if i < self.reels => Some(i as usize),
            ReelSlot::Main(_) => None,
            ReelSlot::Bonus => Some(self.reels as usize),
        }
    }

    /// All completion events for a spin, main reels first
    pub fn settle_events(&self, spin_id: u64) -> Vec<SessionEvent> {
        (0..self.reels)
            .map(ReelSlot::Main)
            .chain(std::iter::once(ReelSlot::Bonus))
            .map(|slot| SessionEvent::ReelSettled { slot, spin_id })
            .collect()
    }
}
