//! Session runtime — cooperative event loop around the spin controller
//!
//! One tokio task owns the `SpinSession` and handles events strictly one at
//! a time. Timers and simulated reel transitions are spawned into a
//! `JoinSet` that lives and dies with the session; they only post events
//! back into the inbox. The jackpot ticker runs beside it on its own pool;
//! each tick is folded into the published snapshot.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::config::{ConfigError, CreativeConfig};
use crate::controller::{
    Effect, GameState, ReelSlot, SessionEvent, SpinController, SpinSession, Transition,
};
use crate::jackpot::{JackpotPool, JackpotTicker, SharedPool};
use crate::platform::{AdPlatform, LoggingAdPlatform};
use crate::presentation::{BonusReelView, ReelView, Snapshot};
use crate::reel::{BonusReelAnimator, LabelMotion, ReelAnimator, SymbolMotion};
use crate::script::ScriptedOutcome;
use crate::timing::{TimingConfig, millis};

/// Session runtime errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session is closed")]
    Closed,

    #[error("Session task failed: {0}")]
    Task(String),
}

/// Final tallies, returned on shutdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub state: GameState,
    pub spins: u64,
    pub balance: i64,
    pub last_win: u64,
    pub end_card_shown: bool,
    pub download_taps: u32,
}

/// Inbox message; shutdown is ordered behind queued taps
#[derive(Debug, Clone, Copy)]
enum Inbound {
    Event(SessionEvent),
    Shutdown,
}

/// Session builder
pub struct SessionBuilder {
    config: CreativeConfig,
    platform: Arc<dyn AdPlatform>,
    seed: Option<u64>,
}

impl SessionBuilder {
    pub fn new(config: CreativeConfig) -> Self {
        Self {
            config,
            platform: Arc::new(LoggingAdPlatform),
            seed: None,
        }
    }

    /// Ad-platform callbacks
    pub fn platform(mut self, platform: Arc<dyn AdPlatform>) -> Self {
        self.platform = platform;
        self
    }

    /// Seed strip randomization for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the config and spawn the session (requires a tokio runtime)
    pub fn start(self) -> Result<PlayableSession, ConfigError> {
        let controller = SpinController::from_config(&self.config)?;
        let session = controller.new_session();
        let ticker = JackpotTicker::start(&self.config.jackpot);

        let layout = &self.config.layout;
        let reels: Vec<ReelAnimator> = (0..layout.reels)
            .map(|i| ReelAnimator::new(i, layout, &self.config.symbols))
            .collect();
        let bonus = BonusReelAnimator::new(self.config.bonus_labels.clone(), layout);

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (owner_tx, owner_rx) = oneshot::channel();

        let mut event_loop = EventLoop {
            timing: self.config.timing.clone(),
            motions: vec![None; reels.len()],
            bonus_motion: None,
            reels,
            bonus,
            controller,
            session,
            platform: self.platform,
            rng: self
                .seed
                .map(StdRng::seed_from_u64)
                .unwrap_or_else(StdRng::from_os_rng),
            pool: ticker.pool(),
            snapshots: watch::Sender::new(initial_snapshot(ticker.snapshot())),
            inbox_tx: inbox_tx.clone(),
            timers: JoinSet::new(),
            end_card_shown: false,
            download_taps: 0,
        };
        event_loop.publish();
        let snapshots = event_loop.snapshots.subscribe();

        log::info!(
            "[Session] Starting '{}' ({} scripted spins, {:?} timing)",
            self.config.name,
            self.config.script.len(),
            self.config.timing.profile
        );

        let jackpots = ticker.subscribe();
        let task = tokio::spawn(event_loop.run(inbox_rx, jackpots, owner_rx));

        Ok(PlayableSession {
            handle: SessionHandle { inbox: inbox_tx },
            snapshots,
            owner_tx,
            task,
            ticker,
        })
    }
}

/// Placeholder until the event loop publishes its first real snapshot
fn initial_snapshot(jackpots: JackpotPool) -> Snapshot {
    Snapshot {
        state: GameState::Loading,
        spin_index: 0,
        balance: 0,
        last_win: 0,
        jackpots,
        active_outcome: None,
        reels: Vec::new(),
        bonus_reel: BonusReelView {
            target_label: None,
            spinning: false,
            motion: None,
        },
    }
}

/// Cloneable inbound handle, the only way user intent reaches a session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inbox: mpsc::UnboundedSender<Inbound>,
}

impl SessionHandle {
    /// Spin tap (ignored unless the game is idle)
    pub fn request_spin(&self) -> Result<(), SessionError> {
        self.send(SessionEvent::SpinRequested)
    }

    /// End-card call-to-action tap
    pub fn tap_download(&self) -> Result<(), SessionError> {
        self.send(SessionEvent::DownloadTapped)
    }

    fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.inbox
            .send(Inbound::Event(event))
            .map_err(|_| SessionError::Closed)
    }
}

/// A running playable
pub struct PlayableSession {
    handle: SessionHandle,
    snapshots: watch::Receiver<Snapshot>,
    /// Dropped with the session; stops the loop if `shutdown` never ran
    owner_tx: oneshot::Sender<()>,
    task: JoinHandle<SessionSummary>,
    ticker: JackpotTicker,
}

impl PlayableSession {
    /// Start with defaults for platform and seed
    pub fn start(config: CreativeConfig) -> Result<Self, ConfigError> {
        SessionBuilder::new(config).start()
    }

    pub fn builder(config: CreativeConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn request_spin(&self) -> Result<(), SessionError> {
        self.handle.request_spin()
    }

    pub fn tap_download(&self) -> Result<(), SessionError> {
        self.handle.tap_download()
    }

    /// Snapshot stream
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Live jackpot values
    pub fn jackpots(&self) -> JackpotPool {
        self.ticker.snapshot()
    }

    /// Jackpot values alone, updated on every tick
    pub fn subscribe_jackpots(&self) -> watch::Receiver<JackpotPool> {
        self.ticker.subscribe()
    }

    /// Wait until the session publishes a snapshot in `state`
    pub async fn wait_for_state(&self, state: GameState) -> Result<Snapshot, SessionError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.state == state)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Handle queued taps, then stop the loop, pending timers and the ticker
    pub async fn shutdown(self) -> Result<SessionSummary, SessionError> {
        let Self {
            handle,
            owner_tx,
            task,
            ticker,
            ..
        } = self;

        let _ = handle.inbox.send(Inbound::Shutdown);
        let summary = task.await.map_err(|e| SessionError::Task(e.to_string()))?;
        drop(owner_tx);
        ticker.stop().await;

        log::info!(
            "[Session] Closed after {} spins in {:?}, balance {}",
            summary.spins,
            summary.state,
            summary.balance
        );
        Ok(summary)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOOP
// ═══════════════════════════════════════════════════════════════════════════════

struct EventLoop {
    controller: SpinController,
    session: SpinSession,
    timing: TimingConfig,
    reels: Vec<ReelAnimator>,
    bonus: BonusReelAnimator,
    motions: Vec<Option<SymbolMotion>>,
    bonus_motion: Option<LabelMotion>,
    platform: Arc<dyn AdPlatform>,
    rng: StdRng,
    pool: SharedPool,
    snapshots: watch::Sender<Snapshot>,
    inbox_tx: mpsc::UnboundedSender<Inbound>,
    timers: JoinSet<()>,
    end_card_shown: bool,
    download_taps: u32,
}

impl EventLoop {
    async fn run(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<Inbound>,
        mut jackpots: watch::Receiver<JackpotPool>,
        mut owner_rx: oneshot::Receiver<()>,
    ) -> SessionSummary {
        for effect in self.controller.boot(&self.session) {
            self.run_effect(effect);
        }

        loop {
            tokio::select! {
                biased;
                // PlayableSession dropped without shutdown
                _ = &mut owner_rx => break,
                Some(message) = inbox.recv() => match message {
                    Inbound::Event(event) => {
                        self.dispatch(event);
                        while self.timers.try_join_next().is_some() {}
                    }
                    Inbound::Shutdown => break,
                },
                Ok(()) = jackpots.changed() => {
                    let pool = *jackpots.borrow_and_update();
                    self.snapshots.send_modify(|snapshot| snapshot.jackpots = pool);
                }
            }
        }

        let pending = self.timers.len();
        self.timers.abort_all();
        if pending > 0 {
            log::debug!("[Session] Cancelled {} pending timers", pending);
        }

        SessionSummary {
            state: self.session.state(),
            spins: self.session.spin_index(),
            balance: self.session.balance(),
            last_win: self.session.last_win(),
            end_card_shown: self.end_card_shown,
            download_taps: self.download_taps,
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        if let SessionEvent::ReelSettled { slot, spin_id } = event {
            if !self.finish_reel(slot, spin_id) {
                log::debug!("[Session] Dropped completion {:?} for spin {}", slot, spin_id);
                return;
            }
        }

        let before = self.session.state();
        match self.controller.transition(&mut self.session, event) {
            Transition::Rejected(reason) => {
                log::debug!("[Session] {:?} ignored: {}", event, reason);
            }
            Transition::Applied(effects) => {
                let after = self.session.state();
                if before != after {
                    log::info!("[Session] {:?} -> {:?}", before, after);
                }
                for effect in effects {
                    self.run_effect(effect);
                }
                self.publish();
            }
        }
    }

    fn finish_reel(&mut self, slot: ReelSlot, spin_id: u64) -> bool {
        match slot {
            ReelSlot::Main(i) => self
                .reels
                .get_mut(i as usize)
                .is_some_and(|reel| reel.finish(spin_id)),
            ReelSlot::Bonus => self.bonus.finish(spin_id),
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Schedule { event, after } => self.schedule(event, after),
            Effect::StartReels { spin_id, outcome } => self.start_reels(spin_id, &outcome),
            Effect::NotifyReady => self.platform.notify_ready(),
            Effect::NotifyEndCard => {
                self.end_card_shown = true;
                self.platform.notify_end_card();
            }
            Effect::NotifyDownloadIntent => {
                self.download_taps += 1;
                self.platform.notify_download_intent();
            }
        }
    }

    fn schedule(&mut self, event: SessionEvent, after: Duration) {
        let tx = self.inbox_tx.clone();
        self.timers.spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the session already shut down
            let _ = tx.send(Inbound::Event(event));
        });
    }

    /// Trigger every animator and simulate its transition end
    fn start_reels(&mut self, spin_id: u64, outcome: &ScriptedOutcome) {
        log::info!(
            "[Session] Spin {}: {:?} win {} bonus {}{}",
            spin_id,
            outcome.reel_stops,
            outcome.win_amount,
            outcome.bonus_target,
            if outcome.is_jackpot { " (JACKPOT)" } else { "" }
        );

        let mut completions = Vec::with_capacity(self.reels.len() + 1);

        for ((reel, slot), &target) in self
            .reels
            .iter_mut()
            .zip(self.motions.iter_mut())
            .zip(&outcome.reel_stops)
        {
            let motion = reel.start_spin(spin_id, target, &self.timing, &mut self.rng);
            completions.push((
                SessionEvent::ReelSettled {
                    slot: ReelSlot::Main(reel.reel_index()),
                    spin_id,
                },
                millis(motion.total_ms()),
            ));
            *slot = Some(motion);
        }

        let motion = self.bonus.start_spin(spin_id, outcome.bonus_target, &self.timing);
        completions.push((
            SessionEvent::ReelSettled {
                slot: ReelSlot::Bonus,
                spin_id,
            },
            millis(motion.total_ms()),
        ));
        self.bonus_motion = Some(motion);

        for (event, after) in completions {
            self.schedule(event, after);
        }
    }

    fn publish(&self) {
        let reels = self
            .reels
            .iter()
            .zip(&self.motions)
            .map(|(reel, motion)| ReelView {
                reel_index: reel.reel_index(),
                target_symbol: motion.as_ref().map(|m| *m.target()),
                spinning: reel.is_spinning(),
                visible: reel.visible().to_vec(),
                motion: motion.clone(),
            })
            .collect();

        let snapshot = Snapshot {
            state: self.session.state(),
            spin_index: self.session.spin_index(),
            balance: self.session.balance(),
            last_win: self.session.last_win(),
            jackpots: *self.pool.read(),
            active_outcome: self.session.active_outcome().cloned(),
            reels,
            bonus_reel: BonusReelView {
                target_label: self.bonus_motion.as_ref().map(|m| *m.target()),
                spinning: self.bonus.is_spinning(),
                motion: self.bonus_motion.clone(),
            },
        };
        self.snapshots.send_replace(snapshot);
    }
}
