//! Progressive jackpot display pools
//!
//! Four tiers accumulate on a wall-clock ticker, independent of the spin
//! state machine. The core never decrements a pool.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::timing::millis;

/// Jackpot tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JackpotTier {
    Mini,
    Minor,
    Major,
    Grand,
}

impl JackpotTier {
    /// All tiers, lowest first
    pub const ALL: [JackpotTier; 4] = [Self::Mini, Self::Minor, Self::Major, Self::Grand];

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mini => "MINI",
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Grand => "GRAND",
        }
    }

    /// Parse a display name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.display_name().eq_ignore_ascii_case(name))
    }

    /// Display colour (hex)
    pub fn color(&self) -> &'static str {
        match self {
            Self::Mini => "#4CAF50",
            Self::Minor => "#2196F3",
            Self::Major => "#9C27B0",
            Self::Grand => "#F44336",
        }
    }
}

/// One value per tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TierValues {
    pub mini: f64,
    pub minor: f64,
    pub major: f64,
    pub grand: f64,
}

impl TierValues {
    pub fn get(&self, tier: JackpotTier) -> f64 {
        match tier {
            JackpotTier::Mini => self.mini,
            JackpotTier::Minor => self.minor,
            JackpotTier::Major => self.major,
            JackpotTier::Grand => self.grand,
        }
    }

    pub fn get_mut(&mut self, tier: JackpotTier) -> &mut f64 {
        match tier {
            JackpotTier::Mini => &mut self.mini,
            JackpotTier::Minor => &mut self.minor,
            JackpotTier::Major => &mut self.major,
            JackpotTier::Grand => &mut self.grand,
        }
    }

    /// Iterate `(tier, value)` lowest tier first
    pub fn iter(&self) -> impl Iterator<Item = (JackpotTier, f64)> + '_ {
        JackpotTier::ALL.into_iter().map(|t| (t, self.get(t)))
    }
}

/// Jackpot system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JackpotConfig {
    /// Pool values at session start
    pub start_values: TierValues,
    /// Amount added to each pool per tick
    pub increments: TierValues,
    /// Tick period (ms)
    pub tick_interval_ms: f64,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            start_values: TierValues {
                mini: 100.0,
                minor: 500.0,
                major: 2000.0,
                grand: 10000.0,
            },
            increments: TierValues {
                mini: 0.01,
                minor: 0.05,
                major: 0.1,
                grand: 0.5,
            },
            tick_interval_ms: 100.0,
        }
    }
}

/// Current pool values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JackpotPool {
    pub values: TierValues,
    /// Ticks applied since start
    pub ticks: u64,
}

impl JackpotPool {
    pub fn new(start_values: TierValues) -> Self {
        Self {
            values: start_values,
            ticks: 0,
        }
    }

    pub fn get(&self, tier: JackpotTier) -> f64 {
        self.values.get(tier)
    }

    /// Apply one tick of increments
    pub fn tick(&mut self, increments: &TierValues) {
        for tier in JackpotTier::ALL {
            *self.values.get_mut(tier) += increments.get(tier);
        }
        self.ticks += 1;
    }
}

/// Pool shared between the ticker task and readers
pub type SharedPool = Arc<RwLock<JackpotPool>>;

/// Shortest tick period
pub const MIN_TICK: Duration = Duration::from_millis(1);

// ═══════════════════════════════════════════════════════════════════════════════
// TICKER
// ═══════════════════════════════════════════════════════════════════════════════

/// Recurring task that grows the jackpot pools
///
/// Must be started from within a tokio runtime. Every tick is published on
/// a watch channel. Dropping the ticker aborts the task; `stop()` shuts it
/// down and waits for it.
pub struct JackpotTicker {
    pool: SharedPool,
    updates: watch::Receiver<JackpotPool>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl JackpotTicker {
    /// Spawn the ticker
    ///
    /// Intervals under 1 ms (or not finite) tick every millisecond;
    /// validated configs never contain them.
    pub fn start(config: &JackpotConfig) -> Self {
        let initial = JackpotPool::new(config.start_values);
        let pool: SharedPool = Arc::new(RwLock::new(initial));
        let (updates_tx, updates) = watch::channel(initial);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let period = millis(config.tick_interval_ms).max(MIN_TICK);
        let increments = config.increments;
        let task_pool = Arc::clone(&pool);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = interval.tick() => {
                        let current = {
                            let mut pool = task_pool.write();
                            pool.tick(&increments);
                            *pool
                        };
                        updates_tx.send_replace(current);
                    }
                }
            }
            log::debug!("[Ticker] Stopped after {} ticks", task_pool.read().ticks);
        });

        log::debug!("[Ticker] Started ({:?} period)", period);

        Self {
            pool,
            updates,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Shared pool handle
    pub fn pool(&self) -> SharedPool {
        Arc::clone(&self.pool)
    }

    /// Pool values, updated on every tick
    pub fn subscribe(&self) -> watch::Receiver<JackpotPool> {
        self.updates.clone()
    }

    /// Copy of the current values
    pub fn snapshot(&self) -> JackpotPool {
        *self.pool.read()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop ticking and wait for the task to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::warn!("[Ticker] Task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for JackpotTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tier_names() {
        assert_eq!(JackpotTier::from_name("grand"), Some(JackpotTier::Grand));
        assert_eq!(JackpotTier::from_name("MINI"), Some(JackpotTier::Mini));
        assert_eq!(JackpotTier::from_name("mega"), None);
        assert!(JackpotTier::Mini < JackpotTier::Grand);
    }

    #[test]
    fn test_pool_tick() {
        let config = JackpotConfig::default();
        let mut pool = JackpotPool::new(config.start_values);

        for _ in 0..10 {
            pool.tick(&config.increments);
        }

        assert_eq!(pool.ticks, 10);
        assert_relative_eq!(pool.get(JackpotTier::Mini), 100.1, epsilon = 1e-9);
        assert_relative_eq!(pool.get(JackpotTier::Grand), 10005.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pool_strictly_increasing() {
        let config = JackpotConfig::default();
        let mut pool = JackpotPool::new(config.start_values);

        for _ in 0..1000 {
            let before = pool;
            pool.tick(&config.increments);
            for tier in JackpotTier::ALL {
                assert!(pool.get(tier) > before.get(tier));
            }
        }
    }

    #[test]
    fn test_tier_values_serde_keys() {
        let json = serde_json::to_value(JackpotConfig::default().start_values).unwrap();
        assert_eq!(json["GRAND"], 10000.0);
        assert_eq!(json["MINI"], 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_runs_and_stops() {
        let ticker = JackpotTicker::start(&JackpotConfig::default());
        let pool = ticker.pool();

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let ticks = pool.read().ticks;
        assert!(ticks >= 9, "expected ~10 ticks, got {}", ticks);
        assert!(ticker.is_running());

        ticker.stop().await;
        let after_stop = pool.read().ticks;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(pool.read().ticks, after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_publishes_every_tick() {
        let ticker = JackpotTicker::start(&JackpotConfig::default());
        let mut updates = ticker.subscribe();
        assert_eq!(updates.borrow_and_update().ticks, 0);

        let mut previous = JackpotConfig::default().start_values.grand;
        for expected in 1..=5 {
            updates.changed().await.unwrap();
            let pool = *updates.borrow_and_update();
            assert_eq!(pool.ticks, expected);
            assert!(pool.get(JackpotTier::Grand) > previous);
            previous = pool.get(JackpotTier::Grand);
        }

        ticker.stop().await;
        assert!(updates.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_degenerate_interval_does_not_panic() {
        for interval in [0.0, 0.25, f64::INFINITY, f64::NAN] {
            let config = JackpotConfig {
                tick_interval_ms: interval,
                ..JackpotConfig::default()
            };
            let ticker = JackpotTicker::start(&config);
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(ticker.snapshot().ticks >= 5);
            ticker.stop().await;
        }
    }
}
