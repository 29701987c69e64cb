//! Creative configuration
//!
//! Everything a playable needs is declared up front and validated before a
//! session starts. A config that passes `validate()` cannot fail mid-session.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::jackpot::{JackpotConfig, JackpotTier, MIN_TICK};
use crate::script::{ResultScript, ScriptedOutcome};
use crate::symbols::{BonusLabel, SymbolCatalog};
use crate::timing::{SettleMode, TimingConfig};

/// Reel grid and strip geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelLayout {
    /// Number of main reels (columns)
    pub reels: u8,
    /// Visible rows per reel (odd, target lands on the middle row)
    pub rows: u8,
    /// Symbol cell height (px)
    pub symbol_height_px: f64,
    /// Random padding cells on the first reel
    pub padding_base: usize,
    /// Extra padding cells per subsequent reel
    pub padding_step: usize,
    /// Bonus reel cell height (px)
    pub bonus_item_height_px: f64,
    /// Full passes over the label ring before landing
    pub bonus_loops: usize,
    /// Labels appended below the bonus target
    pub bonus_tail: usize,
}

impl ReelLayout {
    /// Standard 5×3 grid
    pub fn standard_5x3() -> Self {
        Self {
            reels: 5,
            rows: 3,
            symbol_height_px: 80.0,
            padding_base: 20,
            padding_step: 2,
            bonus_item_height_px: 50.0,
            bonus_loops: 3,
            bonus_tail: 2,
        }
    }

    /// Height of the reel window (px)
    pub fn viewport_height_px(&self) -> f64 {
        self.rows as f64 * self.symbol_height_px
    }

    /// Main reels plus the bonus reel
    pub fn settle_count(&self) -> usize {
        self.reels as usize + 1
    }
}

impl Default for ReelLayout {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Credits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Balance at session start
    pub initial_balance: i64,
    /// Deducted when a spin is accepted
    pub spin_cost: i64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            initial_balance: 1000,
            spin_cost: 10,
        }
    }
}

/// Complete playable definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreativeConfig {
    /// Creative name (logging only)
    pub name: String,
    pub layout: ReelLayout,
    pub economy: EconomyConfig,
    pub timing: TimingConfig,
    pub jackpot: JackpotConfig,
    pub symbols: SymbolCatalog,
    /// Bonus reel label ring
    pub bonus_labels: Vec<BonusLabel>,
    /// Scripted outcomes in play order
    pub script: Vec<ScriptedOutcome>,
}

impl CreativeConfig {
    /// Egyptian-themed three-spin creative ending on GRAND
    pub fn ancient_treasures() -> Self {
        Self {
            name: "Ancient Treasures".into(),
            layout: ReelLayout::default(),
            economy: EconomyConfig::default(),
            timing: TimingConfig::default(),
            jackpot: JackpotConfig::default(),
            symbols: SymbolCatalog::ancient_treasures(),
            bonus_labels: BonusLabel::default_set(),
            script: ResultScript::ancient_treasures_outcomes(),
        }
    }

    /// Replace the timing block
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let config = match extension.as_str() {
            "json" => Self::from_json(&text)?,
            "yaml" | "yml" => Self::from_yaml(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        log::info!("Loaded creative '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Check every invariant the session relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_layout()?;
        self.validate_economy()?;
        self.validate_timing()?;
        self.validate_jackpot()?;

        if self.symbols.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if let Some(id) = self.symbols.first_duplicate() {
            return Err(ConfigError::DuplicateSymbol(id));
        }
        if self.bonus_labels.is_empty() {
            return Err(ConfigError::EmptyLabelSet);
        }

        self.build_script().map(|_| ())
    }

    /// Validated result script
    pub fn build_script(&self) -> Result<ResultScript, ConfigError> {
        ResultScript::new(
            self.script.clone(),
            self.layout.reels,
            &self.symbols,
            &self.bonus_labels,
        )
    }

    fn validate_layout(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        if layout.reels == 0 {
            return Err(ConfigError::InvalidLayout("at least one reel required".into()));
        }
        if layout.rows == 0 || layout.rows % 2 == 0 {
            return Err(ConfigError::InvalidLayout(format!(
                "row count must be odd, got {}",
                layout.rows
            )));
        }
        if !(layout.symbol_height_px > 0.0 && layout.bonus_item_height_px > 0.0) {
            return Err(ConfigError::InvalidLayout("cell heights must be positive".into()));
        }
        if layout.bonus_loops == 0 {
            return Err(ConfigError::InvalidLayout("bonus reel needs at least one loop".into()));
        }
        Ok(())
    }

    fn validate_economy(&self) -> Result<(), ConfigError> {
        if self.economy.spin_cost < 0 {
            return Err(ConfigError::InvalidEconomy(format!(
                "negative spin cost {}",
                self.economy.spin_cost
            )));
        }
        Ok(())
    }

    fn validate_timing(&self) -> Result<(), ConfigError> {
        for (field, value) in self.timing.durations() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTiming { field, value });
            }
        }

        if self.timing.settle_mode == SettleMode::FixedTimer {
            let longest_ms = self.timing.longest_animation_ms(self.layout.reels);
            if self.timing.settle_timer_ms <= longest_ms {
                return Err(ConfigError::SettleTimerTooShort {
                    timer_ms: self.timing.settle_timer_ms,
                    longest_ms,
                });
            }
        }
        Ok(())
    }

    fn validate_jackpot(&self) -> Result<(), ConfigError> {
        let jackpot = &self.jackpot;
        let min_ms = MIN_TICK.as_secs_f64() * 1000.0;
        if !(jackpot.tick_interval_ms.is_finite() && jackpot.tick_interval_ms >= min_ms) {
            return Err(ConfigError::InvalidJackpot(format!(
                "tick interval must be at least {}ms, got {}",
                min_ms, jackpot.tick_interval_ms
            )));
        }
        for tier in JackpotTier::ALL {
            let start = jackpot.start_values.get(tier);
            let increment = jackpot.increments.get(tier);
            if !(start.is_finite() && start >= 0.0) {
                return Err(ConfigError::InvalidJackpot(format!(
                    "{} start value {}",
                    tier.display_name(),
                    start
                )));
            }
            if !(increment.is_finite() && increment > 0.0) {
                return Err(ConfigError::InvalidJackpot(format!(
                    "{} increment must be positive, got {}",
                    tier.display_name(),
                    increment
                )));
            }
        }
        Ok(())
    }
}

impl Default for CreativeConfig {
    fn default() -> Self {
        Self::ancient_treasures()
    }
}

/// Configuration errors (raised at load time, never mid-session)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported config format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Result script is empty")]
    EmptyScript,

    #[error("Outcome {index}: expected {expected} reel stops, got {actual}")]
    ReelStopCount {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Outcome {index}: unknown symbol {symbol}")]
    UnknownSymbol { index: usize, symbol: u32 },

    #[error("Outcome {index}: bonus target {label} is not in the label set")]
    UnknownBonusTarget { index: usize, label: String },

    #[error("Symbol catalog is empty")]
    EmptyCatalog,

    #[error("Duplicate symbol id {0}")]
    DuplicateSymbol(u32),

    #[error("Bonus label set is empty")]
    EmptyLabelSet,

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid timing: {field} = {value}")]
    InvalidTiming { field: &'static str, value: f64 },

    #[error("Settle timer {timer_ms}ms does not outlast the slowest reel ({longest_ms}ms)")]
    SettleTimerTooShort { timer_ms: f64, longest_ms: f64 },

    #[error("Invalid jackpot config: {0}")]
    InvalidJackpot(String),

    #[error("Invalid economy: {0}")]
    InvalidEconomy(String),
}
