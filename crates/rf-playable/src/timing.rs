//! Timing profiles for the spin lifecycle

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Ad-creative timing as shipped
    Normal,
    /// Fast mode (half duration)
    Turbo,
    /// Studio mode (near-instant for previews and tests)
    Studio,
    /// Custom timing multiplier
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// How the controller decides that the reels have settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SettleMode {
    /// Advance once every reel (bonus included) reported completion
    #[default]
    Barrier,
    /// Advance on a fixed timer, ignoring reel completions
    FixedTimer,
}

/// Detailed timing configuration (all values in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Loading screen before the game becomes interactive
    pub bootstrap_delay_ms: f64,

    /// Render delay between strip construction and transition start
    pub transition_start_delay_ms: f64,

    /// Scroll duration of the first reel
    pub reel_spin_duration_ms: f64,

    /// Extra scroll time for each subsequent reel
    pub reel_stop_interval_ms: f64,

    /// Scroll duration of the bonus reel
    pub bonus_spin_duration_ms: f64,

    /// Settle gate
    pub settle_mode: SettleMode,

    /// Fixed settle timer (only used with `SettleMode::FixedTimer`)
    pub settle_timer_ms: f64,

    /// Pause on a jackpot result before the end-card
    pub result_hold_ms: f64,
}

impl TimingConfig {
    /// Normal timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            bootstrap_delay_ms: 1000.0,
            transition_start_delay_ms: 50.0,
            reel_spin_duration_ms: 2000.0,
            reel_stop_interval_ms: 200.0,
            bonus_spin_duration_ms: 3000.0,
            settle_mode: SettleMode::Barrier,
            settle_timer_ms: 3000.0,
            result_hold_ms: 2000.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            ..Self::normal().scaled(0.5)
        }
    }

    /// Studio mode
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            ..Self::normal().scaled(0.02)
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self {
                profile: TimingProfile::Custom,
                ..Self::normal()
            },
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            bootstrap_delay_ms: self.bootstrap_delay_ms * factor,
            transition_start_delay_ms: self.transition_start_delay_ms * factor,
            reel_spin_duration_ms: self.reel_spin_duration_ms * factor,
            reel_stop_interval_ms: self.reel_stop_interval_ms * factor,
            bonus_spin_duration_ms: self.bonus_spin_duration_ms * factor,
            settle_mode: self.settle_mode,
            settle_timer_ms: self.settle_timer_ms * factor,
            result_hold_ms: self.result_hold_ms * factor,
        }
    }

    /// Scroll duration for a main reel (later reels stop later)
    pub fn reel_duration_ms(&self, reel_index: u8) -> f64 {
        self.reel_spin_duration_ms + reel_index as f64 * self.reel_stop_interval_ms
    }

    /// Time from spin start until the slowest reel (or bonus reel) stops
    pub fn longest_animation_ms(&self, reel_count: u8) -> f64 {
        let last_reel = self.reel_duration_ms(reel_count.saturating_sub(1));
        self.transition_start_delay_ms + last_reel.max(self.bonus_spin_duration_ms)
    }

    /// Named durations, for validation
    pub(crate) fn durations(&self) -> [(&'static str, f64); 7] {
        [
            ("bootstrap_delay_ms", self.bootstrap_delay_ms),
            ("transition_start_delay_ms", self.transition_start_delay_ms),
            ("reel_spin_duration_ms", self.reel_spin_duration_ms),
            ("reel_stop_interval_ms", self.reel_stop_interval_ms),
            ("bonus_spin_duration_ms", self.bonus_spin_duration_ms),
            ("settle_timer_ms", self.settle_timer_ms),
            ("result_hold_ms", self.result_hold_ms),
        ]
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Milliseconds to `Duration`, clamping negatives and NaN to zero
pub fn millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_profiles() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        let studio = TimingConfig::studio();

        assert!(turbo.reel_spin_duration_ms < normal.reel_spin_duration_ms);
        assert!(studio.reel_spin_duration_ms < turbo.reel_spin_duration_ms);
        assert_eq!(turbo.profile, TimingProfile::Turbo);
        assert_eq!(studio.settle_mode, SettleMode::Barrier);
    }

    #[test]
    fn test_from_profile_keeps_profile() {
        for profile in [
            TimingProfile::Normal,
            TimingProfile::Turbo,
            TimingProfile::Studio,
            TimingProfile::Custom,
        ] {
            assert_eq!(TimingConfig::from_profile(profile).profile, profile);
        }
        let custom = TimingConfig::from_profile(TimingProfile::Custom);
        assert_eq!(custom.reel_spin_duration_ms, TimingConfig::normal().reel_spin_duration_ms);
    }

    #[test]
    fn test_staggered_reel_durations() {
        let config = TimingConfig::normal();
        assert_eq!(config.reel_duration_ms(0), 2000.0);
        assert_eq!(config.reel_duration_ms(4), 2800.0);
        assert!(config.reel_duration_ms(3) < config.reel_duration_ms(4));
    }

    #[test]
    fn test_legacy_timer_races_bonus_reel() {
        let config = TimingConfig::normal();
        // Bonus reel (3000ms) plus render delay outlasts the legacy 3000ms timer
        assert_eq!(config.longest_animation_ms(5), 3050.0);
        assert!(config.settle_timer_ms < config.longest_animation_ms(5));
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis(1500.0), Duration::from_millis(1500));
        assert_eq!(millis(-3.0), Duration::ZERO);
        assert_eq!(millis(f64::NAN), Duration::ZERO);
    }
}
