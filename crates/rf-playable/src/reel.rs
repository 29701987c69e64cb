//! Reel animators — strip synthesis and motion plans
//!
//! An animator never decides an outcome. Given a target it builds a scroll
//! strip that looks random but always lands the target on the center row,
//! and reports completion exactly once per spin.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ReelLayout;
use crate::symbols::{BonusLabel, SymbolCatalog};
use crate::timing::TimingConfig;

/// CSS-style cubic-bezier easing curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Easing {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Easing {
    /// Fast start, long deceleration into the stop
    pub const REEL_STOP: Easing = Easing::new(0.4, 0.0, 0.2, 1.0);
    /// Overshoot-free ease-out used by the bonus reel
    pub const BONUS_STOP: Easing = Easing::new(0.25, 1.0, 0.5, 1.0);

    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Eased progress for linear time `t` in `[0, 1]`
    pub fn sample(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        // x(s) is monotonic for x1, x2 in [0, 1]
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut s = t;
        for _ in 0..48 {
            let x = bezier(s, self.x1, self.x2);
            if (x - t).abs() < 1e-9 {
                break;
            }
            if x < t {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        bezier(s, self.y1, self.y2)
    }

    /// CSS timing-function text
    pub fn css(&self) -> String {
        format!(
            "cubic-bezier({}, {}, {}, {})",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

fn bezier(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

/// Motion plan for one reel spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelMotion<T> {
    /// Spin this motion belongs to
    pub spin_id: u64,
    /// Full scroll strip, top to bottom
    pub strip: Vec<T>,
    /// Index of the target cell in `strip`
    pub target_index: usize,
    /// First cell of the resting viewport
    pub window_start: usize,
    /// Cells in the resting viewport
    pub window_len: usize,
    /// Height of one cell (px)
    pub cell_height_px: f64,
    /// Final scroll offset (px, upward)
    pub offset_px: f64,
    /// Delay before the transition starts (ms)
    pub start_delay_ms: f64,
    /// Transition duration (ms)
    pub duration_ms: f64,
    pub easing: Easing,
}

impl<T> ReelMotion<T> {
    /// Cell the reel lands on
    pub fn target(&self) -> &T {
        &self.strip[self.target_index]
    }

    /// Cells visible once the reel has stopped
    pub fn visible_window(&self) -> &[T] {
        &self.strip[self.window_start..self.window_start + self.window_len]
    }

    /// Time until the transition ends (ms)
    pub fn total_ms(&self) -> f64 {
        self.start_delay_ms + self.duration_ms
    }

    /// Scroll offset at `elapsed_ms` after the spin was triggered
    pub fn offset_at(&self, elapsed_ms: f64) -> f64 {
        let running = elapsed_ms - self.start_delay_ms;
        if running <= 0.0 {
            return 0.0;
        }
        if self.duration_ms <= 0.0 || running >= self.duration_ms {
            return self.offset_px;
        }
        self.easing.sample(running / self.duration_ms) * self.offset_px
    }
}

pub type SymbolMotion = ReelMotion<u32>;
pub type LabelMotion = ReelMotion<BonusLabel>;

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN REEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Animator for one main-grid reel
#[derive(Debug, Clone)]
pub struct ReelAnimator {
    reel_index: u8,
    rows: usize,
    symbol_height_px: f64,
    padding_len: usize,
    all_ids: Vec<u32>,
    filler_ids: Vec<u32>,
    /// What the reel currently shows, top to bottom
    visible: Vec<u32>,
    /// Spin awaiting its completion signal
    pending: Option<u64>,
}

impl ReelAnimator {
    /// Create an idle reel showing the first `rows` catalog symbols
    pub fn new(reel_index: u8, layout: &ReelLayout, catalog: &SymbolCatalog) -> Self {
        let all_ids = catalog.ids();
        let mut filler_ids = catalog.filler_ids();
        if filler_ids.is_empty() {
            filler_ids = all_ids.clone();
        }
        let rows = layout.rows as usize;
        let visible = all_ids.iter().copied().cycle().take(rows).collect();

        Self {
            reel_index,
            rows,
            symbol_height_px: layout.symbol_height_px,
            padding_len: layout.padding_base + reel_index as usize * layout.padding_step,
            all_ids,
            filler_ids,
            visible,
            pending: None,
        }
    }

    pub fn reel_index(&self) -> u8 {
        self.reel_index
    }

    pub fn visible(&self) -> &[u32] {
        &self.visible
    }

    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    /// Build the strip for `target` and arm the completion signal
    pub fn start_spin<R: Rng + ?Sized>(
        &mut self,
        spin_id: u64,
        target: u32,
        timing: &TimingConfig,
        rng: &mut R,
    ) -> SymbolMotion {
        let middle = self.rows / 2;
        let window: Vec<u32> = (0..self.rows)
            .map(|row| {
                if row == middle {
                    target
                } else {
                    pick(&self.filler_ids, rng)
                }
            })
            .collect();

        let mut strip = Vec::with_capacity(self.visible.len() + self.padding_len + self.rows);
        strip.extend_from_slice(&self.visible);
        strip.extend((0..self.padding_len).map(|_| pick(&self.all_ids, rng)));
        strip.extend_from_slice(&window);

        let window_start = strip.len() - self.rows;

        if let Some(stale) = self.pending.replace(spin_id) {
            log::debug!(
                "[Reel {}] Spin {} superseded by {}",
                self.reel_index,
                stale,
                spin_id
            );
        }
        self.visible = window;

        SymbolMotion {
            spin_id,
            target_index: window_start + middle,
            window_start,
            window_len: self.rows,
            cell_height_px: self.symbol_height_px,
            offset_px: window_start as f64 * self.symbol_height_px,
            start_delay_ms: timing.transition_start_delay_ms,
            duration_ms: timing.reel_duration_ms(self.reel_index),
            easing: Easing::REEL_STOP,
            strip,
        }
    }

    /// Consume the completion signal; true exactly once per `start_spin`
    pub fn finish(&mut self, spin_id: u64) -> bool {
        if self.pending == Some(spin_id) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

fn pick<R: Rng + ?Sized>(ids: &[u32], rng: &mut R) -> u32 {
    ids[rng.random_range(0..ids.len())]
}

// ═══════════════════════════════════════════════════════════════════════════════
// BONUS REEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Animator for the vertical bonus reel
#[derive(Debug, Clone)]
pub struct BonusReelAnimator {
    labels: Vec<BonusLabel>,
    loops: usize,
    tail: usize,
    item_height_px: f64,
    viewport_px: f64,
    current: Option<BonusLabel>,
    pending: Option<u64>,
}

impl BonusReelAnimator {
    pub fn new(labels: Vec<BonusLabel>, layout: &ReelLayout) -> Self {
        Self {
            current: labels.first().copied(),
            tail: layout.bonus_tail.min(labels.len()),
            labels,
            loops: layout.bonus_loops,
            item_height_px: layout.bonus_item_height_px,
            viewport_px: layout.viewport_height_px(),
            pending: None,
        }
    }

    /// Label under the indicator line
    pub fn current(&self) -> Option<BonusLabel> {
        self.current
    }

    pub fn is_spinning(&self) -> bool {
        self.pending.is_some()
    }

    /// Loop the label ring, then land `target` under the indicator line
    pub fn start_spin(&mut self, spin_id: u64, target: BonusLabel, timing: &TimingConfig) -> LabelMotion {
        let mut strip = Vec::with_capacity(self.labels.len() * self.loops + 1 + self.tail);
        for _ in 0..self.loops {
            strip.extend_from_slice(&self.labels);
        }
        let target_index = strip.len();
        strip.push(target);
        strip.extend_from_slice(&self.labels[..self.tail]);

        let centre = (self.viewport_px - self.item_height_px) / 2.0;
        let offset_px = (target_index as f64 * self.item_height_px - centre).max(0.0);

        self.pending = Some(spin_id);
        self.current = Some(target);

        LabelMotion {
            spin_id,
            strip,
            target_index,
            window_start: target_index,
            window_len: 1,
            cell_height_px: self.item_height_px,
            offset_px,
            start_delay_ms: timing.transition_start_delay_ms,
            duration_ms: timing.bonus_spin_duration_ms,
            easing: Easing::BONUS_STOP,
        }
    }

    /// Consume the completion signal; true exactly once per `start_spin`
    pub fn finish(&mut self, spin_id: u64) -> bool {
        if self.pending == Some(spin_id) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::jackpot::JackpotTier;

    fn animator(index: u8) -> ReelAnimator {
        ReelAnimator::new(index, &ReelLayout::default(), &SymbolCatalog::default())
    }

    #[test]
    fn test_target_always_center_row() {
        let catalog = SymbolCatalog::default();
        let timing = TimingConfig::normal();
        let mut rng = StdRng::seed_from_u64(7);

        for index in 0..5 {
            let mut reel = animator(index);
            for (spin, &symbol) in catalog.ids().iter().enumerate() {
                for _ in 0..20 {
                    let motion = reel.start_spin(spin as u64, symbol, &timing, &mut rng);
                    assert_eq!(*motion.target(), symbol);
                    assert_eq!(motion.visible_window()[1], symbol);
                    assert_eq!(motion.visible_window(), reel.visible());
                }
            }
        }
    }

    #[test]
    fn test_staggered_padding_and_duration() {
        let timing = TimingConfig::normal();
        let mut rng = StdRng::seed_from_u64(1);

        let first = animator(0).start_spin(1, 3, &timing, &mut rng);
        let last = animator(4).start_spin(1, 3, &timing, &mut rng);

        // visible (3) + padding + window (3)
        assert_eq!(first.strip.len(), 3 + 20 + 3);
        assert_eq!(last.strip.len(), 3 + 28 + 3);
        assert!(last.duration_ms > first.duration_ms);
        assert_relative_eq!(first.offset_px, 23.0 * 80.0);
    }

    #[test]
    fn test_strip_starts_from_previous_window() {
        let timing = TimingConfig::normal();
        let mut rng = StdRng::seed_from_u64(3);
        let mut reel = animator(2);

        assert_eq!(reel.visible(), &[0, 1, 2]);
        let first = reel.start_spin(1, 8, &timing, &mut rng);
        let second = reel.start_spin(2, 5, &timing, &mut rng);
        assert_eq!(&second.strip[..3], first.visible_window());
    }

    #[test]
    fn test_completion_exactly_once() {
        let timing = TimingConfig::normal();
        let mut rng = StdRng::seed_from_u64(11);
        let mut reel = animator(0);

        // Idle reels never complete
        assert!(!reel.finish(0));
        assert!(!reel.is_spinning());

        reel.start_spin(1, 4, &timing, &mut rng);
        assert!(reel.is_spinning());
        assert!(!reel.finish(2));
        assert!(reel.finish(1));
        assert!(!reel.finish(1));
        assert!(!reel.is_spinning());
    }

    #[test]
    fn test_same_target_different_padding() {
        let timing = TimingConfig::normal();
        let mut rng = StdRng::seed_from_u64(99);
        let mut a = animator(1);
        let mut b = animator(1);

        let first = a.start_spin(1, 7, &timing, &mut rng);
        let second = b.start_spin(1, 7, &timing, &mut rng);

        assert_eq!(first.target(), second.target());
        assert_eq!(first.strip.len(), second.strip.len());
        assert_ne!(
            &first.strip[3..first.window_start],
            &second.strip[3..second.window_start]
        );
    }

    #[test]
    fn test_bonus_reel_lands_on_target() {
        let layout = ReelLayout::default();
        let timing = TimingConfig::normal();
        let labels = BonusLabel::default_set();
        let mut bonus = BonusReelAnimator::new(labels.clone(), &layout);
        let target = BonusLabel::Jackpot(JackpotTier::Grand);

        let motion = bonus.start_spin(3, target, &timing);

        assert_eq!(*motion.target(), target);
        assert_eq!(motion.target_index, labels.len() * 3);
        assert_eq!(motion.strip.len(), labels.len() * 3 + 1 + 2);
        // 24 * 50 - (240 - 50) / 2
        assert_relative_eq!(motion.offset_px, 1105.0);
        assert_eq!(bonus.current(), Some(target));
        assert!(bonus.finish(3));
        assert!(!bonus.finish(3));
    }

    #[test]
    fn test_easing_curve() {
        let easing = Easing::REEL_STOP;
        assert_eq!(easing.sample(0.0), 0.0);
        assert_eq!(easing.sample(1.0), 1.0);

        let mut previous = 0.0;
        for step in 1..=100 {
            let value = easing.sample(step as f64 / 100.0);
            assert!(value >= previous);
            previous = value;
        }
        // Decelerating: more than half the distance covered at half time
        assert!(easing.sample(0.5) > 0.5);
        assert_eq!(easing.css(), "cubic-bezier(0.4, 0, 0.2, 1)");
    }

    #[test]
    fn test_offset_at() {
        let timing = TimingConfig::normal();
        let mut rng = StdRng::seed_from_u64(5);
        let motion = animator(0).start_spin(1, 2, &timing, &mut rng);

        assert_eq!(motion.offset_at(0.0), 0.0);
        assert_eq!(motion.offset_at(motion.start_delay_ms), 0.0);
        assert_eq!(motion.offset_at(motion.total_ms()), motion.offset_px);
        let mid = motion.offset_at(motion.start_delay_ms + motion.duration_ms / 2.0);
        assert!(mid > 0.0 && mid < motion.offset_px);
    }
}
