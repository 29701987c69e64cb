//! # rf-playable — Scripted Slot Playable for Ad Creatives
//!
//! Runs a short, fully scripted slot session: a few ordinary spins, then a
//! jackpot that hands off to the store end-card. Outcomes are never random;
//! only the scroll strips that carry them to the screen are.
//!
//! ## Features
//!
//! - **Result Script**: Ordered outcomes, last entry repeats
//! - **Spin Controller**: Pure state machine, effects instead of side effects
//! - **Settle Barrier**: Result resolves when every reel reports, not on a guess
//! - **Reel Animators**: Randomized strips that always land the target
//! - **Jackpot Ticker**: Four progressive display pools on a wall clock
//! - **Timing Profiles**: Normal, Turbo, Studio (near-instant) timing modes
//!
//! ## Architecture
//!
//! ```text
//! CreativeConfig (JSON / YAML)
//!     │
//!     v
//! PlayableSession ── SessionHandle (spin / download taps)
//!     │
//!     ├── SpinController + SpinSession (state machine)
//!     ├── ReelAnimator × 5 + BonusReelAnimator (motion plans)
//!     ├── JackpotTicker (shared pool)
//!     └── AdPlatform (ready / end-card / download)
//!           │
//!           v
//!     watch::Receiver<Snapshot> → presentation
//! ```

pub mod config;
pub mod controller;
pub mod jackpot;
pub mod platform;
pub mod presentation;
pub mod reel;
pub mod script;
pub mod session;
pub mod symbols;
pub mod timing;

pub use config::*;
pub use controller::*;
pub use jackpot::*;
pub use platform::*;
pub use presentation::*;
pub use reel::*;
pub use script::*;
pub use session::*;
pub use symbols::*;
pub use timing::*;
