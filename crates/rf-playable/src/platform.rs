//! Ad-platform bridge
//!
//! The host network (MRAID, store redirect, etc.) sits behind `AdPlatform`.
//! The session calls it on the single event-loop task, one call at a time.

/// Callbacks into the hosting ad network
pub trait AdPlatform: Send + Sync {
    /// Game finished loading and can be shown
    fn notify_ready(&self);

    /// Jackpot landed; present the end-card / store surface
    fn notify_end_card(&self);

    /// User tapped the end-card call-to-action
    fn notify_download_intent(&self);
}

/// Platform that only logs (local previews, headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAdPlatform;

impl AdPlatform for LoggingAdPlatform {
    fn notify_ready(&self) {
        log::info!("[AdSDK] Game Ready");
    }

    fn notify_end_card(&self) {
        log::info!("[AdSDK] Show End Card");
    }

    fn notify_download_intent(&self) {
        log::info!("[AdSDK] Download Clicked, redirecting to store");
    }
}
