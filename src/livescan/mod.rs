pub mod commands;
pub mod controller;
pub mod loop_worker;

use std::time::Duration;

pub use controller::LiveScanController;

/// Tunables for the live-scan loop. Production uses the defaults; tests
/// shrink the intervals.
#[derive(Debug, Clone)]
pub struct LiveScanConfig {
    /// Wall-clock period between scan attempts.
    pub interval: Duration,

    /// Upper bound on one capture-crop-classify cycle; a cycle exceeding it
    /// is logged and dropped.
    pub cycle_timeout: Duration,

    /// Preview viewport size the webview reports when the camera screen
    /// mounts; the guide frame and crop mapping are derived from it.
    pub preview_width: f64,
    pub preview_height: f64,
}

impl LiveScanConfig {
    pub fn for_preview(preview_width: f64, preview_height: f64) -> Self {
        Self {
            interval: Duration::from_millis(2000),
            cycle_timeout: Duration::from_secs(10),
            preview_width,
            preview_height,
        }
    }
}
