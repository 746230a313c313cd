pub mod commands;
pub mod cropper;
pub mod geometry;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub use cropper::crop_to_region;
pub use geometry::{map_frame_to_photo, DetectionFrame, MappedCropRegion};

/// A captured or selected image: the temp file the camera layer wrote plus
/// its pixel dimensions. The pipeline owns the file until it is cropped or
/// uploaded; leftovers are left to OS temp cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureFrame {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Produces frames for the live-scan loop. The production source is the
/// webview preview feed; tests substitute a fake.
#[async_trait]
pub trait CameraSource: Send + Sync {
    async fn capture_frame(&self) -> Result<CaptureFrame>;
}

/// Latest-frame slot fed by the webview camera layer. The frontend posts its
/// most recent preview capture here; the live-scan loop reads whatever is
/// current at tick time. Older frames are simply overwritten, never queued.
pub struct PreviewFeed {
    tx: watch::Sender<Option<CaptureFrame>>,
}

impl PreviewFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn submit(&self, frame: CaptureFrame) {
        let _ = self.tx.send(Some(frame));
    }

    pub fn clear(&self) {
        let _ = self.tx.send(None);
    }
}

impl Default for PreviewFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraSource for PreviewFeed {
    async fn capture_frame(&self) -> Result<CaptureFrame> {
        self.tx
            .borrow()
            .clone()
            .ok_or_else(|| anyhow!("no preview frame available yet"))
    }
}
