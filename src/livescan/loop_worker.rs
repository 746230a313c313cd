use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::capture::{crop_to_region, map_frame_to_photo, CameraSource, DetectionFrame};
use crate::detection::{normalize, DetectOptions, DiseaseDetector, NormalizedPrediction};
use crate::error::DiagnosisError;

use super::LiveScanConfig;

/// Collaborators injected into the loop; tests substitute fakes for all of
/// them.
pub struct LiveScanDeps {
    pub camera: Arc<dyn CameraSource>,
    pub detector: Arc<dyn DiseaseDetector>,
    pub sink: Arc<dyn PredictionSink>,
}

/// Where completed scan cycles publish their result. The production sink
/// forwards to the camera-screen overlay via a Tauri event.
pub trait PredictionSink: Send + Sync {
    fn publish(&self, prediction: NormalizedPrediction);
}

/// Repeating background scan while the camera screen is focused.
///
/// The cycle is awaited inline, so there is never more than one
/// classification in flight; `MissedTickBehavior::Skip` drops ticks that
/// would land while a cycle is still running instead of queuing them. Every
/// error except rate limiting is swallowed (logged) so the overlay stays
/// non-intrusive; a 429 pauses the ticker for the server-requested window.
pub async fn live_scan_loop(
    config: LiveScanConfig,
    deps: LiveScanDeps,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let frame = DetectionFrame::centered(config.preview_width, config.preview_height);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let cycle = run_scan_cycle(&config, &deps, &frame);
                match tokio::time::timeout(config.cycle_timeout, cycle).await {
                    Ok(Ok(prediction)) => deps.sink.publish(prediction),
                    Ok(Err(err)) => match err.downcast_ref::<DiagnosisError>() {
                        Some(DiagnosisError::RateLimited { retry_after_secs }) => {
                            let retry_after_secs = *retry_after_secs;
                            info!("Live scan rate limited; pausing for {retry_after_secs}s");
                            tokio::select! {
                                _ = tokio::time::sleep(std::time::Duration::from_secs(retry_after_secs)) => {
                                    // Resume with an immediate cycle; waiting
                                    // another full interval on top of the
                                    // server-requested window buys nothing.
                                    ticker.reset_immediately();
                                }
                                _ = cancel_token.cancelled() => break,
                            }
                        }
                        // Low-friction by design: the overlay simply does not
                        // update for this tick.
                        _ => debug!("Live scan cycle failed: {err:?}"),
                    },
                    Err(_) => warn!(
                        "Live scan cycle timed out (> {:?})",
                        config.cycle_timeout
                    ),
                }
            }
            _ = cancel_token.cancelled() => {
                info!("Live scan loop shutting down");
                break;
            }
        }
    }
}

async fn run_scan_cycle(
    config: &LiveScanConfig,
    deps: &LiveScanDeps,
    frame: &DetectionFrame,
) -> Result<NormalizedPrediction> {
    let capture = deps
        .camera
        .capture_frame()
        .await
        .context("live frame capture failed")?;

    let region = map_frame_to_photo(
        f64::from(capture.width),
        f64::from(capture.height),
        config.preview_width,
        config.preview_height,
        frame,
    );

    let cropped: PathBuf = tokio::task::spawn_blocking({
        let photo_path = capture.path.clone();
        move || crop_to_region(&photo_path, &region)
    })
    .await
    .context("crop worker join failed")?
    .map_err(|err| anyhow!(err))?;

    let detection = deps
        .detector
        .detect_disease(&cropped, DetectOptions { lite: true })
        .await;

    // The cropped frame is a per-tick derivative; drop it regardless of the
    // detection outcome.
    let _ = tokio::fs::remove_file(&cropped).await;

    let raw = detection.map_err(anyhow::Error::new)?;
    Ok(normalize(Some(&raw)))
}
