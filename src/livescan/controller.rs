use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::detection::NormalizedPrediction;

use super::loop_worker::{live_scan_loop, LiveScanDeps, PredictionSink};
use super::LiveScanConfig;

#[derive(Serialize, Clone)]
struct LivePredictionEvent {
    prediction: NormalizedPrediction,
}

/// Owns the live-scan task for the camera screen's lifetime. Start on focus,
/// stop on blur/unmount; stopping cancels future ticks while an in-flight
/// cycle finishes on its own and its result is discarded.
pub struct LiveScanController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    last_prediction: Arc<Mutex<Option<NormalizedPrediction>>>,
}

impl LiveScanController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            last_prediction: Arc::new(Mutex::new(None)),
        }
    }

    pub fn start(&mut self, config: LiveScanConfig, deps: LiveScanDeps) -> Result<()> {
        if self.handle.is_some() {
            bail!("live scan already active");
        }

        // Transient overlay state: reset whenever the camera screen mounts.
        *self.last_prediction.lock().unwrap_or_else(|e| e.into_inner()) = None;

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        info!(
            "Starting live scan ({}x{} preview, every {:?})",
            config.preview_width, config.preview_height, config.interval
        );
        let handle = tokio::spawn(live_scan_loop(config, deps, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("live scan task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn last_prediction(&self) -> Option<NormalizedPrediction> {
        self.last_prediction
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn last_prediction_slot(&self) -> Arc<Mutex<Option<NormalizedPrediction>>> {
        Arc::clone(&self.last_prediction)
    }
}

impl Default for LiveScanController {
    fn default() -> Self {
        Self::new()
    }
}

/// Production sink: remembers the latest prediction for polling commands and
/// pushes it to the webview overlay as an event.
pub struct EventSink {
    app_handle: AppHandle,
    slot: Arc<Mutex<Option<NormalizedPrediction>>>,
}

impl EventSink {
    pub fn new(app_handle: AppHandle, slot: Arc<Mutex<Option<NormalizedPrediction>>>) -> Self {
        Self { app_handle, slot }
    }
}

impl PredictionSink for EventSink {
    fn publish(&self, prediction: NormalizedPrediction) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(prediction.clone());

        if let Err(err) = self
            .app_handle
            .emit("live-prediction-updated", LivePredictionEvent { prediction })
        {
            warn!("Failed to emit live prediction: {err}");
        }
    }
}
