use std::sync::Arc;

use tauri::{AppHandle, State};

use crate::detection::NormalizedPrediction;
use crate::AppState;

use super::controller::EventSink;
use super::loop_worker::LiveScanDeps;
use super::LiveScanConfig;

/// Begin the background scan for the camera screen. The webview keeps
/// feeding preview frames via `submit_preview_frame`; predictions come back
/// on the `live-prediction-updated` event.
#[tauri::command]
pub async fn start_live_scan(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    preview_width: f64,
    preview_height: f64,
) -> Result<(), String> {
    let mut controller = state.live_scan.lock().await;

    let deps = LiveScanDeps {
        camera: state.preview_feed.clone(),
        detector: state.detector.clone(),
        sink: Arc::new(EventSink::new(
            app_handle,
            controller.last_prediction_slot(),
        )),
    };

    controller
        .start(LiveScanConfig::for_preview(preview_width, preview_height), deps)
        .map_err(|e| e.to_string())
}

/// Stop scanning when the camera screen blurs or unmounts.
#[tauri::command]
pub async fn stop_live_scan(state: State<'_, AppState>) -> Result<(), String> {
    let mut controller = state.live_scan.lock().await;
    state.preview_feed.clear();
    controller.stop().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_live_prediction(
    state: State<'_, AppState>,
) -> Result<Option<NormalizedPrediction>, String> {
    let controller = state.live_scan.lock().await;
    Ok(controller.last_prediction())
}
