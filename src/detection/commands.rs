use std::path::PathBuf;

use chrono::Utc;
use log::{error, info};
use serde_json::Value;
use tauri::State;
use uuid::Uuid;

use crate::models::DiagnosisRecord;
use crate::AppState;

use super::{normalize, DetectOptions, NormalizedPrediction};

/// Display-time classification for the result screen: the screen arrives
/// with an image path and no diagnosis, calls this, and renders the
/// normalized record.
#[tauri::command]
pub async fn diagnose_image(
    state: State<'_, AppState>,
    image_path: PathBuf,
) -> Result<NormalizedPrediction, String> {
    let raw = state
        .detector
        .detect_disease(&image_path, DetectOptions::default())
        .await
        .map_err(|err| {
            error!("Diagnosis failed for {}: {err}", image_path.display());
            err.user_message()
        })?;

    Ok(normalize(Some(&raw)))
}

/// Reconcile a diagnosis payload of either shape (fresh classifier response
/// or persisted-history record) into the canonical form the screens render.
#[tauri::command]
pub async fn normalize_diagnosis(raw: Option<Value>) -> Result<NormalizedPrediction, String> {
    Ok(normalize(raw.as_ref()))
}

/// Upload the image to the CDN, then persist the record. Either failure is a
/// save error; nothing partial is reported as success.
#[tauri::command]
pub async fn save_diagnosis(
    state: State<'_, AppState>,
    image_path: PathBuf,
    diagnosis: NormalizedPrediction,
) -> Result<DiagnosisRecord, String> {
    let user = state
        .auth
        .current_user()
        .ok_or_else(|| "You must be signed in to save a diagnosis.".to_string())?;

    let image_url = state.uploader.upload_image(&image_path).await.map_err(|err| {
        error!("Image upload failed: {err}");
        err.user_message()
    })?;

    let record = DiagnosisRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        image_url,
        diagnosis,
        timestamp: Utc::now(),
    };

    state.store.save_diagnosis(&record).await.map_err(|err| {
        error!("Saving diagnosis failed: {err}");
        err.user_message()
    })?;

    info!("Saved diagnosis {} for user {}", record.id, record.user_id);
    Ok(record)
}

#[tauri::command]
pub async fn get_diagnosis_history(
    state: State<'_, AppState>,
) -> Result<Vec<DiagnosisRecord>, String> {
    let user = state
        .auth
        .current_user()
        .ok_or_else(|| "You must be signed in to view your history.".to_string())?;

    state
        .store
        .get_user_diagnoses(&user.id)
        .await
        .map_err(|err| err.user_message())
}
