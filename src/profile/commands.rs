use std::sync::Arc;

use chrono::Utc;
use tauri::{AppHandle, State};

use crate::models::UserProfile;
use crate::AppState;

use super::watcher::ProfileEventSink;

#[tauri::command]
pub async fn get_user_profile(
    state: State<'_, AppState>,
    user_id: String,
) -> Result<Option<UserProfile>, String> {
    state
        .store
        .get_user_profile(&user_id)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn update_user_profile(
    state: State<'_, AppState>,
    display_name: String,
    photo_url: Option<String>,
) -> Result<UserProfile, String> {
    let user = state
        .auth
        .current_user()
        .ok_or_else(|| "You must be signed in.".to_string())?;

    let profile = UserProfile {
        display_name,
        photo_url,
        updated_at: Some(Utc::now()),
    };
    state
        .store
        .update_user_profile(&user.id, &profile)
        .await
        .map_err(|e| e.user_message())?;
    Ok(profile)
}

/// Start streaming the signed-in user's profile changes to the frontend as
/// `user-profile-updated` events.
#[tauri::command]
pub async fn subscribe_user_profile(
    app_handle: AppHandle,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let user = state
        .auth
        .current_user()
        .ok_or_else(|| "You must be signed in.".to_string())?;

    let mut watcher = state.profile_watcher.lock().await;
    watcher
        .start(
            user.id,
            Arc::clone(&state.store),
            Arc::new(ProfileEventSink::new(app_handle)),
        )
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn unsubscribe_user_profile(state: State<'_, AppState>) -> Result<(), String> {
    let mut watcher = state.profile_watcher.lock().await;
    watcher.stop().await.map_err(|e| e.to_string())
}
