pub mod capture;
pub mod community;
pub mod detection;
pub mod error;
pub mod livescan;
pub mod models;
pub mod profile;
pub mod services;
pub mod settings;

use std::sync::Arc;

use log::{error, info};
use tauri::{Emitter, Manager, State};
use tokio::sync::Mutex;

use capture::commands::{crop_captured_photo, import_library_photo, submit_preview_frame};
use capture::PreviewFeed;
use community::commands::{
    add_comment, add_comment_reply, create_post, get_comment_replies, get_comments, get_post,
    get_posts, get_user_posts_count, is_post_liked, like_post,
};
use detection::commands::{
    diagnose_image, get_diagnosis_history, normalize_diagnosis, save_diagnosis,
};
use detection::{DetectionClient, DiseaseDetector};
use livescan::commands::{get_live_prediction, start_live_scan, stop_live_scan};
use livescan::LiveScanController;
use models::UserProfile;
use profile::commands::{
    get_user_profile, subscribe_user_profile, unsubscribe_user_profile, update_user_profile,
};
use profile::ProfileWatcher;
use services::{
    AuthSession, AuthUser, CloudinaryUploader, DocumentStore, IdentityProvider, ImageUploader,
    RestDocumentStore, RestIdentityProvider,
};
use settings::{ServiceEndpoints, SettingsStore};

pub struct AppState {
    pub(crate) detector: Arc<dyn DiseaseDetector>,
    pub(crate) uploader: Arc<dyn ImageUploader>,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
    pub(crate) auth: AuthSession,
    pub(crate) preview_feed: Arc<PreviewFeed>,
    pub(crate) live_scan: Mutex<LiveScanController>,
    pub(crate) profile_watcher: Mutex<ProfileWatcher>,
    pub(crate) settings: SettingsStore,
}

#[tauri::command]
async fn sign_in(
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
    email: String,
    password: String,
) -> Result<AuthUser, String> {
    let user = state
        .identity
        .sign_in(&email, &password)
        .await
        .map_err(|err| {
            error!("Sign in failed: {err}");
            "Sign in failed. Check your email and password.".to_string()
        })?;

    state.auth.set_user(Some(user.clone()));
    let _ = app_handle.emit("auth-state-changed", Some(user.clone()));
    info!("Signed in as {}", user.id);
    Ok(user)
}

#[tauri::command]
async fn sign_up(
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
    email: String,
    password: String,
    display_name: String,
) -> Result<AuthUser, String> {
    let user = state
        .identity
        .sign_up(&email, &password, &display_name)
        .await
        .map_err(|err| {
            error!("Sign up failed: {err}");
            "Sign up failed. Please try again.".to_string()
        })?;

    // New accounts get a profile document right away so the profile screen
    // never sees a missing record.
    let profile = UserProfile {
        display_name: user.display_name.clone(),
        photo_url: None,
        updated_at: Some(chrono::Utc::now()),
    };
    if let Err(err) = state.store.update_user_profile(&user.id, &profile).await {
        error!("Failed to seed profile for {}: {err}", user.id);
    }

    state.auth.set_user(Some(user.clone()));
    let _ = app_handle.emit("auth-state-changed", Some(user.clone()));
    info!("Signed up as {}", user.id);
    Ok(user)
}

#[tauri::command]
async fn sign_out(
    state: State<'_, AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    if let Err(err) = state.identity.sign_out().await {
        error!("Provider sign out failed: {err}");
    }

    // Local teardown happens regardless of the provider call: stop the
    // profile watcher and forget the session.
    let mut watcher = state.profile_watcher.lock().await;
    if let Err(err) = watcher.stop().await {
        error!("Failed to stop profile watcher: {err}");
    }

    state.auth.set_user(None);
    let _ = app_handle.emit("auth-state-changed", None::<AuthUser>);
    Ok(())
}

#[tauri::command]
fn get_current_user(state: State<'_, AppState>) -> Result<Option<AuthUser>, String> {
    Ok(state.auth.current_user())
}

#[tauri::command]
fn get_service_endpoints(state: State<'_, AppState>) -> Result<ServiceEndpoints, String> {
    Ok(state.settings.endpoints())
}

/// Persist new endpoints. Takes effect on next launch; the running service
/// clients keep their configured addresses.
#[tauri::command]
fn update_service_endpoints(
    state: State<'_, AppState>,
    endpoints: ServiceEndpoints,
) -> Result<(), String> {
    state
        .settings
        .update_endpoints(endpoints)
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("PlantCare starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = SettingsStore::new(settings_path)?;
                let endpoints = settings_store.endpoints();

                app.manage(AppState {
                    detector: Arc::new(DetectionClient::new(&endpoints.classifier_base_url)),
                    uploader: Arc::new(CloudinaryUploader::new(
                        &endpoints.cloudinary_cloud_name,
                        &endpoints.cloudinary_upload_preset,
                    )),
                    store: Arc::new(RestDocumentStore::new(&endpoints.api_base_url)),
                    identity: Arc::new(RestIdentityProvider::new(&endpoints.api_base_url)),
                    auth: AuthSession::new(),
                    preview_feed: Arc::new(PreviewFeed::new()),
                    live_scan: Mutex::new(LiveScanController::new()),
                    profile_watcher: Mutex::new(ProfileWatcher::new()),
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            crop_captured_photo,
            import_library_photo,
            submit_preview_frame,
            diagnose_image,
            normalize_diagnosis,
            save_diagnosis,
            get_diagnosis_history,
            start_live_scan,
            stop_live_scan,
            get_live_prediction,
            create_post,
            get_posts,
            get_post,
            like_post,
            is_post_liked,
            get_user_posts_count,
            add_comment,
            get_comments,
            add_comment_reply,
            get_comment_replies,
            get_user_profile,
            update_user_profile,
            subscribe_user_profile,
            unsubscribe_user_profile,
            sign_in,
            sign_up,
            sign_out,
            get_current_user,
            get_service_endpoints,
            update_service_endpoints,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
