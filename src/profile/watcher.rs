use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::models::UserProfile;
use crate::services::DocumentStore;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Where profile changes are delivered. The production sink forwards them to
/// the webview as an event.
pub trait ProfileSink: Send + Sync {
    fn publish(&self, profile: UserProfile);
}

/// Keeps the signed-in user's profile fresh while a screen shows it. The
/// hosted store has no push channel from this side, so the watcher polls and
/// publishes only when the document actually changed.
pub struct ProfileWatcher {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl ProfileWatcher {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start(
        &mut self,
        user_id: String,
        store: Arc<dyn DocumentStore>,
        sink: Arc<dyn ProfileSink>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("profile watcher already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        info!("Starting profile watcher for {user_id}");
        let handle = tokio::spawn(watch_profile(user_id, store, sink, token_clone));

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
                .context("profile watcher task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Default for ProfileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn watch_profile(
    user_id: String,
    store: Arc<dyn DocumentStore>,
    sink: Arc<dyn ProfileSink>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_seen: Option<UserProfile> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match store.get_user_profile(&user_id).await {
                    Ok(Some(profile)) => {
                        if last_seen.as_ref() != Some(&profile) {
                            last_seen = Some(profile.clone());
                            sink.publish(profile);
                        }
                    }
                    Ok(None) => debug!("No profile document for {user_id} yet"),
                    Err(err) => debug!("Profile poll failed: {err}"),
                }
            }
            _ = cancel_token.cancelled() => {
                info!("Profile watcher shutting down");
                break;
            }
        }
    }
}

#[derive(Serialize, Clone)]
struct ProfileEvent {
    profile: UserProfile,
}

/// Production sink: pushes profile updates to the webview.
pub struct ProfileEventSink {
    app_handle: AppHandle,
}

impl ProfileEventSink {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl ProfileSink for ProfileEventSink {
    fn publish(&self, profile: UserProfile) {
        if let Err(err) = self
            .app_handle
            .emit("user-profile-updated", ProfileEvent { profile })
        {
            warn!("Failed to emit profile update: {err}");
        }
    }
}
