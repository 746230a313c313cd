use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The signed-in user as the rest of the app sees it: an opaque identifier
/// plus display fields. Saved records are tagged with `id` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

/// The hosted identity provider, consumed as a black box.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;
    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<AuthUser>;
    async fn sign_out(&self) -> Result<()>;
}

#[derive(Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    display_name: &'a str,
}

/// REST adapter for the identity endpoint.
pub struct RestIdentityProvider {
    http: reqwest::Client,
    base_url: String,
}

impl RestIdentityProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post_user<B: Serialize>(&self, path: &str, body: &B) -> Result<AuthUser> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("auth request failed: {status} {body}"));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.post_user("/auth/signin", &CredentialsRequest { email, password })
            .await
    }

    async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<AuthUser> {
        self.post_user(
            "/auth/signup",
            &SignUpRequest {
                email,
                password,
                display_name,
            },
        )
        .await
    }

    async fn sign_out(&self) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/auth/signout", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("sign out failed: {}", response.status()));
        }
        Ok(())
    }
}

/// Process-local auth state. Commands update it after provider calls;
/// interested parties (the profile watcher, the frontend via events) observe
/// changes through the watch channel.
pub struct AuthSession {
    tx: watch::Sender<Option<AuthUser>>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn set_user(&self, user: Option<AuthUser>) {
        let _ = self.tx.send(user);
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.tx.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}
